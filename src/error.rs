//! Caller-visible error type.
//!
//! Only conditions spec.md classifies as media errors ever reach here.
//! Caller misuse (wrong lifecycle state, oversize ring, undersized spare
//! area, wrong-size data buffer) is a `debug_assert!`/`panic!`, never a
//! `RingError` variant -- see the crate-level docs.

use thiserror::Error;

/// Errors returned by the public ring operations.
#[derive(Debug, Error)]
pub enum RingError {
    /// `mount()` found fewer than `MIN_GOOD_BLOCKS` non-bad blocks in the
    /// ring. The ring stays `Idle`.
    #[error("fewer than {0} good blocks in ring, cannot mount")]
    TooFewGoodBlocks(u32),

    /// Every block the erase-next/rescue loop tried within its retry
    /// budget failed. The ring's internal state is unchanged; the caller
    /// may retry later if blocks are expected to recover (they won't, in
    /// practice, but the ring doesn't assume that).
    #[error("ring exhausted: no good block found within retry budget")]
    RingExhausted,

    /// The driver reported a failure that isn't a program/erase/bad-block
    /// condition the ring knows how to route through rescue -- e.g. a read
    /// failure that isn't a CRC mismatch, or an I/O error on a collaborator
    /// the ring has no recovery path for.
    #[error("NAND driver error: {0}")]
    Driver(String),
}
