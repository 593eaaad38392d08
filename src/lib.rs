//! A circular append-only log over raw NAND flash.
//!
//! [`NandRing`] records fixed-size pages across a contiguous span of
//! physical blocks, tolerating bad blocks, program/erase failures, and
//! power loss at any point. At mount time it locates the most recently
//! written page via [`recovery::recover`], repairs a possibly-corrupt tail
//! via [`session::close_prev_session`], and resumes appending with a
//! strictly increasing page identifier.
//!
//! The NAND chip, the CRC seed, and the boot clock are external
//! collaborators, consumed through the [`nand::NandDriver`] and
//! [`nand::Clock`] traits -- this crate owns none of them.
//!
//! Session enumeration (reading records back grouped by mount-to-mount
//! "session") is intentionally not implemented; see the crate's design
//! notes for why.

pub mod block;
pub mod config;
pub mod error;
pub mod header;
pub mod nand;
pub mod recovery;
pub mod rescue;
pub mod ring;
pub mod session;

pub use config::RingConfig;
pub use error::RingError;
pub use header::{PageHeader, PageId};
pub use nand::{Block, Clock, NandDriver, Page};
pub use ring::{NandRing, RingState};
