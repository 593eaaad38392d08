//! Block iterator: skip bad blocks, wrap at the ring end, detect "no good
//! blocks remain".

use crate::error::RingError;
use crate::nand::{Block, NandDriver};

/// Walk forward from `current + 1`, wrapping at `start_blk + len` back to
/// `start_blk`, returning the first block the driver doesn't report bad.
///
/// Returns `None` only when the search wraps all the way back to `current`
/// without finding any good block.
pub fn next_good<T: NandDriver>(
    nand: &mut T,
    start_blk: Block,
    len: u32,
    current: Block,
) -> Option<Block> {
    let mut candidate = advance(start_blk, len, current);

    while candidate != current {
        if !nand.is_bad(candidate) {
            return Some(candidate);
        }
        candidate = advance(start_blk, len, candidate);
    }

    None
}

/// `first_good() == next_good(start_blk + len - 1)`.
pub fn first_good<T: NandDriver>(nand: &mut T, start_blk: Block, len: u32) -> Option<Block> {
    next_good(nand, start_blk, len, start_blk + len - 1)
}

/// Repeatedly `next_good` then `erase`, marking erase failures bad and
/// trying the next good block, until an erased block is obtained.
///
/// Bounded to at most `len` attempts (the REDESIGN FLAG in spec.md §9: the
/// literal spec has this loop spin forever on total exhaustion, this
/// version surfaces [`RingError::RingExhausted`] instead).
pub fn erase_next<T: NandDriver>(
    nand: &mut T,
    start_blk: Block,
    len: u32,
    cur_blk: Block,
) -> Result<Block, RingError> {
    let mut from = cur_blk;

    for _ in 0..len {
        let candidate = match next_good(nand, start_blk, len, from) {
            Some(b) => b,
            None => return Err(RingError::RingExhausted),
        };

        match nand.erase(candidate) {
            Ok(()) => return Ok(candidate),
            Err(_) => {
                log::warn!("block {candidate} failed erase, marking bad");
                nand.mark_bad(candidate);
                from = candidate;
            }
        }
    }

    Err(RingError::RingExhausted)
}

/// Count the blocks in `[start_blk, start_blk + len)` the driver doesn't
/// report bad.
pub fn total_good<T: NandDriver>(nand: &mut T, start_blk: Block, len: u32) -> u32 {
    (start_blk..start_blk + len)
        .filter(|&blk| !nand.is_bad(blk))
        .count() as u32
}

fn advance(start_blk: Block, len: u32, current: Block) -> Block {
    let next = current + 1;
    if next >= start_blk + len {
        start_blk
    } else {
        next
    }
}
