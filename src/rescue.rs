//! Data-rescue mover: on a program failure mid-block, migrate the block's
//! already-durable pages into a fresh block and mark the failing block bad.

use crate::block::erase_next;
use crate::error::RingError;
use crate::nand::{Block, NandDriver, Page};

/// Maximum number of fresh-block attempts before giving up with
/// [`RingError::RingExhausted`]. Mirrors the teacher's `DHARA_MAX_RETRIES`.
pub const MAX_RESCUE_RETRIES: u32 = 8;

/// Rescue a block that just failed a program at `failed_page`.
///
/// 1. Mark `failed_blk` bad.
/// 2. Obtain a fresh erased block.
/// 3. If `failed_page > 0`, move pages `[0, failed_page)` into it. If the
///    move itself fails, mark the *target* bad and retry from step 2.
///
/// Returns the new block; the caller retries the failing write at the same
/// `cur_page` on this new block. `cur_id` is not decremented -- identifiers
/// may have gaps where rescues intervene (monotonicity holds, density
/// doesn't).
pub fn rescue<T: NandDriver>(
    nand: &mut T,
    start_blk: Block,
    len: u32,
    cur_blk: Block,
    failed_blk: Block,
    failed_page: Page,
    scratch: &mut [u8],
) -> Result<Block, RingError> {
    log::warn!("block {failed_blk} failed program at page {failed_page}, rescuing");
    nand.mark_bad(failed_blk);

    let mut from = cur_blk;

    for _ in 0..MAX_RESCUE_RETRIES {
        let target = erase_next(nand, start_blk, len, from)?;

        if failed_page == 0 {
            return Ok(target);
        }

        match nand.data_move(failed_blk, target, failed_page, scratch) {
            Ok(()) => return Ok(target),
            Err(_) => {
                log::warn!("data-move to block {target} failed, marking bad and retrying");
                nand.mark_bad(target);
                from = target;
            }
        }
    }

    Err(RingError::RingExhausted)
}
