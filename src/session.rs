//! Session closer: repair a potentially corrupt tail after recovery, then
//! hand back a fresh block to resume appending into.

use crate::block::erase_next;
use crate::error::RingError;
use crate::header::BAD_MARK_GOOD;
use crate::nand::{Block, NandDriver, Page};

/// Overwrite every residual page following `last_page` in `last_blk` with a
/// pattern guaranteed to read back as [`crate::header::PageId::Wasted`] (data
/// region zeroed, bad-mark bytes `0xFF`, rest zero), then erase the next
/// good block.
///
/// Program failures during the overwrite mark the block bad but do not
/// abort -- the ring moves on, same as spec.md §4.4. Returns the new
/// current block; callers set `cur_page := 0` and `cur_id := last_id + 1`.
pub fn close_prev_session<T: NandDriver>(
    nand: &mut T,
    start_blk: Block,
    len: u32,
    last_blk: Block,
    last_page: Page,
) -> Result<Block, RingError> {
    let ppb = nand.pages_per_block();

    if last_page < ppb - 1 {
        let pds = nand.page_data_size();
        let pss = nand.page_spare_size();
        let data = vec![0u8; pds];
        let mut spare = vec![0u8; pss];
        spare.fill(0);
        // bad_mark lives at spare offset 4..6; stamp it "good" so a reader
        // can't mistake deliberate zeroing for a driver-level bad mark.
        if pss >= 6 {
            spare[4..6].copy_from_slice(&BAD_MARK_GOOD.to_le_bytes());
        }

        for page in (last_page + 1)..ppb {
            if nand.write_page_whole(last_blk, page, &data, &spare).is_err() {
                log::warn!("block {last_blk} failed close-out write at page {page}, marking bad");
                nand.mark_bad(last_blk);
                break;
            }
        }
    }

    erase_next(nand, start_blk, len, last_blk)
}
