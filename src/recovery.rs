//! Recovery scanner: locate the last-written block and last-written page
//! across the ring at mount time.
//!
//! Runs only at mount; a brute-force scan is fine because `len` is bounded
//! and position in the physical array doesn't encode temporal order (the
//! ring wraps).

use crate::block::first_good;
use crate::header::{PageHeader, PageId, HEADER_SIZE};
use crate::nand::{Block, NandDriver, Page};

/// Outcome of a full mount-time recovery scan.
pub struct Recovered {
    pub block: Block,
    pub page: Page,
    pub id: u64,
}

/// Phase 1 + phase 2. Returns `None` if the ring is entirely empty (no
/// block yields an id `>= PAGE_ID_FIRST`) -- the `mkfs` path.
pub fn recover<T: NandDriver>(
    nand: &mut T,
    start_blk: Block,
    len: u32,
    spare_buf: &mut [u8],
) -> Option<Recovered> {
    let (block, _) = find_last_written_block(nand, start_blk, len, spare_buf)?;
    let (page, id) = find_last_written_page(nand, block, nand.pages_per_block(), spare_buf);
    Some(Recovered { block, page, id })
}

/// Phase 1: starting at `first_good()`, read page 0 of each good block in
/// ring order, tracking the block with the largest observed id. Ties
/// prefer the later-visited block. Terminates when the iterator wraps.
fn find_last_written_block<T: NandDriver>(
    nand: &mut T,
    start_blk: Block,
    len: u32,
    spare_buf: &mut [u8],
) -> Option<(Block, u64)> {
    let first = first_good(nand, start_blk, len)?;

    let mut best: Option<(Block, u64)> = None;
    let mut blk = first;

    loop {
        if !nand.is_bad(blk) {
            if nand.read_page_spare(blk, 0, spare_buf).is_ok() {
                let header = PageHeader::from_bytes(spare_buf);
                if let PageId::Valid(id) = header.read_id(spare_buf) {
                    let take = match best {
                        None => true,
                        Some((_, best_id)) => id >= best_id,
                    };
                    if take {
                        best = Some((blk, id));
                    }
                }
            }
        }

        blk = if blk + 1 >= start_blk + len { start_blk } else { blk + 1 };
        if blk == first {
            break;
        }
    }

    best
}

/// Phase 2: scan pages `[0, ppb)` of `block`, tracking the page with the
/// largest valid id. By construction of phase 1, at least one page must
/// qualify; if none does, this is a fatal inconsistency -- the block
/// phase 1 chose had no valid header after all.
fn find_last_written_page<T: NandDriver>(
    nand: &mut T,
    block: Block,
    ppb: u32,
    spare_buf: &mut [u8],
) -> (Page, u64) {
    let mut best: Option<(Page, u64)> = None;

    for page in 0..ppb {
        if nand.read_page_spare(block, page, spare_buf).is_ok() {
            let header = PageHeader::from_bytes(spare_buf);
            if let PageId::Valid(id) = header.read_id(spare_buf) {
                let take = match best {
                    None => true,
                    Some((_, best_id)) => id >= best_id,
                };
                if take {
                    best = Some((page, id));
                }
            }
        }
    }

    best.expect("recovery phase 1 chose a block with no valid page header")
}
