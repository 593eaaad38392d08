//! External collaborators: the NAND driver and the boot clock.
//!
//! Neither is implemented by this crate -- the low-level page program/read,
//! block erase, bad-block query/mark, and data-move primitives all live on
//! the other side of this trait, same as the teacher's `DharaNand`. ECC
//! computation is entirely the driver's concern; the ring only carries
//! whatever `u32` the driver hands back from a data-page program.

use crate::error::RingError;

/// Physical block index, 0-based.
pub type Block = u32;

/// Page index within a block, 0-based.
pub type Page = u32;

/// A raw NAND flash chip, as seen by the ring engine.
///
/// Implementors are responsible for ECC, ordering of the physical program
/// operation, and reporting `Err` only for conditions the ring should treat
/// as a bad block (anything else is a fatal error propagated through
/// [`RingError::Driver`]).
pub trait NandDriver {
    /// Total number of physical blocks on the chip.
    fn blocks(&self) -> u32;

    /// Pages per erase block.
    fn pages_per_block(&self) -> u32;

    /// Size in bytes of a page's data region.
    fn page_data_size(&self) -> usize;

    /// Size in bytes of a page's spare (out-of-band) region.
    fn page_spare_size(&self) -> usize;

    /// Is this block marked bad by the driver?
    fn is_bad(&mut self, blk: Block) -> bool;

    /// Mark this block bad. No return value: there is nothing the caller
    /// can do if the mark itself fails to stick.
    fn mark_bad(&mut self, blk: Block);

    /// Erase a block. `Err` means the erase failed and the block should be
    /// treated as bad; the ring will call `mark_bad` itself.
    fn erase(&mut self, blk: Block) -> Result<(), RingError>;

    /// Read a page's full spare area into `buf` (`buf.len() ==
    /// page_spare_size()`).
    fn read_page_spare(&mut self, blk: Block, page: Page, buf: &mut [u8]) -> Result<(), RingError>;

    /// Read a page's full data region into `buf` (`buf.len() ==
    /// page_data_size()`).
    fn read_page_data(&mut self, blk: Block, page: Page, buf: &mut [u8]) -> Result<(), RingError>;

    /// Program a page's data region. Returns the driver-computed ECC on
    /// success. `Err` means the program failed and the block should be
    /// treated as bad.
    fn write_page_data(&mut self, blk: Block, page: Page, buf: &[u8]) -> Result<u32, RingError>;

    /// Program a page's spare region. `Err` means the program failed and
    /// the block should be treated as bad.
    fn write_page_spare(&mut self, blk: Block, page: Page, buf: &[u8]) -> Result<(), RingError>;

    /// Program both data and spare in one operation, bypassing any
    /// engine-side header sealing. Used exclusively by the session closer
    /// to stamp deterministic garbage over a possibly-corrupt tail.
    fn write_page_whole(
        &mut self,
        blk: Block,
        page: Page,
        data: &[u8],
        spare: &[u8],
    ) -> Result<(), RingError>;

    /// Move `n_pages` pages (data + spare) from `src_blk` to `dst_blk`,
    /// starting at page 0 of each block, through `scratch`. `Err` means the
    /// move failed and `dst_blk` should be treated as bad.
    fn data_move(
        &mut self,
        src_blk: Block,
        dst_blk: Block,
        n_pages: u32,
        scratch: &mut [u8],
    ) -> Result<(), RingError>;
}

/// A monotonic, boot-relative microsecond clock.
///
/// Kept as a trait, not a bare function, so tests can drive it
/// deterministically the same way the teacher isolates the NAND behind a
/// trait for exactly this reason.
pub trait Clock {
    /// Microseconds elapsed since boot. Never decreases.
    fn now_boot_us(&self) -> u64;
}
