//! Append engine and lifecycle: the public write path, plus the
//! `Uninit -> Idle -> Mounted -> Idle -> Stop` state machine that ties the
//! other components together.

use crate::block::{self, erase_next};
use crate::config::{RingConfig, MIN_GOOD_BLOCKS};
use crate::error::RingError;
use crate::header::{PageHeader, PAGE_ID_FIRST};
use crate::nand::{Block, Clock, NandDriver, Page};
use crate::recovery;
use crate::rescue::rescue;
use crate::session::close_prev_session;

/// Lifecycle state of a [`NandRing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingState {
    Uninit,
    Idle,
    Mounted,
    Stop,
}

/// A circular append-only log over a contiguous span of physical NAND
/// blocks.
///
/// `N` bounds the size of the ring's owned scratch buffer: it backs the
/// data-rescue path's page migration and, sliced to `page_spare_size()`
/// bytes, the header staging buffer used by recovery and every sealed
/// write. It must be at least `page_data_size() + page_spare_size()` for
/// the bound NAND (checked by `start()`). Moving this buffer into the ring
/// instance, rather than a process-wide global, is what makes two
/// `NandRing`s over two NAND chips safe to use concurrently.
pub struct NandRing<const N: usize, T: NandDriver, C: Clock> {
    nand: T,
    clock: C,
    scratch: [u8; N],

    start_blk: Block,
    len: u32,

    state: RingState,

    cur_blk: Block,
    cur_page: Page,
    cur_id: u64,
    utc_correction: u32,
}

impl<const N: usize, T: NandDriver, C: Clock> NandRing<N, T, C> {
    /// Construct a ring bound to a NAND driver and clock. No NAND
    /// operations are performed yet; call `start` then `mount`.
    pub fn new(nand: T, clock: C) -> Self {
        NandRing {
            nand,
            clock,
            scratch: [0u8; N],
            start_blk: 0,
            len: 0,
            state: RingState::Uninit,
            cur_blk: 0,
            cur_page: 0,
            cur_id: 0,
            utc_correction: 0,
        }
    }

    /// Bind the ring to a physical span of blocks. `Uninit -> Idle`.
    pub fn start(&mut self, config: RingConfig) {
        debug_assert_eq!(
            self.state,
            RingState::Uninit,
            "start requires an uninitialized ring"
        );
        debug_assert!(
            config.start_blk + config.len <= self.nand.blocks(),
            "ring [{}, {}) exceeds chip size {}",
            config.start_blk,
            config.start_blk + config.len,
            self.nand.blocks()
        );
        debug_assert!(
            N >= self.nand.page_data_size() + self.nand.page_spare_size(),
            "ring scratch buffer too small for rescue data-move and header staging"
        );

        self.start_blk = config.start_blk;
        self.len = config.len;
        self.state = RingState::Idle;
    }

    /// Locate the most recently written page and resume appending after it,
    /// repairing a possibly corrupt tail along the way. `Idle -> Mounted`.
    ///
    /// Returns [`RingError::TooFewGoodBlocks`] (ring stays `Idle`) if fewer
    /// than [`MIN_GOOD_BLOCKS`] blocks in the ring are usable.
    pub fn mount(&mut self) -> Result<(), RingError> {
        debug_assert_eq!(self.state, RingState::Idle, "mount requires an idle ring");

        let good = block::total_good(&mut self.nand, self.start_blk, self.len);
        if good < MIN_GOOD_BLOCKS {
            return Err(RingError::TooFewGoodBlocks(MIN_GOOD_BLOCKS));
        }

        let pss = self.nand.page_spare_size();
        match recovery::recover(&mut self.nand, self.start_blk, self.len, &mut self.scratch[..pss]) {
            None => self.mkfs()?,
            Some(found) => {
                log::debug!(
                    "recovered block={} page={} id={}",
                    found.block,
                    found.page,
                    found.id
                );
                let new_blk = close_prev_session(
                    &mut self.nand,
                    self.start_blk,
                    self.len,
                    found.block,
                    found.page,
                )?;
                self.cur_blk = new_blk;
                self.cur_page = 0;
                self.cur_id = found.id + 1;
            }
        }

        self.state = RingState::Mounted;
        Ok(())
    }

    /// Empty-ring bootstrap: erase the first good block and start the
    /// identifier sequence at `PAGE_ID_FIRST`.
    fn mkfs(&mut self) -> Result<(), RingError> {
        log::debug!("empty ring, formatting");
        let blk = erase_next(
            &mut self.nand,
            self.start_blk,
            self.len,
            self.start_blk + self.len - 1,
        )?;
        self.cur_blk = blk;
        self.cur_page = 0;
        self.cur_id = PAGE_ID_FIRST;
        Ok(())
    }

    /// Append one page. `data` must be exactly `page_data_size()` bytes.
    ///
    /// Consumes exactly one identifier, even if the underlying write
    /// requires a rescue. Program failures on data or spare are invisible
    /// to the caller: the block is marked bad, durable pages are rescued
    /// into a fresh block, and the write is retried there.
    pub fn write_page(&mut self, data: &[u8]) -> Result<(), RingError> {
        debug_assert_eq!(
            self.state,
            RingState::Mounted,
            "write_page requires a mounted ring"
        );
        debug_assert_eq!(
            data.len(),
            self.nand.page_data_size(),
            "data must be exactly page_data_size bytes"
        );

        let pss = self.nand.page_spare_size();

        for _ in 0..self.len {
            let ecc = match self.nand.write_page_data(self.cur_blk, self.cur_page, data) {
                Ok(ecc) => ecc,
                Err(_) => {
                    self.cur_blk = self.rescue_current()?;
                    continue;
                }
            };

            let header = PageHeader::new(ecc, self.cur_id, self.utc_correction, self.clock.now_boot_us());
            header.to_bytes(&mut self.scratch[..pss]);

            match self.nand.write_page_spare(self.cur_blk, self.cur_page, &self.scratch[..pss]) {
                Ok(()) => {
                    self.advance_cursor()?;
                    return Ok(());
                }
                Err(_) => {
                    self.cur_blk = self.rescue_current()?;
                    continue;
                }
            }
        }

        Err(RingError::RingExhausted)
    }

    fn rescue_current(&mut self) -> Result<Block, RingError> {
        rescue(
            &mut self.nand,
            self.start_blk,
            self.len,
            self.cur_blk,
            self.cur_blk,
            self.cur_page,
            &mut self.scratch,
        )
    }

    fn advance_cursor(&mut self) -> Result<(), RingError> {
        self.cur_id += 1;
        self.cur_page += 1;

        if self.cur_page == self.nand.pages_per_block() {
            self.cur_page = 0;
            self.cur_blk = erase_next(&mut self.nand, self.start_blk, self.len, self.cur_blk)?;
        }

        Ok(())
    }

    /// Number of non-bad blocks in the ring.
    pub fn total_good(&mut self) -> u32 {
        block::total_good(&mut self.nand, self.start_blk, self.len)
    }

    /// Update the offset copied into the header of every subsequent write.
    /// Takes effect starting with the next `write_page` call.
    pub fn set_utc_correction(&mut self, utc_correction: u32) {
        self.utc_correction = utc_correction;
    }

    /// `Mounted -> Idle`.
    pub fn umount(&mut self) {
        debug_assert_eq!(self.state, RingState::Mounted, "umount requires a mounted ring");
        self.state = RingState::Idle;
    }

    /// `Idle -> Stop`.
    pub fn stop(&mut self) {
        debug_assert_eq!(self.state, RingState::Idle, "stop requires an idle ring");
        self.state = RingState::Stop;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RingState {
        self.state
    }

    // Getters used by tests and, potentially, a higher layer that wants to
    // observe cursor position without re-deriving it.
    pub fn cur_blk(&self) -> Block {
        self.cur_blk
    }
    pub fn cur_page(&self) -> Page {
        self.cur_page
    }
    pub fn cur_id(&self) -> u64 {
        self.cur_id
    }

    /// Escape hatch for tests that need to drive the simulated NAND
    /// directly (e.g. to read back a written page for verification).
    pub fn nand_mut(&mut self) -> &mut T {
        &mut self.nand
    }
}
