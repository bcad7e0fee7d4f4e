use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use log::{trace, warn};

use xosera::bus::Transport;
use xosera::regs::{xm, xr, Status};
use xosera::surface::Surface;

use crate::blitter::{BlitEngine, BusyWindow};
use crate::reg_blitter::BlitterRegisters;

pub const VRAM_WORDS: usize = 0x1_0000;
pub const XR_WORDS: usize = 0x1_0000;

/// Timing knobs for the simulated adapter.
///
/// Time is counted in bus accesses: every XM read or write is one tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// VRAM words the blitter writes per tick.
    pub words_per_access: u32,
    pub ticks_per_line: u32,
    pub visible_ticks: u32,
    pub lines_per_frame: u32,
    pub visible_lines: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            words_per_access: 8,
            ticks_per_line: 100,
            visible_ticks: 80,
            lines_per_frame: 525,
            visible_lines: 480,
        }
    }
}

/// One write that reached XR space, in arrival order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct XrWrite {
    pub addr: u16,
    pub value: u16,
    pub tick: u64,
}

/// A register-level Xosera: XM and XR register files, VRAM and the blitter.
///
/// Hand it (or `&mut` it) to [`xosera::bus::Registers`] like any other
/// transport.
pub struct Adapter {
    config: SimConfig,
    stalled: bool,
    tick: u64,

    xm: [u16; xm::COUNT],
    rd_xaddr: u16,
    wr_xaddr: u16,

    // heap allocations, these are 128K each
    xr: Box<[u16]>,
    vram: Box<[u16]>,

    blit_regs: BlitterRegisters,
    engine: BlitEngine,

    journal: Vec<XrWrite>,
    overruns: u32,
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Adapter {
    pub fn new(config: SimConfig) -> Self {
        let mut main = [0u16; xm::COUNT];
        main[usize::from(xm::RD_INCR)] = 1;
        main[usize::from(xm::WR_INCR)] = 1;

        Self {
            config,
            stalled: false,
            tick: 0,
            xm: main,
            rd_xaddr: 0,
            wr_xaddr: 0,
            xr: vec![0u16; XR_WORDS].into_boxed_slice(),
            vram: vec![0u16; VRAM_WORDS].into_boxed_slice(),
            blit_regs: BlitterRegisters::default(),
            engine: BlitEngine::default(),
            journal: Vec::new(),
            overruns: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Freeze (or thaw) the blitter. A frozen blitter never finishes, which is
    /// how a wedged adapter looks from the bus.
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    pub fn stalled(&self) -> bool {
        self.stalled
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn vram(&self) -> &[u16] {
        &self.vram
    }

    pub fn vram_mut(&mut self) -> &mut [u16] {
        &mut self.vram
    }

    /// XR memory/register word, without the side effects of a bus read.
    pub fn xr_word(&self, addr: u16) -> u16 {
        self.xr[usize::from(addr)]
    }

    pub fn engine(&self) -> &BlitEngine {
        &self.engine
    }

    pub fn busy_windows(&self) -> &[BusyWindow] {
        self.engine.windows()
    }

    pub fn journal(&self) -> &[XrWrite] {
        &self.journal
    }

    /// Blit register writes dropped because the queue was full.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Pixel value at `(x, y)` of `surface`.
    pub fn pixel(&self, surface: &Surface, x: u16, y: u16) -> u8 {
        let word = self.vram[usize::from(surface.word_address(x, y))];
        let ppw = surface.pixels_per_word();
        surface
            .pixel_in_row(&[word], u32::from(x % ppw))
            .unwrap_or_default()
    }

    /// Words `[start, start + len)` of `surface` row `y`, wrapping at the end
    /// of VRAM.
    pub fn row(&self, surface: &Surface, y: u16, len: usize) -> Vec<u16> {
        let start = surface.word_address(0, y);
        (0..len)
            .map(|i| self.vram[usize::from(start.wrapping_add(i as u16))])
            .collect()
    }

    pub fn status(&self) -> Status {
        let mut status = Status::empty();
        status.set(Status::BLIT_BUSY, self.engine.busy());
        status.set(Status::BLIT_FULL, self.engine.full());

        let line_ticks = u64::from(self.config.ticks_per_line.max(1));
        let frame_lines = u64::from(self.config.lines_per_frame.max(1));
        let h = self.tick % line_ticks;
        let v = (self.tick / line_ticks) % frame_lines;
        status.set(Status::HBLANK, h >= u64::from(self.config.visible_ticks));
        status.set(Status::VBLANK, v >= u64::from(self.config.visible_lines));
        status
    }

    fn scanline(&self) -> u16 {
        let line_ticks = u64::from(self.config.ticks_per_line.max(1));
        let frame_lines = u64::from(self.config.lines_per_frame.max(1));
        ((self.tick / line_ticks) % frame_lines) as u16
    }

    /// Let `ticks` go by without any bus traffic.
    pub fn step(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.advance();
        }
    }

    /// Run until the blitter is idle. Returns the ticks it took, or `None`
    /// if the blitter is stalled.
    pub fn settle(&mut self) -> Option<u64> {
        if self.stalled && self.engine.busy() {
            return None;
        }
        if self.config.words_per_access == 0 && self.engine.busy() {
            return None;
        }

        let start = self.tick;
        while self.engine.busy() {
            self.advance();
        }
        Some(self.tick - start)
    }

    fn advance(&mut self) {
        self.tick += 1;
        if self.stalled {
            return;
        }
        for _ in 0..self.config.words_per_access {
            if !self.engine.busy() {
                break;
            }
            self.engine.cycle(&mut self.vram, self.tick);
        }
    }

    fn write_xr(&mut self, addr: u16, value: u16) {
        self.journal.push(XrWrite {
            addr,
            value,
            tick: self.tick,
        });

        if !xr::is_blit_reg(addr) {
            self.xr[usize::from(addr)] = value;
            return;
        }

        if self.engine.full() {
            self.overruns += 1;
            warn!(
                "blit register ${:02X} written while queue full (tick {}), dropped",
                addr, self.tick
            );
            return;
        }

        if let Some(op) = self.blit_regs.write_word(addr, value) {
            if let Err(op) = self.engine.enqueue(op, self.tick) {
                self.overruns += 1;
                warn!("blit dropped, queue full: {:?}", op);
            }
        }
    }

    fn read_xr(&mut self, addr: u16) -> u16 {
        match addr {
            xr::SCANLINE => self.scanline(),
            a if xr::is_blit_reg(a) => {
                trace!("read of write-only blit register ${:02X}", a);
                0
            }
            a => self.xr[usize::from(a)],
        }
    }
}

impl Transport for Adapter {
    fn write_word(&mut self, reg: u8, value: u16) {
        self.advance();
        trace!("XM[{:X}] <- {:04X}", reg, value);

        match reg & 0xF {
            xm::RD_XADDR => self.rd_xaddr = value,
            xm::WR_XADDR => self.wr_xaddr = value,
            xm::XDATA => {
                self.write_xr(self.wr_xaddr, value);
                self.wr_xaddr = self.wr_xaddr.wrapping_add(1);
            }
            xm::DATA => {
                let addr = self.xm[usize::from(xm::WR_ADDR)];
                self.vram[usize::from(addr)] = value;
                self.xm[usize::from(xm::WR_ADDR)] =
                    addr.wrapping_add(self.xm[usize::from(xm::WR_INCR)]);
            }
            r => self.xm[usize::from(r)] = value,
        }
    }

    fn read_word(&mut self, reg: u8) -> u16 {
        self.advance();

        match reg & 0xF {
            xm::SYS_CTRL => self.status().bits() | (self.xm[usize::from(xm::SYS_CTRL)] & 0x00FF),
            xm::TIMER => (self.tick / 10) as u16,
            xm::RD_XADDR => self.rd_xaddr,
            xm::WR_XADDR => self.wr_xaddr,
            xm::XDATA => {
                let value = self.read_xr(self.rd_xaddr);
                self.rd_xaddr = self.rd_xaddr.wrapping_add(1);
                value
            }
            xm::DATA => {
                let addr = self.xm[usize::from(xm::RD_ADDR)];
                self.xm[usize::from(xm::RD_ADDR)] =
                    addr.wrapping_add(self.xm[usize::from(xm::RD_INCR)]);
                self.vram[usize::from(addr)]
            }
            r => self.xm[usize::from(r)],
        }
    }
}
