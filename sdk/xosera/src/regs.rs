//! # Register Map
//!
//! Addresses and bit layouts of the Xosera register file.
//!
//! ## XM Status (`SYS_CTRL` high byte)
//!
//! | Bit (word) | Flag        | Meaning                                          |
//! |------------|-------------|--------------------------------------------------|
//! | 15         | `MEM_WAIT`  | contended memory read/write still pending        |
//! | 14         | `BLIT_FULL` | blitter queue full, don't touch blit registers   |
//! | 13         | `BLIT_BUSY` | blitter has an operation queued or executing     |
//! | 11         | `HBLANK`    | scanout is in horizontal blank                   |
//! | 10         | `VBLANK`    | scanout is in vertical blank                     |
//!
//! ## XR Blitter Block (`$40-$49`)
//!
//! Ten write-only registers. Writing `BLIT_WORDS` queues the operation, so it
//! must always be the last one written.

use bit_field::BitField;

/// XM (main) registers, directly addressable on the bus.
pub mod xm {
    /// Status bits, FPGA config, write masking.
    pub const SYS_CTRL: u8 = 0x0;
    /// Interrupt status/control.
    pub const INT_CTRL: u8 = 0x1;
    /// 1/10th millisecond timer (read only).
    pub const TIMER: u8 = 0x2;
    /// XR register/address for `XDATA` reads.
    pub const RD_XADDR: u8 = 0x3;
    /// XR register/address for `XDATA` writes.
    pub const WR_XADDR: u8 = 0x4;
    /// Read/write the XR location at `RD_XADDR`/`WR_XADDR`, then increment it.
    pub const XDATA: u8 = 0x5;
    pub const RD_INCR: u8 = 0x6;
    pub const RD_ADDR: u8 = 0x7;
    pub const WR_INCR: u8 = 0x8;
    pub const WR_ADDR: u8 = 0x9;
    pub const DATA: u8 = 0xA;
    pub const DATA_2: u8 = 0xB;
    pub const UART: u8 = 0xC;
    pub const FEATURES: u8 = 0xF;

    /// Number of XM registers in the window.
    pub const COUNT: usize = 16;
}

/// XR (extended) registers and memory regions.
pub mod xr {
    pub const VID_CTRL: u16 = 0x00;
    pub const COPP_CTRL: u16 = 0x01;
    pub const AUD_CTRL: u16 = 0x02;
    pub const SCANLINE: u16 = 0x03;
    pub const VID_LEFT: u16 = 0x04;
    pub const VID_RIGHT: u16 = 0x05;

    /// Playfield A register block (`GFX_CTRL` first).
    pub const PA_REGS: u16 = 0x10;
    /// Playfield B register block (`GFX_CTRL` first).
    pub const PB_REGS: u16 = 0x18;

    // offsets within a playfield block
    pub const GFX_CTRL: u16 = 0x0;
    pub const TILE_CTRL: u16 = 0x1;
    pub const DISP_ADDR: u16 = 0x2;
    pub const LINE_LEN: u16 = 0x3;
    pub const HV_FSCALE: u16 = 0x4;
    pub const HV_SCROLL: u16 = 0x5;
    pub const LINE_ADDR: u16 = 0x6;

    /// Blit control: `[15:8]` transparency value, `[5]` 8-bit transparency,
    /// `[4]` transparency on, `[0]` S is a constant.
    pub const BLIT_CTRL: u16 = 0x40;
    /// AND-complement constant.
    pub const BLIT_ANDC: u16 = 0x41;
    /// XOR constant.
    pub const BLIT_XOR: u16 = 0x42;
    /// Modulo added to S after each line.
    pub const BLIT_MOD_S: u16 = 0x43;
    /// S source VRAM address, or the constant itself.
    pub const BLIT_SRC_S: u16 = 0x44;
    /// Modulo added to D after each line.
    pub const BLIT_MOD_D: u16 = 0x45;
    /// D destination VRAM address.
    pub const BLIT_DST_D: u16 = 0x46;
    /// First/last word nibble masks and nibble right shift.
    pub const BLIT_SHIFT: u16 = 0x47;
    /// Lines minus one.
    pub const BLIT_LINES: u16 = 0x48;
    /// Words per line minus one. Writing this starts the blit.
    pub const BLIT_WORDS: u16 = 0x49;

    pub const BLIT_FIRST: u16 = BLIT_CTRL;
    pub const BLIT_LAST: u16 = BLIT_WORDS;

    pub const TILE_ADDR: u16 = 0x4000;
    pub const TILE_SIZE: u16 = 0x1400;
    pub const COLOR_ADDR: u16 = 0x8000;
    pub const COLOR_SIZE: u16 = 0x0200;
    pub const COPPER_ADDR: u16 = 0xC000;
    pub const COPPER_SIZE: u16 = 0x0400;

    /// `true` for addresses in the blitter register block.
    #[inline(always)]
    pub const fn is_blit_reg(addr: u16) -> bool {
        addr >= BLIT_FIRST && addr <= BLIT_LAST
    }
}

bitflags::bitflags! {
    /// Read-only status bits of `SYS_CTRL`.
    ///
    /// Any combination can be handed to the
    /// [`Registers`](crate::bus::Registers) wait primitives.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Status: u16 {
        /// Memory read/write operation pending (contended memory).
        const MEM_WAIT  = 1 << 15;
        /// Blitter queue is full, do not write the blit registers.
        const BLIT_FULL = 1 << 14;
        /// Blitter is still performing (or holding) an operation.
        const BLIT_BUSY = 1 << 13;
        /// Scanout is in horizontal blank.
        const HBLANK    = 1 << 11;
        /// Scanout is in vertical blank.
        const VBLANK    = 1 << 10;
    }
}

/// Value for `BLIT_CTRL`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct BlitCtrl {
    /// Pixel value treated as transparent, `None` for opaque blits.
    pub transparent: Option<u8>,
    /// Compare transparency per byte (8-bpp) instead of per nibble.
    pub transparent_8bit: bool,
    /// S is a constant rather than a VRAM address.
    pub const_source: bool,
}

impl BlitCtrl {
    /// Solid fill from a constant, nothing transparent.
    pub const FILL: BlitCtrl = BlitCtrl {
        transparent: None,
        transparent_8bit: false,
        const_source: true,
    };

    pub fn bits(self) -> u16 {
        let mut word = 0u16;
        word.set_bits(8..16, u16::from(self.transparent.unwrap_or(0)));
        word.set_bit(5, self.transparent_8bit);
        word.set_bit(4, self.transparent.is_some());
        word.set_bit(0, self.const_source);
        word
    }
}
