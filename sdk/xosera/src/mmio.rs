//! # Memory-Mapped Transport
//!
//! Xosera sits on a 6800-style 8-bit bus wired to data lines 8-15, so each
//! XM register shows up as four bytes: high byte, pad, low byte, pad.
//!
//! | Offset    | Contents                     |
//! |-----------|------------------------------|
//! | `reg*4+0` | high byte                    |
//! | `reg*4+1` | (unused)                     |
//! | `reg*4+2` | low byte                     |
//! | `reg*4+3` | (unused)                     |
//!
//! Words are always moved high byte first, which is what a 68k `MOVEP.W` does.
//! Some registers act on the low byte write (`XDATA`, `WR_XADDR`, ...), so the
//! order is not negotiable.

use volatile_register::RW;

use crate::bus::Transport;
use crate::regs::xm;

/// One XM register as it appears on the bus.
#[repr(C)]
pub struct XmSlot {
    pub h: RW<u8>,
    _h_pad: u8,
    pub l: RW<u8>,
    _l_pad: u8,
}

/// The full 16-register XM window.
#[repr(C)]
pub struct XmWindow {
    pub regs: [XmSlot; xm::COUNT],
}

/// [`Transport`] over the memory-mapped XM window.
pub struct Mmio {
    window: &'static XmWindow,
}

impl Mmio {
    /// XM window base on a rosco_m68k board.
    pub const ROSCO_M68K_BASE: usize = 0x00F8_0060;

    /// Map the XM window at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of an Xosera XM window (64 bytes) that
    /// nothing else accesses for the lifetime of the returned value.
    pub unsafe fn new(base: usize) -> Self {
        Self {
            window: unsafe { &*(base as *const XmWindow) },
        }
    }

    #[inline(always)]
    fn slot(&self, reg: u8) -> &XmSlot {
        &self.window.regs[usize::from(reg) % xm::COUNT]
    }
}

/// Byte lane of an XM slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Lane {
    High,
    Low,
}

/// The byte writes for one word, in bus order: high lane, then low.
#[inline(always)]
fn byte_writes(value: u16) -> [(Lane, u8); 2] {
    let [hi, lo] = value.to_be_bytes();
    [(Lane::High, hi), (Lane::Low, lo)]
}

impl Transport for Mmio {
    #[inline(always)]
    fn write_word(&mut self, reg: u8, value: u16) {
        let slot = self.slot(reg);
        for (lane, byte) in byte_writes(value) {
            let target = match lane {
                Lane::High => &slot.h,
                Lane::Low => &slot.l,
            };
            unsafe { target.write(byte) };
        }
    }

    #[inline(always)]
    fn read_word(&mut self, reg: u8) -> u16 {
        let slot = self.slot(reg);
        let hi = slot.h.read();
        let lo = slot.l.read();
        u16::from_be_bytes([hi, lo])
    }
}
