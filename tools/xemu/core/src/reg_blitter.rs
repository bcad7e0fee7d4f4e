use bitfield::bitfield;
use log::trace;
use xosera::regs::xr;

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq, Default)]
    pub struct BlitCtrl(u16);
    impl Debug;
    pub u8, transparent_value, _: 15, 8;
    pub transparent_8bit, _: 5;
    pub transparent, _: 4;
    pub const_source, _: 0;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq, Default)]
    pub struct BlitShift(u16);
    impl Debug;
    pub u8, first_mask, _: 15, 12;
    pub u8, last_mask, _: 11, 8;
    pub u8, nibble_shift, _: 1, 0;
}

impl BlitCtrl {
    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u16 {
        self.0
    }
}

impl BlitShift {
    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u16 {
        self.0
    }
}

/// Operands latched from the XR blit block when `BLIT_WORDS` is written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct BlitOp {
    pub ctrl: BlitCtrl,
    pub andc: u16,
    pub xor: u16,
    pub mod_s: u16,
    pub src_s: u16,
    pub mod_d: u16,
    pub dst_d: u16,
    pub shift: BlitShift,
    pub lines: u16,
    pub words: u16,
}

impl BlitOp {
    /// VRAM words this operation writes.
    pub fn word_count(&self) -> u32 {
        (u32::from(self.lines) + 1) * (u32::from(self.words) + 1)
    }
}

/// The blitter's write-only register block.
#[derive(Debug, Default)]
pub struct BlitterRegisters {
    pub ctrl: u16,
    pub andc: u16,
    pub xor: u16,
    pub mod_s: u16,
    pub src_s: u16,
    pub mod_d: u16,
    pub dst_d: u16,
    pub shift: u16,
    pub lines: u16,
}

impl BlitterRegisters {
    /// Store a register write. Returns the latched operation when `addr` is
    /// `BLIT_WORDS`.
    #[inline(always)]
    pub fn write_word(&mut self, addr: u16, data: u16) -> Option<BlitOp> {
        match addr {
            xr::BLIT_CTRL => self.ctrl = data,
            xr::BLIT_ANDC => self.andc = data,
            xr::BLIT_XOR => self.xor = data,
            xr::BLIT_MOD_S => self.mod_s = data,
            xr::BLIT_SRC_S => self.src_s = data,
            xr::BLIT_MOD_D => self.mod_d = data,
            xr::BLIT_DST_D => self.dst_d = data,
            xr::BLIT_SHIFT => self.shift = data,
            xr::BLIT_LINES => self.lines = data,
            xr::BLIT_WORDS => return Some(self.latch(data)),
            _ => trace!("ignoring write to non-blit XR ${:04X}", addr),
        }
        None
    }

    fn latch(&self, words: u16) -> BlitOp {
        BlitOp {
            ctrl: BlitCtrl(self.ctrl),
            andc: self.andc,
            xor: self.xor,
            mod_s: self.mod_s,
            src_s: self.src_s,
            mod_d: self.mod_d,
            dst_d: self.dst_d,
            shift: BlitShift(self.shift),
            lines: self.lines,
            words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_fields() {
        let ctrl = BlitCtrl(0xAB31);
        assert_eq!(ctrl.transparent_value(), 0xAB);
        assert!(ctrl.transparent_8bit());
        assert!(ctrl.transparent());
        assert!(ctrl.const_source());
        assert!(!BlitCtrl(0x0000).const_source());
    }

    #[test]
    fn shift_fields() {
        let shift = BlitShift(0x3C02);
        assert_eq!(shift.first_mask(), 0x3);
        assert_eq!(shift.last_mask(), 0xC);
        assert_eq!(shift.nibble_shift(), 2);
    }

    #[test]
    fn words_write_latches_everything() {
        let mut regs = BlitterRegisters::default();
        assert_eq!(regs.write_word(xr::BLIT_CTRL, 0x0001), None);
        assert_eq!(regs.write_word(xr::BLIT_SRC_S, 0x0505), None);
        assert_eq!(regs.write_word(xr::BLIT_DST_D, 0x1234), None);
        assert_eq!(regs.write_word(xr::BLIT_LINES, 3), None);

        let op = regs.write_word(xr::BLIT_WORDS, 9).unwrap();
        assert!(op.ctrl.const_source());
        assert_eq!(op.src_s, 0x0505);
        assert_eq!(op.dst_d, 0x1234);
        assert_eq!(op.lines, 3);
        assert_eq!(op.words, 9);
        assert_eq!(op.word_count(), 40);
    }
}
