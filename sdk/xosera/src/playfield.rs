//! # Playfields
//!
//! Xosera composes two playfields, A over B. Each one has a small register
//! block in XR space; this module only knows how to point one at a bitmap
//! [`Surface`] and how to blank it.
//!
//! ```ignore
//! let screen = Surface::new(0x0000, 320, PixelDepth::Bpp8);
//! Playfield::A.show_bitmap(&mut regs, &screen, Repeat::X2, Repeat::X2);
//! Playfield::B.blank(&mut regs);
//! ```
//!
//! ## `GFX_CTRL`
//!
//! | Bits    | Field        |
//! |---------|--------------|
//! | `15:8`  | colour base  |
//! | `7`     | blank        |
//! | `6`     | bitmap       |
//! | `5:4`   | bpp          |
//! | `3:2`   | h repeat     |
//! | `1:0`   | v repeat     |

use bit_field::BitField;

use crate::bus::{Registers, Transport};
use crate::regs::xr;
use crate::surface::Surface;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Playfield {
    A,
    B,
}

/// Pixel repeat factor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Repeat {
    X1 = 0,
    X2 = 1,
    X3 = 2,
    X4 = 3,
}

/// Value for a playfield's `GFX_CTRL`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GfxCtrl {
    pub color_base: u8,
    pub blank: bool,
    pub bitmap: bool,
    pub bpp: u16,
    pub h_repeat: Repeat,
    pub v_repeat: Repeat,
}

impl GfxCtrl {
    pub fn bits(self) -> u16 {
        let mut word = 0u16;
        word.set_bits(8..16, u16::from(self.color_base));
        word.set_bit(7, self.blank);
        word.set_bit(6, self.bitmap);
        word.set_bits(4..6, self.bpp & 0b11);
        word.set_bits(2..4, self.h_repeat as u16);
        word.set_bits(0..2, self.v_repeat as u16);
        word
    }
}

impl Playfield {
    /// First register of this playfield's block.
    #[inline(always)]
    pub const fn base(self) -> u16 {
        match self {
            Playfield::A => xr::PA_REGS,
            Playfield::B => xr::PB_REGS,
        }
    }

    /// Display `surface` as a bitmap.
    pub fn show_bitmap<T: Transport>(
        self,
        regs: &mut Registers<T>,
        surface: &Surface,
        h_repeat: Repeat,
        v_repeat: Repeat,
    ) {
        let ctrl = GfxCtrl {
            color_base: 0,
            blank: false,
            bitmap: true,
            bpp: surface.depth().gfx_bpp(),
            h_repeat,
            v_repeat,
        };

        let base = self.base();
        regs.write_register(base + xr::GFX_CTRL, ctrl.bits());
        regs.write_register(base + xr::DISP_ADDR, surface.base_address());
        regs.write_register(base + xr::LINE_LEN, surface.stride_words());
        regs.write_register(base + xr::HV_FSCALE, 0);
        regs.write_register(base + xr::HV_SCROLL, 0);
    }

    /// Turn the playfield off (draws the border colour).
    pub fn blank<T: Transport>(self, regs: &mut Registers<T>) {
        let mut ctrl = regs.read_register(self.base() + xr::GFX_CTRL);
        ctrl.set_bit(7, true);
        regs.write_register(self.base() + xr::GFX_CTRL, ctrl);
    }
}
