//! # Bitmap Surfaces
//!
//! A [`Surface`] describes a bitmap in VRAM the way the blitter sees it: a
//! start word, a stride in words, and how many pixels share a word.
//!
//! VRAM words are 16 bits. Pixels are packed left to right from the most
//! significant end:
//!
//! ```text
//! 8-bpp:  [ pixel 0 (15:8) | pixel 1 (7:0) ]
//! 4-bpp:  [ p0 | p1 | p2 | p3 ]
//! ```
//!
//! All address math is done in words. The conversion from pixels happens once,
//! here, and nowhere else.
//!
//! A surface is tied to a display mode. When the mode changes, build a new one.

/// Bits per pixel of a bitmap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelDepth {
    /// 16 colours, four pixels per word.
    Bpp4,
    /// 256 colours, two pixels per word.
    Bpp8,
}

impl PixelDepth {
    #[inline(always)]
    pub const fn pixels_per_word(self) -> u16 {
        match self {
            PixelDepth::Bpp4 => 4,
            PixelDepth::Bpp8 => 2,
        }
    }

    /// Nibbles (the unit of the blitter's edge masks) per pixel.
    #[inline(always)]
    pub const fn nibbles_per_pixel(self) -> u16 {
        4 / self.pixels_per_word()
    }

    /// Value of the `bpp` field in a playfield's `GFX_CTRL`.
    #[inline(always)]
    pub const fn gfx_bpp(self) -> u16 {
        match self {
            PixelDepth::Bpp4 => 1,
            PixelDepth::Bpp8 => 2,
        }
    }

    /// A word with every pixel set to `color`.
    ///
    /// In 4-bpp mode only the low nibble of `color` is used.
    #[inline(always)]
    pub const fn splat(self, color: u8) -> u16 {
        match self {
            PixelDepth::Bpp4 => (color as u16 & 0xF) * 0x1111,
            PixelDepth::Bpp8 => (color as u16) << 8 | color as u16,
        }
    }
}

/// A bitmap in VRAM.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    base_address: u16,
    stride_words: u16,
    depth: PixelDepth,
}

impl Surface {
    /// A surface `width_pixels` wide starting at VRAM word `base_address`.
    ///
    /// `width_pixels` should be a multiple of the pixels per word; any
    /// remainder is dropped from the stride.
    pub const fn new(base_address: u16, width_pixels: u16, depth: PixelDepth) -> Self {
        Self {
            base_address,
            stride_words: width_pixels / depth.pixels_per_word(),
            depth,
        }
    }

    #[inline(always)]
    pub const fn base_address(&self) -> u16 {
        self.base_address
    }

    #[inline(always)]
    pub const fn stride_words(&self) -> u16 {
        self.stride_words
    }

    #[inline(always)]
    pub const fn depth(&self) -> PixelDepth {
        self.depth
    }

    #[inline(always)]
    pub const fn pixels_per_word(&self) -> u16 {
        self.depth.pixels_per_word()
    }

    #[inline(always)]
    pub const fn width_pixels(&self) -> u32 {
        self.stride_words as u32 * self.depth.pixels_per_word() as u32
    }

    /// VRAM word holding pixel (`x`, `y`).
    ///
    /// Wraps around the 16-bit VRAM address space; nothing is bounds checked.
    #[inline(always)]
    pub const fn word_address(&self, x: u16, y: u16) -> u16 {
        self.base_address
            .wrapping_add(y.wrapping_mul(self.stride_words))
            .wrapping_add(x / self.depth.pixels_per_word())
    }

    /// Read pixel `x` out of a row of words starting at the surface's left edge.
    pub fn pixel_in_row(&self, row: &[u16], x: u32) -> Option<u8> {
        let ppw = u32::from(self.depth.pixels_per_word());
        let word = *row.get((x / ppw) as usize)?;
        let bits = 16 / ppw;
        let shift = 16 - bits * (x % ppw + 1);
        Some(((word >> shift) & ((1 << bits) - 1)) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_width_over_pixels_per_word() {
        assert_eq!(Surface::new(0, 320, PixelDepth::Bpp8).stride_words(), 160);
        assert_eq!(Surface::new(0, 320, PixelDepth::Bpp4).stride_words(), 80);
        assert_eq!(Surface::new(0, 640, PixelDepth::Bpp8).width_pixels(), 640);
    }

    #[test]
    fn splat_replicates_color() {
        assert_eq!(PixelDepth::Bpp8.splat(0x05), 0x0505);
        assert_eq!(PixelDepth::Bpp8.splat(0xA7), 0xA7A7);
        assert_eq!(PixelDepth::Bpp4.splat(0x0C), 0xCCCC);
        assert_eq!(PixelDepth::Bpp4.splat(0xF3), 0x3333);
    }

    #[test]
    fn word_address_truncates_x() {
        let s = Surface::new(0x1000, 320, PixelDepth::Bpp8);
        assert_eq!(s.word_address(0, 0), 0x1000);
        assert_eq!(s.word_address(1, 0), 0x1000);
        assert_eq!(s.word_address(2, 0), 0x1001);
        assert_eq!(s.word_address(5, 2), 0x1000 + 2 * 160 + 2);
    }

    #[test]
    fn word_address_wraps() {
        let s = Surface::new(0xFFFF, 320, PixelDepth::Bpp8);
        assert_eq!(s.word_address(2, 0), 0x0000);
    }

    #[test]
    fn pixel_in_row_reads_msb_first() {
        let s8 = Surface::new(0, 4, PixelDepth::Bpp8);
        let row = [0x1234, 0x5678];
        assert_eq!(s8.pixel_in_row(&row, 0), Some(0x12));
        assert_eq!(s8.pixel_in_row(&row, 1), Some(0x34));
        assert_eq!(s8.pixel_in_row(&row, 3), Some(0x78));
        assert_eq!(s8.pixel_in_row(&row, 4), None);

        let s4 = Surface::new(0, 8, PixelDepth::Bpp4);
        assert_eq!(s4.pixel_in_row(&row, 0), Some(0x1));
        assert_eq!(s4.pixel_in_row(&row, 3), Some(0x4));
        assert_eq!(s4.pixel_in_row(&row, 6), Some(0x7));
    }
}
