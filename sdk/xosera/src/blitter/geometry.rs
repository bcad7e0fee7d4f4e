//! Rectangle → blitter parameter math.

use bit_field::BitField;

use crate::surface::{PixelDepth, Surface};

/// A solid rectangle fill request, in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FillRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Colour index. 4-bpp surfaces use the low nibble.
    pub color: u8,
}

impl FillRect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16, color: u8) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
        }
    }

    /// Zero-width or zero-height requests draw nothing.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// First and last word nibble masks of each blitted line.
///
/// Bit 3 of a mask is the leftmost nibble of the word (bits 15:12), bit 0 the
/// rightmost. A set bit means "write this nibble".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EdgeMask {
    pub first: u8,
    pub last: u8,
}

impl EdgeMask {
    /// Every nibble of every word.
    pub const FULL: EdgeMask = EdgeMask {
        first: 0xF,
        last: 0xF,
    };

    /// Masks for a run starting at `x` and ending just before `x + width`.
    ///
    /// Only the positions of the two ends within their words matter.
    pub fn for_run(depth: PixelDepth, x: u32, width: u32) -> Self {
        let ppw = u32::from(depth.pixels_per_word());
        let npp = u32::from(depth.nibbles_per_pixel());
        let lead = (x % ppw) * npp;
        let tail = ((x + width) % ppw) * npp;

        Self {
            first: (0xF >> lead) as u8,
            // a run that ends on a word boundary fills its last word
            last: if tail == 0 { 0xF } else { (0xF0 >> tail) as u8 & 0xF },
        }
    }

    /// `BLIT_SHIFT` value: first mask in `[15:12]`, last in `[11:8]`, no shift.
    pub fn shift_register(self) -> u16 {
        let mut word = 0u16;
        word.set_bits(12..16, u16::from(self.first & 0xF));
        word.set_bits(8..12, u16::from(self.last & 0xF));
        word
    }

    pub fn from_shift_register(word: u16) -> Self {
        Self {
            first: word.get_bits(12..16) as u8,
            last: word.get_bits(8..12) as u8,
        }
    }
}

/// Everything the blitter needs for one fill, in its own units.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlitParams {
    /// Word holding the top-left pixel.
    pub dest_word_address: u16,
    /// Words touched per line, partial words included.
    pub word_width: u16,
    /// Added to the destination after each line.
    pub dest_modulo: u16,
    pub edge_mask: EdgeMask,
    pub line_count_minus_one: u16,
    pub word_count_minus_one: u16,
    /// Constant source word (the colour, replicated).
    pub source: u16,
}

impl BlitParams {
    /// Parameters for filling `rect` on `surface`, or `None` if `rect` is empty.
    ///
    /// Nothing here looks at the surface height, and addresses wrap at 64K
    /// words: a rectangle hanging off the surface lands wherever the
    /// arithmetic puts it.
    pub fn for_fill(surface: &Surface, rect: &FillRect) -> Option<Self> {
        if rect.is_empty() {
            return None;
        }

        let depth = surface.depth();
        let ppw = u32::from(depth.pixels_per_word());
        let x = u32::from(rect.x);
        let width = u32::from(rect.width);

        let word_width = ((x % ppw + width + ppw - 1) / ppw) as u16;
        let dest_word_address = surface.word_address(rect.x, rect.y);

        Some(Self {
            dest_word_address,
            word_width,
            dest_modulo: surface.stride_words().wrapping_sub(word_width),
            edge_mask: EdgeMask::for_run(depth, x, width),
            line_count_minus_one: rect.height - 1,
            word_count_minus_one: word_width - 1,
            source: depth.splat(rect.color),
        })
    }
}
