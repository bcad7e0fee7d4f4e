use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use xemu_core::Adapter;
use xosera::surface::Surface;

// default 16 colour palette (CGA order)
const BASE16: [[u8; 3]; 16] = [
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0xAA],
    [0x00, 0xAA, 0x00],
    [0x00, 0xAA, 0xAA],
    [0xAA, 0x00, 0x00],
    [0xAA, 0x00, 0xAA],
    [0xAA, 0x55, 0x00],
    [0xAA, 0xAA, 0xAA],
    [0x55, 0x55, 0x55],
    [0x55, 0x55, 0xFF],
    [0x55, 0xFF, 0x55],
    [0x55, 0xFF, 0xFF],
    [0xFF, 0x55, 0x55],
    [0xFF, 0x55, 0xFF],
    [0xFF, 0xFF, 0x55],
    [0xFF, 0xFF, 0xFF],
];

/// Colour for a pixel value. Values past 15 get a 3-3-2 RGB encoding.
pub fn palette(index: u8) -> Rgb<u8> {
    if let Some(rgb) = BASE16.get(usize::from(index)) {
        return Rgb(*rgb);
    }
    let r = (index >> 5) & 0x7;
    let g = (index >> 2) & 0x7;
    let b = index & 0x3;
    Rgb([r * 36, g * 36, b * 85])
}

pub fn snapshot(sim: &Adapter, surface: &Surface, height: u16) -> RgbImage {
    let width = surface.width_pixels();
    RgbImage::from_fn(width, u32::from(height), |x, y| {
        palette(sim.pixel(surface, x as u16, y as u16))
    })
}

pub fn write_png(sim: &Adapter, surface: &Surface, height: u16, path: &Path) -> Result<()> {
    snapshot(sim, surface, height)
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}
