//! # Xosera
//!
//! Hardware abstraction layer for the [Xosera](https://github.com/XarkLabs/Xosera)
//! video adapter, focused on its blitter.
//!
//! ## Quick Start
//!
//! Everything goes through a [`Registers`](bus::Registers) handle, which owns a
//! [`Transport`](bus::Transport). On real hardware that is the [`Mmio`](mmio::Mmio)
//! window; in tests it is usually the simulated adapter from `xemu-core`.
//!
//! ```ignore
//! use xosera::{bus::Registers, mmio::Mmio, surface::{PixelDepth, Surface}};
//! use xosera::blitter::{Blitter, FillRect};
//!
//! let regs = Registers::new(unsafe { Mmio::new(Mmio::ROSCO_M68K_BASE) });
//! let mut blitter = Blitter::new(regs);
//!
//! // 320 pixels wide, 8 bits per pixel, bitmap at VRAM 0x0000
//! let screen = Surface::new(0x0000, 320, PixelDepth::Bpp8);
//!
//! blitter.fill_rectangle(&screen, &FillRect::new(10, 10, 32, 32, 0x05))?;
//! ```
//!
//! ## Register Spaces
//!
//! | Space | Access                                    | Module          |
//! |-------|-------------------------------------------|-----------------|
//! | XM    | directly on the bus, 16 word registers    | [`regs::xm`]    |
//! | XR    | indirect, via `WR_XADDR`/`RD_XADDR`+`XDATA` | [`regs::xr`]  |
//!
//! The blitter lives in XR space (`$40-$49`); its status bits live in the high
//! byte of XM `SYS_CTRL`.

#![cfg_attr(not(test), no_std)]

pub mod blitter;
pub mod bus;
pub mod mmio;
pub mod playfield;
pub mod regs;
pub mod surface;
