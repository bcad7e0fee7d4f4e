#![no_std]
extern crate alloc;

pub mod adapter;
pub mod blitter;
pub mod reg_blitter;

pub use adapter::{Adapter, SimConfig, XrWrite};
pub use blitter::{BlitEngine, BusyWindow};
