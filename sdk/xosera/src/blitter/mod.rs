//! # Blitter
//!
//! The blitter fills and copies rectangles of VRAM words on its own, in
//! parallel with the CPU. [`Blitter`] drives it for solid rectangle fills.
//!
//! ## Filling a Rectangle
//!
//! ```ignore
//! let screen = Surface::new(0x0000, 320, PixelDepth::Bpp8);
//! let mut blitter = Blitter::new(Registers::new(transport));
//!
//! // Blocks until the rectangle is drawn.
//! blitter.fill_rectangle(&screen, &FillRect::new(10, 20, 64, 32, 0x0F))?;
//! ```
//!
//! ## Parallel Execution
//!
//! [`Blitter::fill_rectangle`] waits for the blit to finish. To get CPU work
//! done while the blitter draws, split it up:
//!
//! ```ignore
//! blitter.start_fill(&screen, &FillRect::new(0, 0, 320, 240, 0))?;
//!
//! update_game_logic(); // runs while the screen clears
//!
//! blitter.wait_done()?;
//! ```
//!
//! ## Queue
//!
//! The blitter holds one operation running plus one waiting. Its status bits:
//!
//! | `BLIT_BUSY` | `BLIT_FULL` | [`EngineState`]           |
//! |-------------|-------------|---------------------------|
//! | 0           | 0           | `Idle`                    |
//! | 1           | 0           | `Executing`               |
//! | 1           | 1           | `Queued` (one waiting)    |
//!
//! Programming the registers while `BLIT_FULL` is set clobbers the waiting
//! operation, so [`Blitter::start_fill`] waits for it to clear (or refuses,
//! see [`Admission`]).
//!
//! ## Edges
//!
//! A word holds 2 (8-bpp) or 4 (4-bpp) pixels, so a rectangle rarely starts
//! and ends on a word boundary. The first and last word of every line are
//! written through nibble masks ([`EdgeMask`]) that keep the neighbouring
//! pixels intact.
//!
//! ## Hazards
//!
//! - Rectangles are not clipped. Anything past the surface edge is written
//!   wherever the address math says, wrapping at 64K words.
//! - With [`WaitPolicy::Forever`](crate::bus::WaitPolicy) a missing adapter
//!   hangs the caller.

pub mod geometry;
pub mod program;

use core::fmt;

use log::debug;

use crate::bus::{Registers, Timeout, Transport};
use crate::regs::Status;
use crate::surface::Surface;

pub use geometry::{BlitParams, EdgeMask, FillRect};
pub use program::BlitProgram;

/// What to do when the blitter queue is full.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Admission {
    /// Wait for room.
    #[default]
    Block,
    /// Return [`BlitError::QueueFull`] right away.
    Reject,
}

/// Blitter state as seen through `SYS_CTRL`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    /// One operation is executing and another is waiting behind it.
    Queued,
    Executing,
}

impl EngineState {
    pub fn from_status(status: Status) -> Self {
        if !status.contains(Status::BLIT_BUSY) {
            EngineState::Idle
        } else if status.contains(Status::BLIT_FULL) {
            EngineState::Queued
        } else {
            EngineState::Executing
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlitError {
    /// The queue was full and [`Admission::Reject`] is in effect.
    QueueFull,
    /// A bounded wait ran out.
    NotResponding { status: u16 },
}

impl From<Timeout> for BlitError {
    fn from(timeout: Timeout) -> Self {
        BlitError::NotResponding {
            status: timeout.status,
        }
    }
}

impl fmt::Display for BlitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlitError::QueueFull => write!(f, "blitter queue is full"),
            BlitError::NotResponding { status } => {
                write!(f, "blitter not responding (status {:#06x})", status)
            }
        }
    }
}

/// Owned handle to the adapter's (single) blitter.
pub struct Blitter<T: Transport> {
    regs: Registers<T>,
    admission: Admission,
}

impl<T: Transport> Blitter<T> {
    pub fn new(regs: Registers<T>) -> Self {
        Self {
            regs,
            admission: Admission::Block,
        }
    }

    pub fn with_admission(mut self, admission: Admission) -> Self {
        self.admission = admission;
        self
    }

    pub fn admission(&self) -> Admission {
        self.admission
    }

    pub fn registers(&mut self) -> &mut Registers<T> {
        &mut self.regs
    }

    pub fn engine_state(&mut self) -> EngineState {
        EngineState::from_status(self.regs.status())
    }

    /// Fill `rect` on `surface` and wait for the blitter to finish.
    ///
    /// Empty rectangles return immediately without touching the hardware.
    pub fn fill_rectangle(&mut self, surface: &Surface, rect: &FillRect) -> Result<(), BlitError> {
        if self.start_fill(surface, rect)?.is_some() {
            self.wait_done()?;
        }
        Ok(())
    }

    /// Queue a fill of `rect` on `surface` without waiting for it to run.
    ///
    /// Returns the parameters that were programmed, or `None` for an empty
    /// rectangle (in which case nothing was written).
    pub fn start_fill(
        &mut self,
        surface: &Surface,
        rect: &FillRect,
    ) -> Result<Option<BlitParams>, BlitError> {
        let Some(params) = BlitParams::for_fill(surface, rect) else {
            return Ok(None);
        };

        self.wait_ready()?;

        debug!(
            "fill ({}, {}) {}x{} color {:#04x}: fw={:#x} lw={:#x} va={:#06x} ww={} mod={:#06x} shift={:#06x}",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            rect.color,
            params.edge_mask.first,
            params.edge_mask.last,
            params.dest_word_address,
            params.word_width,
            params.dest_modulo,
            params.edge_mask.shift_register(),
        );

        BlitProgram::fill(&params).submit(&mut self.regs);
        Ok(Some(params))
    }

    /// Wait until the blitter can take another operation.
    pub fn wait_ready(&mut self) -> Result<(), BlitError> {
        match self.admission {
            Admission::Block => self.regs.wait_while(Status::BLIT_FULL)?,
            Admission::Reject => {
                if self.regs.status().contains(Status::BLIT_FULL) {
                    return Err(BlitError::QueueFull);
                }
            }
        }
        Ok(())
    }

    /// Wait until every queued operation has finished.
    pub fn wait_done(&mut self) -> Result<(), BlitError> {
        self.regs.wait_while(Status::BLIT_BUSY)?;
        Ok(())
    }
}
