//! Ordered register writes for one blit.

use crate::blitter::geometry::BlitParams;
use crate::bus::{Registers, Transport};
use crate::regs::{xr, BlitCtrl};

/// The register writes for one blit operation, in the order the blitter wants them.
///
/// The operands can be inspected but not reordered. [`submit`](Self::submit)
/// writes them and then the trigger (`BLIT_WORDS`), which queues the blit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlitProgram {
    operands: [(u16, u16); 9],
    trigger: u16,
}

impl BlitProgram {
    /// A constant-source fill.
    pub fn fill(params: &BlitParams) -> Self {
        Self {
            operands: [
                (xr::BLIT_CTRL, BlitCtrl::FILL.bits()),
                (xr::BLIT_ANDC, 0x0000),
                (xr::BLIT_XOR, 0x0000),
                (xr::BLIT_MOD_S, 0x0000),
                (xr::BLIT_SRC_S, params.source),
                (xr::BLIT_MOD_D, params.dest_modulo),
                (xr::BLIT_DST_D, params.dest_word_address),
                (xr::BLIT_SHIFT, params.edge_mask.shift_register()),
                (xr::BLIT_LINES, params.line_count_minus_one),
            ],
            trigger: params.word_count_minus_one,
        }
    }

    /// `(register, value)` pairs written before the trigger.
    pub fn operands(&self) -> &[(u16, u16)] {
        &self.operands
    }

    /// Value written to `BLIT_WORDS`.
    pub fn trigger(&self) -> u16 {
        self.trigger
    }

    /// Every write, trigger last.
    pub fn writes(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.operands
            .iter()
            .copied()
            .chain(core::iter::once((xr::BLIT_WORDS, self.trigger)))
    }

    /// Write the operands, then the trigger.
    ///
    /// The caller must already know the blitter has room (`BLIT_FULL` clear).
    pub fn submit<T: Transport>(self, regs: &mut Registers<T>) {
        for (reg, value) in self.operands {
            regs.write_register(reg, value);
        }
        regs.write_register(xr::BLIT_WORDS, self.trigger);
    }
}
