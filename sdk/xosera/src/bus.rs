//! # Register Access
//!
//! [`Transport`] moves 16-bit words to and from the XM register window, and
//! nothing else. [`Registers`] builds the rest on top of it:
//!
//! - XR register access through `WR_XADDR`/`RD_XADDR` and `XDATA`
//! - busy-wait primitives on status bits
//!
//! Writes reach the adapter in program order. Some writes are triggers (e.g.
//! `BLIT_WORDS`), so callers rely on that.
//!
//! ## Waiting
//!
//! The adapter has no way to report that it is gone. By default a wait polls
//! forever, so a missing or wedged adapter shows up as a hang. Use
//! [`WaitPolicy::Spins`] to bound the number of polls instead:
//!
//! ```ignore
//! let mut regs = Registers::new(transport).with_policy(WaitPolicy::Spins(100_000));
//! regs.wait_while(Status::BLIT_BUSY)?; // Err(Timeout) if it never clears
//! ```

use core::fmt;

use log::warn;

use crate::regs::{xm, Status};

/// Word access to the XM register window.
///
/// `reg` is the XM register number (`0..16`), see [`regs::xm`](crate::regs::xm).
pub trait Transport {
    fn write_word(&mut self, reg: u8, value: u16);
    fn read_word(&mut self, reg: u8) -> u16;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    #[inline(always)]
    fn write_word(&mut self, reg: u8, value: u16) {
        (**self).write_word(reg, value)
    }

    #[inline(always)]
    fn read_word(&mut self, reg: u8) -> u16 {
        (**self).read_word(reg)
    }
}

/// How long the wait primitives keep polling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Poll until the bit changes, however long that takes.
    #[default]
    Forever,
    /// Give up after this many polls.
    Spins(u32),
}

/// A bounded wait ran out of polls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timeout {
    /// Last value read from the polled register.
    pub status: u16,
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device not responding (last status {:#06x})", self.status)
    }
}

/// Register Access Layer for one adapter.
pub struct Registers<T: Transport> {
    transport: T,
    policy: WaitPolicy,
}

impl<T: Transport> Registers<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: WaitPolicy::Forever,
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: WaitPolicy) {
        self.policy = policy;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Write an XM register.
    #[inline(always)]
    pub fn write_main(&mut self, reg: u8, value: u16) {
        self.transport.write_word(reg, value);
    }

    /// Read an XM register.
    #[inline(always)]
    pub fn read_main(&mut self, reg: u8) -> u16 {
        self.transport.read_word(reg)
    }

    /// Write an XR register (or XR memory word).
    #[inline(always)]
    pub fn write_register(&mut self, addr: u16, value: u16) {
        self.transport.write_word(xm::WR_XADDR, addr);
        self.transport.write_word(xm::XDATA, value);
    }

    /// Read an XR register (or XR memory word).
    ///
    /// Write-only registers (the whole blitter block) read back as garbage.
    #[inline(always)]
    pub fn read_register(&mut self, addr: u16) -> u16 {
        self.transport.write_word(xm::RD_XADDR, addr);
        self.transport.read_word(xm::XDATA)
    }

    /// Current `SYS_CTRL` status bits.
    #[inline(always)]
    pub fn status(&mut self) -> Status {
        Status::from_bits_truncate(self.read_main(xm::SYS_CTRL))
    }

    /// Poll `bit` of XM register `reg` until it reads 0.
    ///
    /// Bits past 15 do not exist, so waiting on one returns immediately.
    pub fn wait_while_bit(&mut self, reg: u8, bit: usize) -> Result<(), Timeout> {
        let mask = bit_mask(bit);
        self.poll(reg, |word| word & mask == 0)
    }

    /// Poll `bit` of XM register `reg` until it reads 1.
    pub fn wait_until_bit(&mut self, reg: u8, bit: usize) -> Result<(), Timeout> {
        let mask = bit_mask(bit);
        self.poll(reg, |word| word & mask == mask)
    }

    /// Poll `SYS_CTRL` until none of `flags` is set.
    pub fn wait_while(&mut self, flags: Status) -> Result<(), Timeout> {
        self.poll(xm::SYS_CTRL, |word| {
            !Status::from_bits_truncate(word).intersects(flags)
        })
    }

    /// Poll `SYS_CTRL` until all of `flags` are set.
    pub fn wait_until(&mut self, flags: Status) -> Result<(), Timeout> {
        self.poll(xm::SYS_CTRL, |word| {
            Status::from_bits_truncate(word).contains(flags)
        })
    }

    fn poll(&mut self, reg: u8, done: impl Fn(u16) -> bool) -> Result<(), Timeout> {
        let mut polls: u32 = 0;
        loop {
            let word = self.transport.read_word(reg);
            if done(word) {
                return Ok(());
            }

            polls = polls.saturating_add(1);
            if let WaitPolicy::Spins(limit) = self.policy {
                if polls >= limit {
                    warn!(
                        "gave up waiting on XM {:#x} after {} polls (last {:#06x})",
                        reg, polls, word
                    );
                    return Err(Timeout { status: word });
                }
            }

            core::hint::spin_loop();
        }
    }
}

#[inline(always)]
fn bit_mask(bit: usize) -> u16 {
    u32::try_from(bit)
        .ok()
        .and_then(|bit| 1u16.checked_shl(bit))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::xr;

    /// Records every access; reads come from a scripted sequence.
    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u8, u16)>,
        reads: Vec<u8>,
        script: Vec<u16>,
    }

    impl Transport for Recorder {
        fn write_word(&mut self, reg: u8, value: u16) {
            self.writes.push((reg, value));
        }

        fn read_word(&mut self, reg: u8) -> u16 {
            self.reads.push(reg);
            if self.script.is_empty() {
                0
            } else {
                self.script.remove(0)
            }
        }
    }

    #[test]
    fn xr_write_goes_through_address_then_data() {
        let mut regs = Registers::new(Recorder::default());
        regs.write_register(xr::BLIT_DST_D, 0x1234);

        assert_eq!(
            regs.transport().writes,
            vec![(xm::WR_XADDR, xr::BLIT_DST_D), (xm::XDATA, 0x1234)]
        );
    }

    #[test]
    fn xr_read_latches_address_first() {
        let mut regs = Registers::new(Recorder {
            script: vec![0xBEEF],
            ..Default::default()
        });

        assert_eq!(regs.read_register(xr::PA_REGS), 0xBEEF);
        assert_eq!(regs.transport().writes, vec![(xm::RD_XADDR, xr::PA_REGS)]);
        assert_eq!(regs.transport().reads, vec![xm::XDATA]);
    }

    #[test]
    fn wait_while_polls_until_clear() {
        let busy = Status::BLIT_BUSY.bits();
        let mut regs = Registers::new(Recorder {
            script: vec![busy, busy, busy, 0],
            ..Default::default()
        });

        assert_eq!(regs.wait_while(Status::BLIT_BUSY), Ok(()));
        assert_eq!(regs.transport().reads.len(), 4);
        assert!(regs.transport().reads.iter().all(|&r| r == xm::SYS_CTRL));
    }

    #[test]
    fn wait_until_polls_until_set() {
        let vblank = Status::VBLANK.bits();
        let mut regs = Registers::new(Recorder {
            script: vec![0, 0, vblank],
            ..Default::default()
        });

        assert_eq!(regs.wait_until(Status::VBLANK), Ok(()));
        assert_eq!(regs.transport().reads.len(), 3);
    }

    #[test]
    fn other_bits_do_not_satisfy_wait() {
        let mut regs = Registers::new(Recorder {
            script: vec![Status::BLIT_FULL.bits() | Status::BLIT_BUSY.bits(), Status::BLIT_BUSY.bits(), 0],
            ..Default::default()
        });

        regs.wait_while(Status::BLIT_FULL).unwrap();
        assert_eq!(regs.transport().reads.len(), 2);
    }

    #[test]
    fn bounded_wait_reports_timeout() {
        let busy = Status::BLIT_BUSY.bits();
        let mut regs = Registers::new(Recorder {
            script: vec![busy; 10],
            ..Default::default()
        })
        .with_policy(WaitPolicy::Spins(5));

        assert_eq!(regs.wait_while(Status::BLIT_BUSY), Err(Timeout { status: busy }));
        assert_eq!(regs.transport().reads.len(), 5);
    }

    #[test]
    fn wait_on_arbitrary_register_bit() {
        let mut regs = Registers::new(Recorder {
            script: vec![0x0001, 0x0001, 0x0000],
            ..Default::default()
        });

        regs.wait_while_bit(xm::INT_CTRL, 0).unwrap();
        assert_eq!(regs.transport().reads, vec![xm::INT_CTRL; 3]);
    }

    #[test]
    fn combined_wait_holds_until_every_flag_clears() {
        let full = Status::BLIT_FULL.bits() | Status::BLIT_BUSY.bits();
        let busy = Status::BLIT_BUSY.bits();
        let mut regs = Registers::new(Recorder {
            script: vec![full, busy, busy, 0],
            ..Default::default()
        });

        regs.wait_while(Status::BLIT_FULL | Status::BLIT_BUSY).unwrap();
        assert_eq!(regs.transport().reads.len(), 4);
    }

    #[test]
    fn combined_wait_times_out_while_any_flag_is_set() {
        let mut regs = Registers::new(Recorder {
            script: vec![Status::BLIT_FULL.bits(); 20],
            ..Default::default()
        })
        .with_policy(WaitPolicy::Spins(10));

        assert_eq!(
            regs.wait_while(Status::BLIT_FULL | Status::BLIT_BUSY),
            Err(Timeout { status: Status::BLIT_FULL.bits() })
        );
        assert_eq!(regs.transport().reads.len(), 10);
    }

    #[test]
    fn wait_until_needs_every_flag() {
        let vblank = Status::VBLANK.bits();
        let both = Status::VBLANK.bits() | Status::HBLANK.bits();
        let mut regs = Registers::new(Recorder {
            script: vec![vblank, vblank, both],
            ..Default::default()
        });

        regs.wait_until(Status::VBLANK | Status::HBLANK).unwrap();
        assert_eq!(regs.transport().reads.len(), 3);
    }

    #[test]
    fn empty_flags_and_missing_bits_do_not_wait() {
        let mut regs = Registers::new(Recorder {
            script: vec![0xFFFF; 4],
            ..Default::default()
        })
        .with_policy(WaitPolicy::Spins(2));

        assert_eq!(regs.wait_while(Status::empty()), Ok(()));
        assert_eq!(regs.wait_until(Status::empty()), Ok(()));
        assert_eq!(regs.wait_while_bit(xm::SYS_CTRL, 16), Ok(()));
        assert_eq!(regs.wait_until_bit(xm::SYS_CTRL, 99), Ok(()));
        assert_eq!(regs.transport().reads.len(), 4);
    }
}
