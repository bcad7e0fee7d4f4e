use alloc::vec::Vec;
use heapless::Deque;
use log::{debug, trace, warn};

use crate::reg_blitter::BlitOp;

/// When one blit operation was queued, started and finished, in bus ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusyWindow {
    pub op: BlitOp,
    pub queued_at: u64,
    pub started_at: u64,
    pub finished_at: Option<u64>,
}

impl BusyWindow {
    pub fn overlaps(&self, other: &BusyWindow) -> bool {
        let self_end = self.finished_at.unwrap_or(u64::MAX);
        let other_end = other.finished_at.unwrap_or(u64::MAX);
        self.queued_at < other_end && other.queued_at < self_end
    }
}

#[derive(Debug)]
struct Active {
    op: BlitOp,
    window: usize,
    line: u16,
    word: u16,
    dst: u16,
    src: u16,
}

impl Active {
    fn new(op: BlitOp, window: usize) -> Self {
        Self {
            op,
            window,
            line: 0,
            word: 0,
            dst: op.dst_d,
            src: op.src_s,
        }
    }
}

/// The blitter: one operation executing, at most one waiting.
#[derive(Debug, Default)]
pub struct BlitEngine {
    current: Option<Active>,
    pending: Deque<(BlitOp, usize), 1>,
    windows: Vec<BusyWindow>,
    pub words_written: u64,
}

impl BlitEngine {
    #[inline(always)]
    pub fn busy(&self) -> bool {
        self.current.is_some() || !self.pending.is_empty()
    }

    #[inline(always)]
    pub fn full(&self) -> bool {
        self.pending.is_full()
    }

    /// Every operation accepted so far, oldest first.
    pub fn windows(&self) -> &[BusyWindow] {
        &self.windows
    }

    /// Accept an operation. Hands it back if the queue is full.
    pub fn enqueue(&mut self, op: BlitOp, now: u64) -> Result<(), BlitOp> {
        let window = self.windows.len();

        if self.current.is_none() {
            self.windows.push(BusyWindow {
                op,
                queued_at: now,
                started_at: now,
                finished_at: None,
            });
            self.start(op, window, now);
            return Ok(());
        }

        self.pending.push_back((op, window)).map_err(|(op, _)| op)?;
        self.windows.push(BusyWindow {
            op,
            queued_at: now,
            started_at: now,
            finished_at: None,
        });
        trace!("blit queued behind running op");
        Ok(())
    }

    fn start(&mut self, op: BlitOp, window: usize, now: u64) {
        debug!(
            "starting blit: dst ${:04X} mod {} words {} lines {} src {:04X} const {} shift {:04X}",
            op.dst_d,
            op.mod_d as i16,
            u32::from(op.words) + 1,
            u32::from(op.lines) + 1,
            op.src_s,
            op.ctrl.const_source(),
            op.shift.bits(),
        );
        if op.shift.nibble_shift() != 0 {
            warn!("nibble shift {} not simulated", op.shift.nibble_shift());
        }
        self.windows[window].started_at = now;
        self.current = Some(Active::new(op, window));
    }

    /// Run the blitter for one VRAM word.
    pub fn cycle(&mut self, vram: &mut [u16], now: u64) {
        let Some(active) = self.current.as_mut() else {
            return;
        };
        let op = active.op;

        let mut nibbles: u8 = 0xF;
        if active.word == 0 {
            nibbles &= op.shift.first_mask();
        }
        if active.word == op.words {
            nibbles &= op.shift.last_mask();
        }

        let s = if op.ctrl.const_source() {
            op.src_s
        } else {
            vram[usize::from(active.src) % vram.len()]
        };
        let value = (s & !op.andc) ^ op.xor;
        let mask = expand_nibbles(nibbles) & !transparent_bits(&op, s);

        let slot = &mut vram[usize::from(active.dst) % vram.len()];
        *slot = (*slot & !mask) | (value & mask);
        self.words_written += 1;

        active.dst = active.dst.wrapping_add(1);
        if !op.ctrl.const_source() {
            active.src = active.src.wrapping_add(1);
        }

        if active.word < op.words {
            active.word += 1;
            return;
        }

        active.word = 0;
        active.dst = active.dst.wrapping_add(op.mod_d);
        if !op.ctrl.const_source() {
            active.src = active.src.wrapping_add(op.mod_s);
        }

        if active.line < op.lines {
            active.line += 1;
            return;
        }

        let window = active.window;
        self.windows[window].finished_at = Some(now);
        debug!("blit complete, wrote {} words", op.word_count());

        self.current = None;
        if let Some((next, next_window)) = self.pending.pop_front() {
            self.start(next, next_window, now);
        }
    }
}

/// Nibble mask (bit 3 = bits 15:12) to a 16-bit write mask.
#[inline(always)]
pub fn expand_nibbles(nibbles: u8) -> u16 {
    (0..4).fold(0u16, |mask, n| {
        if nibbles & (1 << n) != 0 {
            mask | (0xF << (n * 4))
        } else {
            mask
        }
    })
}

/// Bits of the source word that transparency keeps from being written.
fn transparent_bits(op: &BlitOp, s: u16) -> u16 {
    if !op.ctrl.transparent() {
        return 0;
    }

    let t = u16::from(op.ctrl.transparent_value());
    if op.ctrl.transparent_8bit() {
        let mut bits = 0;
        if s >> 8 == t {
            bits |= 0xFF00;
        }
        if s & 0xFF == t {
            bits |= 0x00FF;
        }
        bits
    } else {
        (0..4).fold(0u16, |bits, n| {
            if (s >> (n * 4)) & 0xF == t & 0xF {
                bits | (0xF << (n * 4))
            } else {
                bits
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg_blitter::{BlitCtrl, BlitShift};
    use alloc::vec;

    fn fill(dst: u16, words: u16, lines: u16, mod_d: u16, src: u16, shift: u16) -> BlitOp {
        BlitOp {
            ctrl: BlitCtrl::new(0x0001),
            src_s: src,
            dst_d: dst,
            mod_d,
            shift: BlitShift::new(shift),
            words: words - 1,
            lines: lines - 1,
            ..Default::default()
        }
    }

    fn run(engine: &mut BlitEngine, vram: &mut [u16]) -> u64 {
        let mut t = 0;
        while engine.busy() {
            t += 1;
            engine.cycle(vram, t);
        }
        t
    }

    #[test]
    fn expands_nibbles() {
        assert_eq!(expand_nibbles(0xF), 0xFFFF);
        assert_eq!(expand_nibbles(0x3), 0x00FF);
        assert_eq!(expand_nibbles(0xC), 0xFF00);
        assert_eq!(expand_nibbles(0x8), 0xF000);
        assert_eq!(expand_nibbles(0x0), 0x0000);
    }

    #[test]
    fn fills_lines_with_modulo() {
        let mut vram = vec![0u16; 32];
        let mut engine = BlitEngine::default();
        // 2 words wide, 3 lines, stride 8
        engine.enqueue(fill(1, 2, 3, 6, 0xABAB, 0xFF00), 0).unwrap();
        let ticks = run(&mut engine, &mut vram);

        assert_eq!(ticks, 6);
        for line in 0..3 {
            assert_eq!(vram[line * 8], 0);
            assert_eq!(vram[line * 8 + 1], 0xABAB);
            assert_eq!(vram[line * 8 + 2], 0xABAB);
            assert_eq!(vram[line * 8 + 3], 0);
        }
        assert_eq!(engine.windows()[0].finished_at, Some(6));
    }

    #[test]
    fn single_word_applies_both_masks() {
        let mut vram = vec![0x1111u16; 4];
        let mut engine = BlitEngine::default();
        // first mask keeps the right byte, last mask keeps the left byte: nothing
        engine.enqueue(fill(0, 1, 1, 0, 0xFFFF, 0x3C00), 0).unwrap();
        run(&mut engine, &mut vram);
        assert_eq!(vram[0], 0x1111);

        engine.enqueue(fill(1, 1, 1, 0, 0xFFFF, 0x3F00), 0).unwrap();
        run(&mut engine, &mut vram);
        assert_eq!(vram[1], 0x11FF);
    }

    #[test]
    fn edge_words_are_masked() {
        let mut vram = vec![0x1111u16; 4];
        let mut engine = BlitEngine::default();
        engine.enqueue(fill(0, 3, 1, 0, 0x0505, 0x3C00), 0).unwrap();
        run(&mut engine, &mut vram);
        assert_eq!(vram, vec![0x1105, 0x0505, 0x0511, 0x1111]);
    }

    #[test]
    fn andc_and_xor_apply_to_source() {
        let mut vram = vec![0u16; 1];
        let mut engine = BlitEngine::default();
        let mut op = fill(0, 1, 1, 0, 0xFFFF, 0xFF00);
        op.andc = 0x0F0F;
        op.xor = 0x0001;
        engine.enqueue(op, 0).unwrap();
        run(&mut engine, &mut vram);
        assert_eq!(vram[0], 0xF0F1);
    }

    #[test]
    fn copies_from_vram_source() {
        let mut vram = vec![0u16; 16];
        vram[0] = 0x1234;
        vram[1] = 0x5678;
        let mut engine = BlitEngine::default();
        let op = BlitOp {
            ctrl: BlitCtrl::new(0x0000),
            src_s: 0,
            dst_d: 8,
            shift: BlitShift::new(0xFF00),
            words: 1,
            lines: 0,
            ..Default::default()
        };
        engine.enqueue(op, 0).unwrap();
        run(&mut engine, &mut vram);
        assert_eq!(&vram[8..10], &[0x1234, 0x5678]);
    }

    #[test]
    fn transparent_bytes_are_skipped() {
        let mut vram = vec![0x7777u16; 1];
        let mut engine = BlitEngine::default();
        let mut op = fill(0, 1, 1, 0, 0x0012, 0xFF00);
        op.ctrl = BlitCtrl::new(0x0031); // transparent 0x00, 8-bit compare, constant
        engine.enqueue(op, 0).unwrap();
        run(&mut engine, &mut vram);
        assert_eq!(vram[0], 0x7712);
    }

    #[test]
    fn queue_holds_one_behind_running() {
        let mut vram = vec![0u16; 64];
        let mut engine = BlitEngine::default();
        assert!(!engine.busy());

        engine.enqueue(fill(0, 4, 1, 0, 1, 0xFF00), 1).unwrap();
        assert!(engine.busy());
        assert!(!engine.full());

        engine.enqueue(fill(8, 4, 1, 0, 2, 0xFF00), 2).unwrap();
        assert!(engine.full());

        let third = fill(16, 4, 1, 0, 3, 0xFF00);
        assert_eq!(engine.enqueue(third, 3), Err(third));

        run(&mut engine, &mut vram);
        assert!(!engine.busy());
        assert_eq!(engine.windows().len(), 2);
        assert_eq!(engine.windows()[1].started_at, engine.windows()[0].finished_at.unwrap());
        assert!(engine.windows()[0].overlaps(&engine.windows()[1]));
        assert_eq!(vram[16], 0);
    }

    #[test]
    fn windows_overlap_only_when_intervals_meet() {
        let op = BlitOp::default();
        let a = BusyWindow { op, queued_at: 0, started_at: 0, finished_at: Some(10) };
        let b = BusyWindow { op, queued_at: 11, started_at: 11, finished_at: Some(20) };
        let c = BusyWindow { op, queued_at: 5, started_at: 10, finished_at: None };
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn rejected_op_leaves_no_window() {
        let mut vram = vec![0u16; 16];
        let mut engine = BlitEngine::default();
        engine.enqueue(fill(0, 2, 1, 0, 1, 0xFF00), 0).unwrap();
        engine.enqueue(fill(4, 2, 1, 0, 2, 0xFF00), 1).unwrap();

        let rejected = fill(8, 2, 1, 0, 3, 0xFF00);
        assert_eq!(engine.enqueue(rejected, 2), Err(rejected));
        assert_eq!(engine.windows().len(), 2);

        run(&mut engine, &mut vram);
        assert_eq!(&vram[..10], &[1, 1, 0, 0, 2, 2, 0, 0, 0, 0]);

        // room again once drained
        engine.enqueue(rejected, 10).unwrap();
        run(&mut engine, &mut vram);
        assert_eq!(&vram[8..10], &[3, 3]);
    }
}
