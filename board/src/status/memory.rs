//! Memory heat map
//!
//! Every 32-bit word of memory becomes one pixel, filled column by column.
//! The word is scattered by a Fibonacci hash so that similar contents get
//! distinct colors. Bank 0 (the CPU's 64K view) fills a 128x128 block, the
//! 48K bank 1 a 96x128 block to its right.

use super::{Frame, Page};
use crate::draw::colors::{DKBLUE, GREEN};
use crate::draw::{Canvas, ColorDepth};
use crate::machine::MachineView;

const XOFF: i32 = 3;
const YOFF: i32 = 0;
/// Free space around and between the blocks.
const BRDR: i32 = 3;
const BLOCK_H: i32 = 128;
const BLOCK0_W: i32 = 128;
const BLOCK1_W: i32 = 96;

/// 2^32 / golden ratio
const FIB_HASH: u32 = 2654435769;

/// Raw pixel value for a memory word at the given depth.
pub fn heat_color(word: u32, depth: ColorDepth) -> u16 {
    (word.wrapping_mul(FIB_HASH) >> (32 - depth.bits())) as u16
}

#[derive(Debug, Default)]
pub struct MemoryPage;

impl MemoryPage {
    pub fn new() -> Self {
        Self
    }

    fn draw_static(canvas: &mut Canvas) {
        let w = BLOCK0_W + BLOCK1_W + 4 * BRDR - 1;
        let h = BLOCK_H + 2 * BRDR;
        canvas.fill(DKBLUE);
        canvas.hline(XOFF, YOFF, w, GREEN);
        canvas.hline(XOFF, YOFF + h - 1, w, GREEN);
        canvas.vline(XOFF, YOFF, h, GREEN);
        canvas.vline(XOFF + BLOCK0_W + 2 * BRDR - 1, YOFF, h, GREEN);
        canvas.vline(XOFF + w - 1, YOFF, h, GREEN);
    }

    fn draw_block(canvas: &mut Canvas, machine: &dyn MachineView, bank: usize, x0: i32, width: i32) {
        let len = machine.memory_len(bank);
        if len == 0 {
            return;
        }
        let depth = canvas.depth();
        let mut addr = 0;
        for x in x0..x0 + width {
            for y in YOFF + BRDR..YOFF + BRDR + BLOCK_H {
                if addr + 4 > len {
                    return;
                }
                canvas.set_raw(x, y, heat_color(machine.read_word(bank, addr), depth));
                addr += 4;
            }
        }
    }
}

impl Page for MemoryPage {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        if first {
            Self::draw_static(frame.canvas);
            return;
        }
        Self::draw_block(frame.canvas, frame.machine, 0, XOFF + BRDR, BLOCK0_W);
        if frame.machine.bank_count() > 1 {
            Self::draw_block(frame.canvas, frame.machine, 1, XOFF + 3 * BRDR - 1 + BLOCK0_W, BLOCK1_W);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{AtomicMachine, CpuKind};
    use crate::status::test_util::{lcd_canvas, render};
    use crate::telemetry::Telemetry;

    #[test]
    fn test_heat_color_top_bits() {
        assert_eq!(heat_color(0, ColorDepth::Rgb565), 0);
        assert_eq!(heat_color(1, ColorDepth::Rgb565), (FIB_HASH >> 16) as u16);
        assert_eq!(heat_color(1, ColorDepth::Rgb444), (FIB_HASH >> 20) as u16);
        assert!(heat_color(u32::MAX, ColorDepth::Rgb444) <= 0xfff);
    }

    #[test]
    fn test_render_is_pure() {
        let m = AtomicMachine::new(CpuKind::Z80, 2);
        let t = Telemetry::new();
        for addr in (0..0x4000u16).step_by(7) {
            m.putmem(addr, (addr >> 3) as u8);
        }
        let mut page = MemoryPage::new();
        let mut canvas = lcd_canvas();
        render(&mut page, &mut canvas, &m, &t, true);
        render(&mut page, &mut canvas, &m, &t, false);
        let once = canvas.bytes().to_vec();
        render(&mut page, &mut canvas, &m, &t, false);
        assert_eq!(canvas.bytes(), &once[..]);
    }

    #[test]
    fn test_column_major_fill() {
        let m = AtomicMachine::new(CpuKind::Z80, 1);
        let t = Telemetry::new();
        // second word lands one pixel below the first
        m.putmem(4, 1);
        let mut page = MemoryPage::new();
        let mut canvas = lcd_canvas();
        render(&mut page, &mut canvas, &m, &t, true);
        render(&mut page, &mut canvas, &m, &t, false);
        let x = XOFF + BRDR;
        let y = YOFF + BRDR;
        assert_eq!(canvas.raw_pixel(x, y), Some(0));
        assert_eq!(canvas.raw_pixel(x, y + 1), Some(heat_color(1, ColorDepth::Rgb565)));
        // single bank leaves the right block empty
        assert!(canvas.is_color(XOFF + 3 * BRDR - 1 + BLOCK0_W, y, DKBLUE));
    }
}
