//! CPU register page

use super::{hex_char, Frame, InfoLine, Page};
use crate::draw::colors::{DKBLUE, DKYELLOW, GREEN, RED, WHITE};
use crate::draw::{Canvas, TextGrid};
use crate::machine::{CpuKind, MachineView, Reg};
use crate::registers::{self, RegKind, RegisterPage};

#[derive(Default)]
pub struct CpuRegPage {
    cpu: Option<CpuKind>,
    grid: Option<TextGrid>,
    info: InfoLine,
}

impl CpuRegPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw_static(canvas: &mut Canvas, table: &RegisterPage) -> TextGrid {
        let grid = TextGrid::new(canvas, table.font, table.xoff, table.yoff, table.spc, table.cols, Some(table.rows));
        canvas.fill(DKBLUE);
        for &(col, row, len) in table.vlines {
            grid.vline(canvas, col, row, len, DKYELLOW);
        }
        for &(col, row, len) in table.hlines {
            grid.hline(canvas, col, row, len, DKYELLOW);
        }
        for cell in table.cells {
            if let Some(label) = cell.label {
                grid.str(canvas, cell.label_col(), cell.row, label, WHITE, DKBLUE);
            }
        }
        grid
    }

    fn draw_values(canvas: &mut Canvas, grid: &TextGrid, table: &RegisterPage, machine: &dyn MachineView) {
        for cell in table.cells {
            match cell.kind {
                RegKind::Byte(reg) => hex(canvas, grid, cell.col, cell.row, machine.register(reg), 2),
                RegKind::Word(reg) => hex(canvas, grid, cell.col, cell.row, machine.register(reg), 4),
                RegKind::Flag { glyph, mask } => {
                    let set = machine.register(Reg::F) as u8 & mask != 0;
                    let color = if set { GREEN } else { RED };
                    grid.char(canvas, cell.col, cell.row, glyph, color, DKBLUE);
                }
                RegKind::Interrupt { glyph, mask } => {
                    let set = machine.register(Reg::IFF) as u8 & mask == mask;
                    let color = if set { GREEN } else { RED };
                    grid.char(canvas, cell.col, cell.row, glyph, color, DKBLUE);
                }
                RegKind::Refresh => {
                    let r = (machine.register(Reg::R_) & 0x80) | (machine.register(Reg::R) & 0x7f);
                    hex(canvas, grid, cell.col, cell.row, r, 2);
                }
            }
        }
    }
}

/// Draw `digits` hex digits of `value` ending at `col`.
fn hex(canvas: &mut Canvas, grid: &TextGrid, col: i32, row: i32, value: u16, digits: i32) {
    for i in 0..digits {
        let nibble = (value as u32) >> (4 * i);
        grid.char(canvas, col - i, row, hex_char(nibble), GREEN, DKBLUE);
    }
}

impl Page for CpuRegPage {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        let cpu = frame.machine.cpu();
        // a switched CPU needs its own chrome
        let first = first || self.cpu != Some(cpu);

        let Some(table) = registers::table(cpu) else {
            if first {
                log::warn!("no register layout for {}", cpu.name());
                frame.canvas.fill(DKBLUE);
                self.cpu = Some(cpu);
                self.grid = None;
            }
            return;
        };

        if first {
            self.cpu = Some(cpu);
            self.grid = Some(Self::draw_static(frame.canvas, table));
        } else if let Some(grid) = self.grid.as_ref() {
            Self::draw_values(frame.canvas, grid, table, frame.machine);
        }
        self.info.draw(frame, first);
    }
}
