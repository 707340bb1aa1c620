//! Disk drive page
//!
//! One row per drive:
//!
//! ```text
//! A (o) T05 S1A A1234
//! ```
//!
//! The LED shows the last access direction. A row whose drive has not
//! been accessed for `DRIVE_IDLE_SECS` seconds is blanked and the drive is
//! marked idle.

use embedded_graphics::prelude::Point;

use super::{hex_char, Frame, InfoLine, Page};
use crate::constants::{DRIVE_IDLE_SECS, NUM_DISKS};
use crate::draw::colors::{CYAN, DKBLUE, DKYELLOW, GREEN, RED, WHEAT, YELLOW};
use crate::draw::{Canvas, TextGrid, FONT_LARGE, FONT_SMALL};

const XOFF: i32 = 40;
const YOFF: i32 = 0;
const SPC: i32 = 8;
const COLS: i32 = 16;

pub(crate) const TRACK_COL: i32 = 4;
pub(crate) const SECTOR_COL: i32 = 8;
/// Last column of the DMA address.
pub(crate) const ADDR_COL: i32 = 15;

pub(crate) fn layout(canvas: &Canvas) -> TextGrid {
    TextGrid::new(canvas, FONT_LARGE, XOFF, YOFF, SPC, Some(COLS), Some(NUM_DISKS as i32))
}

/// Top-left corner of the LED bracket of `drive`.
pub(crate) fn led_origin(grid: &TextGrid, drive: i32) -> Point {
    Point::new(
        grid.cwidth + (2 * grid.cwidth - 10) / 2 + grid.xoff,
        drive * grid.cheight + (grid.cheight - grid.spc - 10) / 2 + grid.yoff,
    )
}

#[derive(Default)]
pub struct DrivesPage {
    grid: Option<TextGrid>,
    info: InfoLine,
}

impl DrivesPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw_static(canvas: &mut Canvas) -> TextGrid {
        let grid = layout(canvas);
        canvas.fill(DKBLUE);

        let label_dy = FONT_LARGE.character_size.height as i32 - FONT_SMALL.character_size.height as i32 - 2;
        for i in 0..NUM_DISKS as i32 {
            grid.char(canvas, 0, i, (b'A' + i as u8) as char, CYAN, DKBLUE);
            let led = led_origin(&grid, i);
            canvas.led_bracket(led.x, led.y);
            for (col, c) in [(TRACK_COL - 1, 'T'), (SECTOR_COL - 1, 'S'), (ADDR_COL - 4, 'A')] {
                let p = grid.cell_origin(col, i);
                canvas.draw_char(p.x, p.y + label_dy, c, FONT_SMALL, WHEAT, DKBLUE);
            }
            if i > 0 {
                grid.hline(canvas, 0, i, grid.cols, DKYELLOW);
            }
        }
        grid
    }

    fn draw_row(frame: &mut Frame<'_>, grid: &TextGrid, drive: usize) {
        let Some(rec) = frame.telemetry.drive(drive) else {
            return;
        };
        let idle_frames = DRIVE_IDLE_SECS * frame.refresh_hz;
        let clear = frame.count().wrapping_sub(rec.last_access) >= idle_frames;
        if clear {
            frame.telemetry.expire_drive(drive);
        } else if rec.sector == 0 {
            return;
        }

        let row = drive as i32;
        let led = led_origin(grid, row);
        let color = match (clear, rec.write) {
            (true, _) => DKBLUE,
            (false, true) => RED,
            (false, false) => GREEN,
        };
        frame.canvas.led(led.x, led.y, color);

        let fields = [
            (TRACK_COL + 1, rec.track as u16, 2),
            (SECTOR_COL + 1, rec.sector as u16, 2),
            (ADDR_COL, rec.addr, 4),
        ];
        for (last, value, digits) in fields {
            for i in 0..digits {
                let c = if clear {
                    ' '
                } else {
                    hex_char((value >> (4 * i)) as u32)
                };
                grid.char(frame.canvas, last - i, row, c, YELLOW, DKBLUE);
            }
        }
    }
}

impl Page for DrivesPage {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        if first {
            self.grid = Some(Self::draw_static(frame.canvas));
        } else if let Some(grid) = self.grid {
            for drive in 0..NUM_DISKS {
                Self::draw_row(frame, &grid, drive);
            }
        }
        self.info.draw(frame, first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LCD_REFRESH_HZ;
    use crate::machine::{AtomicMachine, CpuKind};
    use crate::status::test_util::{cell_shows, lcd_canvas, render};
    use crate::telemetry::{LedColor, Telemetry};

    fn shows(canvas: &Canvas, grid: &TextGrid, row: i32, col: i32, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| cell_shows(canvas, grid, col + i as i32, row, c, YELLOW, DKBLUE))
    }

    #[test]
    fn test_update_then_idle_timeout() {
        let m = AtomicMachine::new(CpuKind::Z80, 1);
        let t = Telemetry::new();
        let mut page = DrivesPage::new();
        let mut canvas = lcd_canvas();
        render(&mut page, &mut canvas, &m, &t, true);

        t.next_frame();
        t.update_drive(0, 5, 3, 0x1234, true, true);
        assert!(t.led().contains(LedColor::RED));
        render(&mut page, &mut canvas, &m, &t, false);

        let grid = layout(&canvas);
        assert!(shows(&canvas, &grid, 0, TRACK_COL, "05"));
        assert!(shows(&canvas, &grid, 0, SECTOR_COL, "03"));
        assert!(shows(&canvas, &grid, 0, ADDR_COL - 3, "1234"));
        let led = led_origin(&grid, 0);
        assert_eq!(canvas.pixel(led.x + 4, led.y + 4), Some(RED));

        // one frame short of the timeout the row stays
        for _ in 0..DRIVE_IDLE_SECS * LCD_REFRESH_HZ - 1 {
            t.next_frame();
        }
        render(&mut page, &mut canvas, &m, &t, false);
        assert!(shows(&canvas, &grid, 0, TRACK_COL, "05"));
        assert_eq!(t.drive(0).unwrap().sector, 3);

        t.next_frame();
        render(&mut page, &mut canvas, &m, &t, false);
        assert!(shows(&canvas, &grid, 0, TRACK_COL, "  "));
        assert!(shows(&canvas, &grid, 0, ADDR_COL - 3, "    "));
        assert!(canvas.is_color(led.x + 4, led.y + 4, DKBLUE));
        assert_eq!(t.drive(0).unwrap().sector, 0);
    }

    #[test]
    fn test_read_is_green_and_rows_independent() {
        let m = AtomicMachine::new(CpuKind::Z80, 1);
        let t = Telemetry::new();
        let mut page = DrivesPage::new();
        let mut canvas = lcd_canvas();
        render(&mut page, &mut canvas, &m, &t, true);
        for _ in 0..DRIVE_IDLE_SECS * LCD_REFRESH_HZ {
            t.next_frame();
        }
        t.update_drive(2, 0x4c, 0x1a, 0x0080, false, true);
        render(&mut page, &mut canvas, &m, &t, false);

        let grid = layout(&canvas);
        assert!(shows(&canvas, &grid, 2, TRACK_COL, "4C"));
        assert!(shows(&canvas, &grid, 2, SECTOR_COL, "1A"));
        let led = led_origin(&grid, 2);
        assert_eq!(canvas.pixel(led.x + 4, led.y + 4), Some(GREEN));
        // drive 0 was never touched and has timed out
        let led0 = led_origin(&grid, 0);
        assert!(canvas.is_color(led0.x + 4, led0.y + 4, DKBLUE));
    }

    #[test]
    fn test_static_labels() {
        let m = AtomicMachine::new(CpuKind::Z80, 1);
        let t = Telemetry::new();
        let mut page = DrivesPage::new();
        let mut canvas = lcd_canvas();
        render(&mut page, &mut canvas, &m, &t, true);
        let grid = layout(&canvas);
        for i in 0..NUM_DISKS as i32 {
            let c = (b'A' + i as u8) as char;
            assert!(cell_shows(&canvas, &grid, 0, i, c, CYAN, DKBLUE));
        }
    }
}
