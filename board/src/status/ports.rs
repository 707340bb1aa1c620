//! I/O port page
//!
//! 256 ports as 8 rows of 32 cells. The upper half of a cell lights green
//! on input, the lower half red on output. Access flags are consumed by
//! each dynamic frame, so an access shows for one frame unless repeated.

use super::{Frame, InfoLine, Page};
use crate::draw::colors::{DKBLUE, DKYELLOW, GREEN, RED, WHITE};
use crate::draw::{Canvas, FONT_PORTS};
use crate::telemetry::PortAccess;

const XOFF: i32 = 0;
const YOFF: i32 = 0;
const LED_W: i32 = 6;
const LED_XS: i32 = 1;
const CELL_W: i32 = LED_W + LED_XS;
const LED_H: i32 = 7;
const LED_YS: i32 = 1;
const CELL_H: i32 = 2 * LED_H + LED_YS;
const ROWS: i32 = 8;
const COLS: i32 = 32;

fn cells_x() -> i32 {
    2 * FONT_PORTS.character_size.width as i32 + 1 + XOFF
}

/// Top-left corner of the cell for `port`.
pub(crate) fn cell_origin(port: u8) -> (i32, i32) {
    let (row, col) = (port as i32 / COLS, port as i32 % COLS);
    (cells_x() + col * CELL_W, YOFF + row * CELL_H)
}

#[derive(Default)]
pub struct PortsPage {
    info: InfoLine,
}

impl PortsPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw_static(canvas: &mut Canvas) {
        let fw = FONT_PORTS.character_size.width as i32;
        canvas.fill(DKBLUE);
        for (j, c) in "02468ACE".chars().enumerate() {
            let y = j as i32 * CELL_H + YOFF;
            canvas.draw_char(XOFF, y, c, FONT_PORTS, WHITE, DKBLUE);
            canvas.draw_char(XOFF + fw, y, '0', FONT_PORTS, WHITE, DKBLUE);
            if j > 0 {
                canvas.hline(cells_x(), y - LED_YS, COLS * CELL_W - LED_XS, DKYELLOW);
            }
        }
        for i in 1..COLS {
            canvas.vline(cells_x() + i * CELL_W - LED_XS, YOFF, ROWS * CELL_H - LED_YS, DKYELLOW);
        }
    }
}

impl Page for PortsPage {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        if first {
            Self::draw_static(frame.canvas);
        } else {
            for port in 0..=u8::MAX {
                let access = frame.telemetry.take_port(port);
                let (x, y) = cell_origin(port);
                let top = if access.contains(PortAccess::IN) { GREEN } else { DKBLUE };
                let bottom = if access.contains(PortAccess::OUT) { RED } else { DKBLUE };
                frame.canvas.fill_rect(x, y, LED_W, LED_H, top);
                frame.canvas.fill_rect(x, y + LED_H, LED_W, LED_H, bottom);
            }
        }
        self.info.draw(frame, first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{AtomicMachine, CpuKind};
    use crate::status::test_util::{lcd_canvas, render};
    use crate::telemetry::Telemetry;

    #[test]
    fn test_grid_fits_above_info() {
        let (x, y) = cell_origin(0xff);
        assert!(x + LED_W <= 240);
        assert!(y + CELL_H - LED_YS <= InfoLine::top(135));
    }

    #[test]
    fn test_access_shown_once() {
        let m = AtomicMachine::new(CpuKind::Z80, 1);
        let t = Telemetry::new();
        let mut page = PortsPage::new();
        let mut canvas = lcd_canvas();
        render(&mut page, &mut canvas, &m, &t, true);

        t.port_in(0x01);
        t.port_out(0xfe);
        render(&mut page, &mut canvas, &m, &t, false);
        let (x, y) = cell_origin(0x01);
        assert_eq!(canvas.pixel(x, y), Some(GREEN));
        assert!(canvas.is_color(x, y + LED_H, DKBLUE));
        let (x, y) = cell_origin(0xfe);
        assert_eq!(canvas.pixel(x + 5, y + 13), Some(RED));

        // nothing new: every cell idle
        render(&mut page, &mut canvas, &m, &t, false);
        for port in 0..=u8::MAX {
            let (x, y) = cell_origin(port);
            assert!(canvas.is_color(x, y, DKBLUE), "port {:02x}", port);
            assert!(canvas.is_color(x, y + LED_H, DKBLUE), "port {:02x}", port);
        }
        for port in 0..=u8::MAX {
            assert!(t.view().take_port(port).is_empty());
        }
    }
}
