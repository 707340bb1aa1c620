//! Front panel page
//!
//! ```text
//! P7 .. P0                IE RU WA HO
//! MR IP M1 OP HA ST WO IA D7 .. D0
//! 15 14 13 12 11 10 A9 A8 A7 .. A0
//! ```
//!
//! Each LED is lit when `(value ^ invert) & mask` is nonzero. LEDs are
//! grouped in banks of eight.

use embedded_graphics::prelude::Point;

use super::{Frame, InfoLine, Page};
use crate::draw::colors::{DKBLUE, DKRED, RED, WHITE};
use crate::draw::{Canvas, FONT_SMALL};
use crate::machine::{CpuBus, PanelSource};

const XOFF: i32 = 6;
const YOFF: i32 = 6;
/// Label width: two glyphs less the trailing spacing.
const LABEL_W: i32 = 11;
/// LED offset from the label's top-left corner.
const LED_XO: i32 = 1;
const LED_YO: i32 = 14;
/// Distance between neighbouring LEDs and rows.
const LED_HO: i32 = 14;
const LED_VO: i32 = 36;
/// Extra gap between banks of eight.
const BANK_GAP: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLed {
    pub col: i32,
    pub row: i32,
    pub label: &'static str,
    pub source: PanelSource,
    pub mask: u16,
    pub invert: u16,
}

impl PanelLed {
    /// Top-left corner of the LED bracket.
    pub fn origin(&self) -> Point {
        Point::new(
            XOFF + LED_XO + BANK_GAP * (self.col / 8) + LED_HO * self.col,
            YOFF + LED_YO + LED_VO * self.row,
        )
    }

    pub fn lit(&self, value: u16) -> bool {
        (value ^ self.invert) & self.mask != 0
    }
}

const fn led(col: i32, row: i32, label: &'static str, source: PanelSource, mask: u16) -> PanelLed {
    PanelLed { col, row, label, source, mask, invert: 0 }
}

const fn port(col: i32, label: &'static str, mask: u16) -> PanelLed {
    PanelLed { col, row: 0, label, source: PanelSource::Output, mask, invert: 0xff }
}

const fn bus(col: i32, label: &'static str, bit: CpuBus) -> PanelLed {
    led(col, 1, label, PanelSource::Bus, bit.bits() as u16)
}

pub static PANEL_LEDS: [PanelLed; 44] = [
    port(0, "P7", 0x80),
    port(1, "P6", 0x40),
    port(2, "P5", 0x20),
    port(3, "P4", 0x10),
    port(4, "P3", 0x08),
    port(5, "P2", 0x04),
    port(6, "P1", 0x02),
    port(7, "P0", 0x01),
    led(12, 0, "IE", PanelSource::Iff, 0x01),
    led(13, 0, "RU", PanelSource::CpuRun, 0x01),
    led(14, 0, "WA", PanelSource::Wait, 0x01),
    led(15, 0, "HO", PanelSource::BusRequest, 0x01),
    bus(0, "MR", CpuBus::MEMR),
    bus(1, "IP", CpuBus::INP),
    bus(2, "M1", CpuBus::M1),
    bus(3, "OP", CpuBus::OUT),
    bus(4, "HA", CpuBus::HLTA),
    bus(5, "ST", CpuBus::STACK),
    bus(6, "WO", CpuBus::WO),
    bus(7, "IA", CpuBus::INTA),
    led(8, 1, "D7", PanelSource::Data, 0x80),
    led(9, 1, "D6", PanelSource::Data, 0x40),
    led(10, 1, "D5", PanelSource::Data, 0x20),
    led(11, 1, "D4", PanelSource::Data, 0x10),
    led(12, 1, "D3", PanelSource::Data, 0x08),
    led(13, 1, "D2", PanelSource::Data, 0x04),
    led(14, 1, "D1", PanelSource::Data, 0x02),
    led(15, 1, "D0", PanelSource::Data, 0x01),
    led(0, 2, "15", PanelSource::Address, 0x8000),
    led(1, 2, "14", PanelSource::Address, 0x4000),
    led(2, 2, "13", PanelSource::Address, 0x2000),
    led(3, 2, "12", PanelSource::Address, 0x1000),
    led(4, 2, "11", PanelSource::Address, 0x0800),
    led(5, 2, "10", PanelSource::Address, 0x0400),
    led(6, 2, "A9", PanelSource::Address, 0x0200),
    led(7, 2, "A8", PanelSource::Address, 0x0100),
    led(8, 2, "A7", PanelSource::Address, 0x0080),
    led(9, 2, "A6", PanelSource::Address, 0x0040),
    led(10, 2, "A5", PanelSource::Address, 0x0020),
    led(11, 2, "A4", PanelSource::Address, 0x0010),
    led(12, 2, "A3", PanelSource::Address, 0x0008),
    led(13, 2, "A2", PanelSource::Address, 0x0004),
    led(14, 2, "A1", PanelSource::Address, 0x0002),
    led(15, 2, "A0", PanelSource::Address, 0x0001),
];

#[derive(Default)]
pub struct PanelPage {
    info: InfoLine,
}

impl PanelPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw_static(canvas: &mut Canvas) {
        canvas.fill(DKBLUE);
        for led in PANEL_LEDS.iter() {
            let p = led.origin();
            let (lx, ly) = (p.x - LED_XO, p.y - LED_YO);
            canvas.draw_str(lx, ly, led.label, FONT_SMALL, WHITE, DKBLUE);
            // active-low write strobe
            if led.label == "WO" {
                canvas.hline(lx, ly - 2, LABEL_W, WHITE);
            }
            canvas.led_bracket(p.x, p.y);
        }
    }
}

impl Page for PanelPage {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        if first {
            Self::draw_static(frame.canvas);
        } else {
            for led in PANEL_LEDS.iter() {
                let value = frame.machine.panel(led.source);
                let color = if led.lit(value) { RED } else { DKRED };
                let p = led.origin();
                frame.canvas.led(p.x, p.y, color);
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

    fn lit_at(canvas: &Canvas, led: &PanelLed) -> bool {
        let p = led.origin();
        canvas.pixel(p.x + 4, p.y + 4) == Some(RED)
    }

    #[test]
    fn test_leds_inside_panel_area() {
        let info_top = InfoLine::top(135);
        for led in PANEL_LEDS.iter() {
            let p = led.origin();
            assert!(p.x - LED_XO >= 0 && p.x + 10 <= 240, "{}", led.label);
            assert!(p.y - LED_YO - 2 >= 0 && p.y + 10 <= info_top, "{}", led.label);
        }
    }

    #[test]
    fn test_output_port_inverted() {
        let m = AtomicMachine::new(CpuKind::I8080, 1);
        let t = Telemetry::new();
        m.set_panel(PanelSource::Output, 0xfe);
        m.set_panel(PanelSource::Address, 0x8001);
        m.set_panel(PanelSource::Bus, CpuBus::M1.bits() as u16);
        let mut page = PanelPage::new();
        let mut canvas = lcd_canvas();
        render(&mut page, &mut canvas, &m, &t, true);
        render(&mut page, &mut canvas, &m, &t, false);

        let find = |label: &str, row: i32| PANEL_LEDS.iter().find(|l| l.label == label && l.row == row).unwrap();
        assert!(lit_at(&canvas, find("P0", 0)));
        assert!(!lit_at(&canvas, find("P1", 0)));
        assert!(lit_at(&canvas, find("15", 2)));
        assert!(lit_at(&canvas, find("A0", 2)));
        assert!(!lit_at(&canvas, find("A1", 2)));
        assert!(lit_at(&canvas, find("M1", 1)));
        assert!(!lit_at(&canvas, find("MR", 1)));
        let off = find("IE", 0).origin();
        assert!(canvas.is_color(off.x + 4, off.y + 4, DKRED));
    }
}
