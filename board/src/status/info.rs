//! Info line at the bottom of the status pages
//!
//! ```text
//! xx.xx °C   o    xxx.xx MHz
//! ```
//!
//! Temperature and CPU speed are refreshed once per second, counted in
//! frames. The RGB indicator swatch is refreshed every frame.

use embedded_graphics::pixelcolor::Rgb888;

use super::Frame;
use crate::draw::colors::{DKBLUE, ORANGE};
use crate::draw::FONT_INFO;
use crate::telemetry::LedColor;

/// Onboard temperature sensor.
pub trait TempSensor {
    fn read_celsius(&mut self) -> f32;
}

impl<F: FnMut() -> f32> TempSensor for F {
    fn read_celsius(&mut self) -> f32 {
        self()
    }
}

/// Convert a 12-bit reading of the RP2040/RP2350 temperature channel
/// (3.3 V reference) to degrees Celsius.
pub fn adc_to_celsius(raw: u16) -> f32 {
    let volts = raw as f32 * (3.3 / 4096.0);
    27.0 - (volts - 0.706) / 0.001721
}

pub(crate) fn led_rgb(led: LedColor) -> Rgb888 {
    let on = |c: LedColor| if led.contains(c) { 255 } else { 0 };
    Rgb888::new(on(LedColor::RED), on(LedColor::GREEN), on(LedColor::BLUE))
}

/// Column of the LED swatch.
const LED_COL: i32 = 11;

#[derive(Debug, Default)]
pub struct InfoLine {
    last_update: u32,
}

struct Layout {
    w: i32,
    n: i32,
    x: i32,
    y: i32,
}

impl InfoLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top edge of the info line on a canvas `height` pixels high.
    pub fn top(height: u16) -> i32 {
        height as i32 - FONT_INFO.character_size.height as i32
    }

    fn layout(frame: &Frame<'_>) -> Layout {
        let w = FONT_INFO.character_size.width as i32;
        let width = frame.canvas.width() as i32;
        let n = width / w;
        Layout {
            w,
            n,
            x: (width - n * w) / 2,
            y: Self::top(frame.canvas.height()),
        }
    }

    fn put(frame: &mut Frame<'_>, l: &Layout, col: i32, c: char) {
        frame.canvas.draw_char(col * l.w + l.x, l.y, c, FONT_INFO, ORANGE, DKBLUE);
    }

    pub fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        let l = Self::layout(frame);
        let led_y = l.y + (FONT_INFO.character_size.height as i32 - 10) / 2;

        if first {
            Self::put(frame, &l, 2, '.');
            Self::put(frame, &l, 6, '°');
            Self::put(frame, &l, 7, 'C');
            Self::put(frame, &l, l.n - 7, '.');
            Self::put(frame, &l, l.n - 3, 'M');
            Self::put(frame, &l, l.n - 2, 'H');
            Self::put(frame, &l, l.n - 1, 'z');
            frame.canvas.led_bracket(LED_COL * l.w + l.x, led_y);
            // next dynamic frame refreshes the values
            self.last_update = frame.count().wrapping_sub(frame.refresh_hz).wrapping_add(1);
            return;
        }

        let now = frame.count();
        if now.wrapping_sub(self.last_update) >= frame.refresh_hz {
            self.last_update = now;

            let temp = (frame.sensor.read_celsius() * 100.0 + 0.5) as i32;
            let mut temp = temp.clamp(0, 9999) as u32;
            for col in [4, 3, 1, 0] {
                Self::put(frame, &l, col, digit(temp % 10));
                temp /= 10;
            }

            let mut f = (frame.machine.cpu_freq_hz() / 10_000).min(99_999);
            let mut digits = [0u32; 5];
            for d in digits.iter_mut().rev() {
                *d = f % 10;
                f /= 10;
            }
            let cols = [l.n - 10, l.n - 9, l.n - 8, l.n - 6, l.n - 5];
            let mut leading = true;
            for (i, (&d, &col)) in digits.iter().zip(cols.iter()).enumerate() {
                let c = if leading && i < 2 && d == 0 {
                    ' '
                } else {
                    leading = false;
                    digit(d)
                };
                Self::put(frame, &l, col, c);
            }
        }

        let color = led_rgb(frame.telemetry.led());
        frame.canvas.led(LED_COL * l.w + l.x, led_y, color);
    }
}

fn digit(d: u32) -> char {
    char::from_digit(d, 10).unwrap_or('?')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LCD_REFRESH_HZ;
    use crate::draw::colors::RED;
    use crate::draw::Canvas;
    use crate::machine::{AtomicMachine, CpuKind};
    use crate::status::test_util::lcd_canvas;
    use crate::telemetry::Telemetry;

    struct Counting(u32);

    impl TempSensor for Counting {
        fn read_celsius(&mut self) -> f32 {
            self.0 += 1;
            25.0
        }
    }

    fn draw(info: &mut InfoLine, canvas: &mut Canvas, t: &Telemetry, sensor: &mut Counting, first: bool) {
        let machine = AtomicMachine::new(CpuKind::Z80, 1);
        let mut frame = Frame {
            canvas,
            machine: &machine,
            telemetry: t.view(),
            sensor,
            refresh_hz: LCD_REFRESH_HZ,
        };
        info.draw(&mut frame, first);
    }

    #[test]
    fn test_adc_conversion() {
        // 0.706 V is 27 degrees
        let raw = (0.706 / 3.3 * 4096.0) as u16;
        let t = adc_to_celsius(raw);
        assert!((t - 27.0).abs() < 1.0);
    }

    #[test]
    fn test_sensor_read_once_per_second() {
        let t = Telemetry::new();
        let mut canvas = lcd_canvas();
        let mut info = InfoLine::new();
        let mut sensor = Counting(0);
        draw(&mut info, &mut canvas, &t, &mut sensor, true);
        for _ in 0..LCD_REFRESH_HZ * 2 {
            t.next_frame();
            draw(&mut info, &mut canvas, &t, &mut sensor, false);
        }
        assert_eq!(sensor.0, 2);
    }

    #[test]
    fn test_led_swatch_follows_telemetry() {
        let t = Telemetry::new();
        let mut canvas = lcd_canvas();
        let mut info = InfoLine::new();
        let mut sensor = Counting(0);
        draw(&mut info, &mut canvas, &t, &mut sensor, true);
        t.set_led(LedColor::RED);
        t.next_frame();
        draw(&mut info, &mut canvas, &t, &mut sensor, false);
        let x = LED_COL * 8 + 5;
        let y = InfoLine::top(canvas.height()) + 6;
        assert_eq!(canvas.pixel(x, y), Some(RED));
    }

    #[test]
    fn test_led_rgb() {
        assert_eq!(led_rgb(LedColor::RED | LedColor::BLUE), Rgb888::new(255, 0, 255));
        assert_eq!(led_rgb(LedColor::empty()), Rgb888::new(0, 0, 0));
    }
}
