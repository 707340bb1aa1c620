//! Pixel buffer composed by the display task
//!
//! Two packed formats are supported, matching what the ST7789 accepts
//! over SPI:
//! - `Rgb444`: 12 bits per pixel, two pixels in three bytes
//! - `Rgb565`: 16 bits per pixel, big-endian
//!
//! Every primitive clips to the buffer; out-of-range coordinates are
//! dropped without error.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyleBuilder},
    pixelcolor::{Rgb888, RgbColor},
    prelude::*,
    text::{Baseline, Text},
};

use super::colors::{BLACK, GRAY};

/// Color depth of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Rgb444,
    Rgb565,
}

impl ColorDepth {
    pub const fn bits(self) -> u32 {
        match self {
            ColorDepth::Rgb444 => 12,
            ColorDepth::Rgb565 => 16,
        }
    }

    /// Bytes per row for a canvas `width` pixels wide.
    pub const fn stride(self, width: u16) -> usize {
        match self {
            ColorDepth::Rgb444 => (width as usize + 1) / 2 * 3,
            ColorDepth::Rgb565 => width as usize * 2,
        }
    }

    /// Reduce a color to its raw value at this depth.
    pub fn encode(self, color: Rgb888) -> u16 {
        let (r, g, b) = (color.r() as u16, color.g() as u16, color.b() as u16);
        match self {
            ColorDepth::Rgb444 => ((r >> 4) << 8) | ((g >> 4) << 4) | (b >> 4),
            ColorDepth::Rgb565 => ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3),
        }
    }

    /// Expand a raw value back to 24-bit color.
    pub fn decode(self, raw: u16) -> Rgb888 {
        match self {
            ColorDepth::Rgb444 => {
                let r = ((raw >> 8) & 0xf) as u8;
                let g = ((raw >> 4) & 0xf) as u8;
                let b = (raw & 0xf) as u8;
                Rgb888::new(r << 4 | r, g << 4 | g, b << 4 | b)
            }
            ColorDepth::Rgb565 => {
                let r = ((raw >> 11) & 0x1f) as u8;
                let g = ((raw >> 5) & 0x3f) as u8;
                let b = (raw & 0x1f) as u8;
                Rgb888::new(r << 3 | r >> 2, g << 2 | g >> 4, b << 3 | b >> 2)
            }
        }
    }
}

/// A line of text for `Canvas::banner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerLine<'a> {
    pub text: &'a str,
    pub color: Rgb888,
}

pub struct Canvas {
    bits: Vec<u8>,
    depth: ColorDepth,
    width: u16,
    height: u16,
    stride: usize,
}

impl Canvas {
    pub fn new(width: u16, height: u16, depth: ColorDepth) -> Self {
        let stride = depth.stride(width);
        Self {
            bits: vec![0; stride * height as usize],
            depth,
            width,
            height,
            stride,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Packed pixel data, `stride * height` bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bits
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Store a raw value at the canvas depth.
    pub fn set_raw(&mut self, x: i32, y: i32, raw: u16) {
        if !self.contains(x, y) {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        match self.depth {
            ColorDepth::Rgb444 => {
                let i = y * self.stride + (x / 2) * 3;
                if x & 1 == 0 {
                    self.bits[i] = (raw >> 4) as u8;
                    self.bits[i + 1] = ((raw & 0xf) << 4) as u8 | (self.bits[i + 1] & 0x0f);
                } else {
                    self.bits[i + 1] = (self.bits[i + 1] & 0xf0) | ((raw >> 8) & 0xf) as u8;
                    self.bits[i + 2] = (raw & 0xff) as u8;
                }
            }
            ColorDepth::Rgb565 => {
                let i = y * self.stride + x * 2;
                self.bits[i..i + 2].copy_from_slice(&raw.to_be_bytes());
            }
        }
    }

    /// Raw value at (x, y), `None` outside the canvas.
    pub fn raw_pixel(&self, x: i32, y: i32) -> Option<u16> {
        if !self.contains(x, y) {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        let raw = match self.depth {
            ColorDepth::Rgb444 => {
                let i = y * self.stride + (x / 2) * 3;
                if x & 1 == 0 {
                    (self.bits[i] as u16) << 4 | (self.bits[i + 1] >> 4) as u16
                } else {
                    ((self.bits[i + 1] & 0xf) as u16) << 8 | self.bits[i + 2] as u16
                }
            }
            ColorDepth::Rgb565 => {
                let i = y * self.stride + x * 2;
                u16::from_be_bytes([self.bits[i], self.bits[i + 1]])
            }
        };
        Some(raw)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb888) {
        let raw = self.depth.encode(color);
        self.set_raw(x, y, raw);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb888> {
        self.raw_pixel(x, y).map(|raw| self.depth.decode(raw))
    }

    /// True if (x, y) holds `color` as reduced to the canvas depth.
    pub fn is_color(&self, x: i32, y: i32, color: Rgb888) -> bool {
        self.raw_pixel(x, y) == Some(self.depth.encode(color))
    }

    /// Fill the whole canvas with one color.
    pub fn fill(&mut self, color: Rgb888) {
        if self.height == 0 {
            return;
        }
        let raw = self.depth.encode(color);
        for x in 0..self.width as i32 {
            self.set_raw(x, 0, raw);
        }
        let stride = self.stride;
        for row in 1..self.height as usize {
            self.bits.copy_within(0..stride, row * stride);
        }
    }

    pub fn hline(&mut self, x: i32, y: i32, w: i32, color: Rgb888) {
        let raw = self.depth.encode(color);
        for i in 0..w {
            self.set_raw(x + i, y, raw);
        }
    }

    pub fn vline(&mut self, x: i32, y: i32, h: i32, color: Rgb888) {
        let raw = self.depth.encode(color);
        for i in 0..h {
            self.set_raw(x, y + i, raw);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb888) {
        for i in 0..h {
            self.hline(x, y + i, w, color);
        }
    }

    /// Draw one character cell with its top-left corner at (x, y).
    pub fn draw_char(&mut self, x: i32, y: i32, c: char, font: &MonoFont<'_>, fg: Rgb888, bg: Rgb888) {
        let mut buf = [0u8; 4];
        self.draw_str(x, y, c.encode_utf8(&mut buf), font, fg, bg);
    }

    /// Draw a string with an opaque background, top-left at (x, y).
    pub fn draw_str(&mut self, x: i32, y: i32, s: &str, font: &MonoFont<'_>, fg: Rgb888, bg: Rgb888) {
        let style = MonoTextStyleBuilder::new()
            .font(font)
            .text_color(fg)
            .background_color(bg)
            .build();
        let _ = Text::with_baseline(s, Point::new(x, y), style, Baseline::Top).draw(self);
    }

    /// 10x10 ring with cut corners framing an LED.
    pub fn led_bracket(&mut self, x: i32, y: i32) {
        self.hline(x + 2, y, 6, GRAY);
        self.set_pixel(x + 1, y + 1, GRAY);
        self.set_pixel(x + 8, y + 1, GRAY);
        self.vline(x, y + 2, 6, GRAY);
        self.vline(x + 9, y + 2, 6, GRAY);
        self.set_pixel(x + 1, y + 8, GRAY);
        self.set_pixel(x + 8, y + 8, GRAY);
        self.hline(x + 2, y + 9, 6, GRAY);
    }

    /// Fill the inside of an LED bracket at (x, y).
    pub fn led(&mut self, x: i32, y: i32, color: Rgb888) {
        self.hline(x + 2, y + 1, 6, color);
        for i in 2..8 {
            self.hline(x + 1, y + i, 8, color);
        }
        self.hline(x + 2, y + 8, 6, color);
    }

    /// Clear to black, draw a border and center `lines` on the canvas.
    pub fn banner(&mut self, lines: &[BannerLine<'_>], border: Rgb888, font: &MonoFont<'_>) {
        let (w, h) = (self.width as i32, self.height as i32);
        self.fill(BLACK);
        self.hline(0, 0, w, border);
        self.hline(0, h - 1, w, border);
        self.vline(0, 0, h, border);
        self.vline(w - 1, 0, h, border);

        let fw = font.character_size.width as i32 + font.character_spacing as i32;
        let fh = font.character_size.height as i32;
        let y0 = (h - lines.len() as i32 * (fh + 2)) / 2;
        for (i, line) in lines.iter().enumerate() {
            let len = line.text.chars().count() as i32;
            let x = (w - len * fw) / 2;
            let y = y0 + i as i32 * (fh + 2);
            self.draw_str(x, y, line.text, font, line.color, BLACK);
        }
    }

    /// Expand the canvas to packed 24-bit RGB, row-major.
    pub fn to_rgb888(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let c = self.pixel(x, y).unwrap_or(BLACK);
                out.extend_from_slice(&[c.r(), c.g(), c.b()]);
            }
        }
        out
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            self.set_pixel(p.x, p.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::colors::{BLUE, GREEN, RED, WHITE};
    use embedded_graphics::mono_font::iso_8859_1::FONT_6X12;

    #[test]
    fn test_stride() {
        assert_eq!(ColorDepth::Rgb444.stride(240), 360);
        assert_eq!(ColorDepth::Rgb444.stride(5), 9);
        assert_eq!(ColorDepth::Rgb565.stride(240), 480);
    }

    #[test]
    fn test_rgb444_packing() {
        let mut canvas = Canvas::new(4, 1, ColorDepth::Rgb444);
        canvas.set_raw(0, 0, 0xabc);
        canvas.set_raw(1, 0, 0xdef);
        assert_eq!(&canvas.bytes()[0..3], &[0xab, 0xcd, 0xef]);
        // neighbours must survive a rewrite
        canvas.set_raw(0, 0, 0x123);
        assert_eq!(&canvas.bytes()[0..3], &[0x12, 0x3d, 0xef]);
        assert_eq!(canvas.raw_pixel(0, 0), Some(0x123));
        assert_eq!(canvas.raw_pixel(1, 0), Some(0xdef));
    }

    #[test]
    fn test_rgb565_big_endian() {
        let mut canvas = Canvas::new(2, 2, ColorDepth::Rgb565);
        canvas.set_pixel(1, 1, RED);
        let i = canvas.stride() + 2;
        assert_eq!(&canvas.bytes()[i..i + 2], &[0xf8, 0x00]);
        assert_eq!(canvas.pixel(1, 1), Some(RED));
    }

    #[test]
    fn test_clipping() {
        let mut canvas = Canvas::new(8, 8, ColorDepth::Rgb565);
        canvas.set_pixel(-1, 0, WHITE);
        canvas.set_pixel(8, 0, WHITE);
        canvas.set_pixel(0, 8, WHITE);
        canvas.hline(-4, 3, 100, GREEN);
        canvas.vline(2, -4, 100, BLUE);
        assert!(canvas.bytes().len() == 8 * 16);
        assert_eq!(canvas.pixel(0, 3), Some(GREEN));
        assert_eq!(canvas.pixel(7, 3), Some(GREEN));
        assert_eq!(canvas.pixel(2, 0), Some(BLUE));
        assert_eq!(canvas.pixel(2, 7), Some(BLUE));
        assert_eq!(canvas.pixel(8, 8), None);
    }

    #[test]
    fn test_fill_odd_width() {
        let mut canvas = Canvas::new(5, 3, ColorDepth::Rgb444);
        canvas.fill(WHITE);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(canvas.raw_pixel(x, y), Some(0xfff));
            }
        }
    }

    #[test]
    fn test_decode_extremes() {
        for depth in [ColorDepth::Rgb444, ColorDepth::Rgb565] {
            assert_eq!(depth.decode(depth.encode(WHITE)), WHITE);
            assert_eq!(depth.decode(depth.encode(BLACK)), BLACK);
        }
    }

    #[test]
    fn test_led_shape() {
        let mut canvas = Canvas::new(12, 12, ColorDepth::Rgb565);
        canvas.led_bracket(0, 0);
        canvas.led(0, 0, RED);
        assert_eq!(canvas.pixel(0, 0), Some(BLACK));
        assert!(canvas.is_color(2, 0, GRAY));
        assert!(canvas.is_color(0, 5, GRAY));
        assert!(canvas.is_color(1, 1, GRAY));
        assert_eq!(canvas.pixel(2, 1), Some(RED));
        assert_eq!(canvas.pixel(1, 4), Some(RED));
        assert_eq!(canvas.pixel(8, 7), Some(RED));
        assert!(canvas.is_color(9, 5, GRAY));
    }

    #[test]
    fn test_text_background() {
        let mut canvas = Canvas::new(20, 20, ColorDepth::Rgb565);
        canvas.fill(WHITE);
        canvas.draw_char(0, 0, ' ', &FONT_6X12, RED, BLUE);
        assert_eq!(canvas.pixel(0, 0), Some(BLUE));
        assert_eq!(canvas.pixel(5, 11), Some(BLUE));
        assert_eq!(canvas.pixel(6, 0), Some(WHITE));
    }

    #[test]
    fn test_banner_frame() {
        let mut canvas = Canvas::new(60, 40, ColorDepth::Rgb565);
        let lines = [BannerLine { text: "HI", color: RED }];
        canvas.banner(&lines, BLUE, &FONT_6X12);
        assert_eq!(canvas.pixel(0, 0), Some(BLUE));
        assert_eq!(canvas.pixel(59, 39), Some(BLUE));
        assert_eq!(canvas.pixel(30, 2), Some(BLACK));
        // text is centered: cells span x 24..36
        let red = (24..36).any(|x| (0..40).any(|y| canvas.pixel(x, y) == Some(RED)));
        assert!(red);
        let stray = (1..24).any(|x| (1..39).any(|y| canvas.pixel(x, y) == Some(RED)));
        assert!(!stray);
    }

    #[test]
    fn test_to_rgb888() {
        let mut canvas = Canvas::new(2, 1, ColorDepth::Rgb444);
        canvas.set_pixel(1, 0, WHITE);
        assert_eq!(canvas.to_rgb888(), vec![0, 0, 0, 255, 255, 255]);
    }
}
