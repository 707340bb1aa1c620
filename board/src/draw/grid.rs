//! Character-cell grid over a canvas
//!
//! Status pages lay out text in fixed cells of one font plus a vertical
//! spacing `spc` between rows. Grid lines are centered in the gaps.

use embedded_graphics::{mono_font::MonoFont, pixelcolor::Rgb888, prelude::Point};

use super::canvas::Canvas;

#[derive(Clone, Copy)]
pub struct TextGrid {
    pub font: &'static MonoFont<'static>,
    pub xoff: i32,
    pub yoff: i32,
    pub spc: i32,
    pub cwidth: i32,
    pub cheight: i32,
    pub cols: i32,
    pub rows: i32,
}

impl TextGrid {
    /// Lay out a grid on `canvas`. A `cols` or `rows` of `None` uses as
    /// many cells as fit.
    pub fn new(
        canvas: &Canvas,
        font: &'static MonoFont<'static>,
        xoff: i32,
        yoff: i32,
        spc: i32,
        cols: Option<i32>,
        rows: Option<i32>,
    ) -> Self {
        let cwidth = font.character_size.width as i32 + font.character_spacing as i32;
        let cheight = font.character_size.height as i32 + spc;
        let cols = cols.unwrap_or((canvas.width() as i32 - xoff) / cwidth);
        let rows = rows.unwrap_or((canvas.height() as i32 - yoff + spc) / cheight);
        Self {
            font,
            xoff,
            yoff,
            spc,
            cwidth,
            cheight,
            cols,
            rows,
        }
    }

    /// Pixel position of the top-left corner of a cell.
    pub fn cell_origin(&self, col: i32, row: i32) -> Point {
        Point::new(col * self.cwidth + self.xoff, row * self.cheight + self.yoff)
    }

    pub fn char(&self, canvas: &mut Canvas, col: i32, row: i32, c: char, fg: Rgb888, bg: Rgb888) {
        let p = self.cell_origin(col, row);
        canvas.draw_char(p.x, p.y, c, self.font, fg, bg);
    }

    pub fn str(&self, canvas: &mut Canvas, col: i32, row: i32, s: &str, fg: Rgb888, bg: Rgb888) {
        let p = self.cell_origin(col, row);
        canvas.draw_str(p.x, p.y, s, self.font, fg, bg);
    }

    /// Horizontal line `len` cells wide above `row`.
    pub fn hline(&self, canvas: &mut Canvas, col: i32, row: i32, len: i32, color: Rgb888) {
        let x = col * self.cwidth + self.xoff;
        let y = if row > 0 {
            row * self.cheight - (self.spc + 1) / 2
        } else {
            0
        } + self.yoff;
        canvas.hline(x, y, len * self.cwidth, color);
    }

    /// Vertical line through the middle of `col`, spanning `len` rows and
    /// reaching into the gaps above and below.
    pub fn vline(&self, canvas: &mut Canvas, col: i32, row: i32, len: i32, color: Rgb888) {
        let x = col * self.cwidth + (self.cwidth + 1) / 2 + self.xoff;
        let mut hadj = 0;
        if row + len < self.rows {
            hadj += self.spc / 2 + 1;
        }
        let y = if row > 0 {
            hadj += (self.spc + 1) / 2;
            row * self.cheight - (self.spc + 1) / 2
        } else {
            0
        } + self.yoff;
        canvas.vline(x, y, len * self.cheight - self.spc + hadj, color);
    }
}
