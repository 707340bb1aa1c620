//! Banner pages and the empty page

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;

use super::{Frame, Page};
use crate::draw::colors::{BLACK, BLUE, GREEN, RED, WHITE};
use crate::draw::{BannerLine, FONT_BANNER};

/// Centered text lines inside a colored frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub lines: Vec<(String, Rgb888)>,
    pub border: Rgb888,
}

impl Banner {
    /// Boot banner naming the emulator and the board.
    pub fn startup(model: &str, release: &str) -> Self {
        Self {
            lines: alloc::vec![
                (format!("Z80pack {}", release), GREEN),
                (format!("{} {}", model, release), RED),
                (String::from("by Udo Munk &"), WHITE),
                (String::from("Thomas Eberhardt"), WHITE),
            ],
            border: BLUE,
        }
    }

    /// Shown while the USB console has no terminal attached.
    pub fn wait_terminal() -> Self {
        Self {
            lines: alloc::vec![
                (String::from("Waiting for"), RED),
                (String::from("terminal"), RED),
            ],
            border: WHITE,
        }
    }
}

pub struct BannerPage {
    banner: Banner,
}

impl BannerPage {
    pub fn new(banner: Banner) -> Self {
        Self { banner }
    }
}

impl Page for BannerPage {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        if !first {
            return;
        }
        let lines: Vec<BannerLine<'_>> = self
            .banner
            .lines
            .iter()
            .map(|(text, color)| BannerLine { text: text.as_str(), color: *color })
            .collect();
        frame.canvas.banner(&lines, self.banner.border, FONT_BANNER);
    }
}

/// Blank screen.
#[derive(Debug, Default)]
pub struct EmptyPage;

impl Page for EmptyPage {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        if first {
            frame.canvas.fill(BLACK);
        }
    }
}
