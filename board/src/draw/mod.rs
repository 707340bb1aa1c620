//! Drawing primitives: canvas, palette, fonts and the text grid

pub mod canvas;
pub mod colors;
pub mod grid;

pub use canvas::{BannerLine, Canvas, ColorDepth};
pub use grid::TextGrid;

use embedded_graphics::mono_font::{iso_8859_1, MonoFont};

// ISO 8859-1 sets carry the degree sign used by the info line.
pub const FONT_SMALL: &MonoFont<'static> = &iso_8859_1::FONT_6X12;
pub const FONT_PORTS: &MonoFont<'static> = &iso_8859_1::FONT_7X14;
pub const FONT_INFO: &MonoFont<'static> = &iso_8859_1::FONT_8X13;
pub const FONT_LARGE: &MonoFont<'static> = &iso_8859_1::FONT_10X20;
pub const FONT_BANNER: &MonoFont<'static> = &profont::PROFONT_18_POINT;
