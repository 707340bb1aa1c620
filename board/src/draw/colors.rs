//! Display palette
//!
//! Colors are kept as `Rgb888` and reduced to the canvas depth on write.

use embedded_graphics::pixelcolor::Rgb888;

pub const BLACK: Rgb888 = Rgb888::new(0, 0, 0);
pub const WHITE: Rgb888 = Rgb888::new(255, 255, 255);
pub const RED: Rgb888 = Rgb888::new(255, 0, 0);
pub const GREEN: Rgb888 = Rgb888::new(0, 255, 0);
pub const BLUE: Rgb888 = Rgb888::new(0, 0, 255);
pub const CYAN: Rgb888 = Rgb888::new(0, 255, 255);
pub const YELLOW: Rgb888 = Rgb888::new(255, 255, 0);
pub const ORANGE: Rgb888 = Rgb888::new(255, 0xa5, 0);
pub const WHEAT: Rgb888 = Rgb888::new(0xf5, 0xde, 0xb3);
pub const GRAY: Rgb888 = Rgb888::new(0x80, 0x80, 0x80);

pub const DKRED: Rgb888 = Rgb888::new(0x88, 0, 0);
pub const DKGREEN: Rgb888 = Rgb888::new(0, 0x88, 0);
pub const DKBLUE: Rgb888 = Rgb888::new(0, 0, 0x88);
pub const DKYELLOW: Rgb888 = Rgb888::new(0x88, 0x88, 0);
