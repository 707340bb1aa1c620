//! Display device abstraction
//!
//! The LCD controller (ST7789 on the GEEK boards) is only driven through
//! this trait:
//! - `init` / `shutdown` bracket a display session
//! - `set_backlight` / `set_rotation` apply control changes
//! - `send_framebuffer` pushes a complete canvas
//!
//! Transfers are fire-and-forget. A frame lost on the wire is replaced by
//! the next one, so the methods do not report errors.

use crate::draw::Canvas;

pub trait DisplayDevice {
    /// Bring up the controller with the given backlight (percent).
    fn init(&mut self, backlight: u8);

    /// Backlight level in percent, 0-100.
    fn set_backlight(&mut self, percent: u8);

    /// Rotate the panel by 180 degrees.
    fn set_rotation(&mut self, rotated: bool);

    /// Push the whole canvas to the panel.
    fn send_framebuffer(&mut self, canvas: &Canvas);

    /// Release the controller. No other call follows.
    fn shutdown(&mut self);
}

impl<D: DisplayDevice + ?Sized> DisplayDevice for &mut D {
    fn init(&mut self, backlight: u8) {
        (**self).init(backlight)
    }

    fn set_backlight(&mut self, percent: u8) {
        (**self).set_backlight(percent)
    }

    fn set_rotation(&mut self, rotated: bool) {
        (**self).set_rotation(rotated)
    }

    fn send_framebuffer(&mut self, canvas: &Canvas) {
        (**self).send_framebuffer(canvas)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}
