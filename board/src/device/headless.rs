//! Display device without a panel
//!
//! Keeps the last pushed frame and counts calls. Used on the host for
//! previews and by the pipeline tests.

use alloc::vec::Vec;

use super::display::DisplayDevice;
use crate::draw::{Canvas, ColorDepth};

#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    pub initialized: bool,
    pub shut_down: bool,
    pub backlight: u8,
    pub rotated: bool,
    pub frames: u32,
    pub backlight_changes: u32,
    pub rotation_changes: u32,
    /// Calls made after `shutdown`; stays zero for a well-behaved task.
    pub calls_after_shutdown: u32,
    last_frame: Vec<u8>,
    last_size: (u16, u16),
    last_depth: Option<ColorDepth>,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packed bytes of the last frame, empty before the first push.
    pub fn last_frame(&self) -> &[u8] {
        &self.last_frame
    }

    pub fn last_size(&self) -> (u16, u16) {
        self.last_size
    }

    pub fn last_depth(&self) -> Option<ColorDepth> {
        self.last_depth
    }

    fn check_live(&mut self) {
        if self.shut_down {
            self.calls_after_shutdown += 1;
            log::warn!("headless display used after shutdown");
        }
    }
}

impl DisplayDevice for HeadlessDisplay {
    fn init(&mut self, backlight: u8) {
        self.check_live();
        self.initialized = true;
        self.backlight = backlight;
    }

    fn set_backlight(&mut self, percent: u8) {
        self.check_live();
        self.backlight = percent.min(100);
        self.backlight_changes += 1;
    }

    fn set_rotation(&mut self, rotated: bool) {
        self.check_live();
        self.rotated = rotated;
        self.rotation_changes += 1;
    }

    fn send_framebuffer(&mut self, canvas: &Canvas) {
        self.check_live();
        self.last_frame.clear();
        self.last_frame.extend_from_slice(canvas.bytes());
        self.last_size = (canvas.width(), canvas.height());
        self.last_depth = Some(canvas.depth());
        self.frames += 1;
    }

    fn shutdown(&mut self) {
        self.check_live();
        self.shut_down = true;
    }
}
