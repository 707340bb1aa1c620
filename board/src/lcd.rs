//! Producer-side control of the display
//!
//! `Lcd` lives on the emulation context. It never touches the canvas or
//! the device; it only stores selections into the telemetry channel,
//! which the display task picks up at the top of its next frame.

use core::fmt;

use crate::clock::FrameClock;
use crate::constants::SHUTDOWN_POLL_MS;
use crate::status::{DrawFn, StatusMode, StatusPage};
use crate::telemetry::Telemetry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownError {
    /// The display task did not confirm within the allowed time.
    Timeout,
}

impl fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownError::Timeout => write!(f, "display task did not finish in time"),
        }
    }
}

pub struct Lcd<'a> {
    telemetry: &'a Telemetry,
    selected: StatusPage,
    showing_status: bool,
}

impl<'a> Lcd<'a> {
    pub fn new(telemetry: &'a Telemetry) -> Self {
        Self {
            telemetry,
            selected: StatusPage::Registers,
            showing_status: false,
        }
    }

    pub fn telemetry(&self) -> &'a Telemetry {
        self.telemetry
    }

    /// Status page that `StatusMode::Current` refers to.
    pub fn selected(&self) -> StatusPage {
        self.selected
    }

    pub fn is_showing_status(&self) -> bool {
        self.showing_status
    }

    /// Show a non-status draw function. `None` stops the display task.
    pub fn show_custom(&mut self, draw_fn: Option<DrawFn>) {
        self.telemetry.set_draw_fn(draw_fn);
        self.showing_status = false;
    }

    /// Switch to a status page. Showing the page already on screen does
    /// not trigger a repaint.
    pub fn show_status(&mut self, which: StatusMode) {
        match which.page() {
            Some(page) => self.selected = page,
            None if which != StatusMode::Current => {
                log::debug!("status page {:?} not built in, keeping {}", which, self.selected.name());
            }
            None => {}
        }
        self.telemetry.set_draw_fn(Some(DrawFn::Status(self.selected)));
        self.showing_status = true;
    }

    /// Select the next status page. It is shown right away only if a
    /// status page is on screen.
    pub fn advance_status(&mut self) {
        self.selected = self.selected.next();
        if self.showing_status {
            self.telemetry.set_draw_fn(Some(DrawFn::Status(self.selected)));
        }
    }

    pub fn set_brightness(&self, percent: u8) {
        self.telemetry.set_backlight(percent);
    }

    pub fn set_rotation(&self, rotated: bool) {
        self.telemetry.set_rotated(rotated);
    }

    pub fn set_led_blue(&self, on: bool) {
        self.telemetry.set_led_blue(on);
    }

    /// Stop the display task and wait until it has released the device.
    pub fn exit<C: FrameClock + ?Sized>(&mut self, clock: &C) {
        self.show_custom(None);
        while !self.telemetry.is_finished() {
            clock.sleep_ms(SHUTDOWN_POLL_MS);
        }
        log::info!("display task finished");
    }

    /// Like `exit`, giving up after `timeout_ms`.
    pub fn exit_timeout<C: FrameClock + ?Sized>(&mut self, clock: &C, timeout_ms: u32) -> Result<(), ShutdownError> {
        self.show_custom(None);
        let deadline = clock.now_us() + timeout_ms as u64 * 1000;
        while !self.telemetry.is_finished() {
            if clock.now_us() >= deadline {
                log::warn!("display task still running after {} ms", timeout_ms);
                return Err(ShutdownError::Timeout);
            }
            clock.sleep_ms(SHUTDOWN_POLL_MS);
        }
        log::info!("display task finished");
        Ok(())
    }
}
