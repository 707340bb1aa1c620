//! Shared control and telemetry fields
//!
//! Written by the emulation context, read by the display task. Every
//! field is a single atomic of its natural width, so a reader sees either
//! the old or the new value and never a torn one. Nothing is ordered
//! across fields; a drive record read mid-update shows a stale mix for
//! one frame at most.
//!
//! The only exception is `finished`, which is stored with `Release` by the
//! display task and polled with `Acquire` during shutdown.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};

use bitflags::bitflags;

use crate::constants::{DEFAULT_BACKLIGHT, NUM_DISKS, NUM_PORTS};
use crate::status::DrawFn;

bitflags! {
    /// Components of the RGB indicator LED.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LedColor: u8 {
        const RED = 0x01;
        const GREEN = 0x02;
        const BLUE = 0x04;
    }
}

bitflags! {
    /// Port accesses seen since the port page last drew.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PortAccess: u8 {
        const IN = 0x01;
        const OUT = 0x02;
    }
}

/// Snapshot of one drive's last access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveRecord {
    pub track: u8,
    /// 0 while the drive is idle.
    pub sector: u8,
    pub addr: u16,
    pub write: bool,
    pub active: bool,
    /// Frame counter value at the last update.
    pub last_access: u32,
}

struct DriveSlot {
    track: AtomicU8,
    sector: AtomicU8,
    addr: AtomicU16,
    write: AtomicBool,
    active: AtomicBool,
    last_access: AtomicU32,
}

impl DriveSlot {
    const fn new() -> Self {
        Self {
            track: AtomicU8::new(0),
            sector: AtomicU8::new(0),
            addr: AtomicU16::new(0),
            write: AtomicBool::new(false),
            active: AtomicBool::new(false),
            last_access: AtomicU32::new(0),
        }
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const IDLE_DRIVE: DriveSlot = DriveSlot::new();
#[allow(clippy::declare_interior_mutable_const)]
const IDLE_PORT: AtomicU8 = AtomicU8::new(0);

const DRAW_NONE: u8 = 0;

pub struct Telemetry {
    draw_fn: AtomicU8,
    backlight: AtomicU8,
    rotated: AtomicBool,
    led: AtomicU8,
    drives: [DriveSlot; NUM_DISKS],
    ports: [AtomicU8; NUM_PORTS],
    frame: AtomicU32,
    finished: AtomicBool,
}

impl Telemetry {
    /// Channel in its power-on state: empty page, default backlight.
    pub const fn new() -> Self {
        Self {
            draw_fn: AtomicU8::new(DrawFn::Empty.to_raw()),
            backlight: AtomicU8::new(DEFAULT_BACKLIGHT),
            rotated: AtomicBool::new(false),
            led: AtomicU8::new(0),
            drives: [IDLE_DRIVE; NUM_DISKS],
            ports: [IDLE_PORT; NUM_PORTS],
            frame: AtomicU32::new(0),
            finished: AtomicBool::new(false),
        }
    }

    /// Selected draw function; `None` asks the display task to stop.
    pub fn draw_fn(&self) -> Option<DrawFn> {
        DrawFn::from_raw(self.draw_fn.load(Ordering::Relaxed))
    }

    pub(crate) fn set_draw_fn(&self, draw_fn: Option<DrawFn>) {
        let raw = draw_fn.map_or(DRAW_NONE, DrawFn::to_raw);
        self.draw_fn.store(raw, Ordering::Relaxed);
    }

    pub fn backlight(&self) -> u8 {
        self.backlight.load(Ordering::Relaxed)
    }

    /// Backlight in percent, clamped to 100.
    pub fn set_backlight(&self, percent: u8) {
        self.backlight.store(percent.min(100), Ordering::Relaxed);
    }

    pub fn rotated(&self) -> bool {
        self.rotated.load(Ordering::Relaxed)
    }

    pub fn set_rotated(&self, rotated: bool) {
        self.rotated.store(rotated, Ordering::Relaxed);
    }

    pub fn led(&self) -> LedColor {
        LedColor::from_bits_truncate(self.led.load(Ordering::Relaxed))
    }

    pub fn set_led(&self, color: LedColor) {
        self.led.store(color.bits(), Ordering::Relaxed);
    }

    /// Blue is the user-controlled component (emulated port 0).
    pub fn set_led_blue(&self, on: bool) {
        if on {
            self.led.fetch_or(LedColor::BLUE.bits(), Ordering::Relaxed);
        } else {
            self.led.fetch_and(!LedColor::BLUE.bits(), Ordering::Relaxed);
        }
    }

    /// Record a disk access and fold it into the indicator: red for a
    /// write, green for a read, both off when the drive goes inactive.
    /// A `sector` of 0 marks the drive idle.
    pub fn update_drive(&self, drive: usize, track: u8, sector: u8, addr: u16, write: bool, active: bool) {
        let Some(slot) = self.drives.get(drive) else {
            log::warn!("drive update for unknown drive {}", drive);
            return;
        };
        slot.track.store(track, Ordering::Relaxed);
        slot.sector.store(sector, Ordering::Relaxed);
        slot.addr.store(addr, Ordering::Relaxed);
        slot.write.store(write, Ordering::Relaxed);
        slot.active.store(active, Ordering::Relaxed);
        slot.last_access.store(self.frame_count(), Ordering::Relaxed);

        let activity = (LedColor::RED | LedColor::GREEN).bits();
        if active {
            let bit = if write { LedColor::RED } else { LedColor::GREEN };
            self.led.fetch_or(bit.bits(), Ordering::Relaxed);
        } else {
            self.led.fetch_and(!activity, Ordering::Relaxed);
        }
    }

    pub fn drive(&self, drive: usize) -> Option<DriveRecord> {
        let slot = self.drives.get(drive)?;
        Some(DriveRecord {
            track: slot.track.load(Ordering::Relaxed),
            sector: slot.sector.load(Ordering::Relaxed),
            addr: slot.addr.load(Ordering::Relaxed),
            write: slot.write.load(Ordering::Relaxed),
            active: slot.active.load(Ordering::Relaxed),
            last_access: slot.last_access.load(Ordering::Relaxed),
        })
    }

    pub fn port_in(&self, port: u8) {
        self.ports[port as usize].fetch_or(PortAccess::IN.bits(), Ordering::Relaxed);
    }

    pub fn port_out(&self, port: u8) {
        self.ports[port as usize].fetch_or(PortAccess::OUT.bits(), Ordering::Relaxed);
    }

    pub fn frame_count(&self) -> u32 {
        self.frame.load(Ordering::Relaxed)
    }

    pub(crate) fn next_frame(&self) {
        self.frame.fetch_add(1, Ordering::Relaxed);
    }

    /// True once the display task has released the device.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub(crate) fn set_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// Read handle for the status pages.
    pub fn view(&self) -> TelemetryView<'_> {
        TelemetryView { inner: self }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// What a status page may see of the channel.
///
/// Besides plain reads it allows the two consumer-side resets the pages
/// need: expiring an idle drive and consuming port access flags.
#[derive(Clone, Copy)]
pub struct TelemetryView<'a> {
    inner: &'a Telemetry,
}

impl<'a> TelemetryView<'a> {
    pub fn frame(&self) -> u32 {
        self.inner.frame_count()
    }

    pub fn led(&self) -> LedColor {
        self.inner.led()
    }

    pub fn drive(&self, drive: usize) -> Option<DriveRecord> {
        self.inner.drive(drive)
    }

    /// Mark a drive idle after its activity timed out.
    pub fn expire_drive(&self, drive: usize) {
        if let Some(slot) = self.inner.drives.get(drive) {
            slot.sector.store(0, Ordering::Relaxed);
        }
    }

    /// Take and clear the access flags of one port.
    pub fn take_port(&self, port: u8) -> PortAccess {
        PortAccess::from_bits_truncate(self.inner.ports[port as usize].swap(0, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let t = Telemetry::new();
        assert_eq!(t.draw_fn(), Some(DrawFn::Empty));
        assert_eq!(t.backlight(), DEFAULT_BACKLIGHT);
        assert!(!t.rotated());
        assert!(t.led().is_empty());
        assert!(!t.is_finished());
    }

    #[test]
    fn test_write_sets_red() {
        let t = Telemetry::new();
        t.update_drive(0, 5, 3, 0x1234, true, true);
        assert_eq!(t.led(), LedColor::RED);
        let d = t.drive(0).unwrap();
        assert_eq!((d.track, d.sector, d.addr, d.write), (5, 3, 0x1234, true));
    }

    #[test]
    fn test_idle_clears_activity_keeps_blue() {
        let t = Telemetry::new();
        t.set_led_blue(true);
        t.update_drive(1, 0, 1, 0, false, true);
        assert_eq!(t.led(), LedColor::GREEN | LedColor::BLUE);
        t.update_drive(1, 0, 0, 0, false, false);
        assert_eq!(t.led(), LedColor::BLUE);
        t.set_led_blue(false);
        assert!(t.led().is_empty());
    }

    #[test]
    fn test_unknown_drive_ignored() {
        let t = Telemetry::new();
        t.update_drive(NUM_DISKS, 1, 1, 0, true, true);
        assert!(t.led().is_empty());
        assert!(t.drive(NUM_DISKS).is_none());
    }

    #[test]
    fn test_last_access_is_frame() {
        let t = Telemetry::new();
        t.next_frame();
        t.next_frame();
        t.update_drive(2, 1, 1, 0, false, true);
        assert_eq!(t.drive(2).unwrap().last_access, 2);
    }

    #[test]
    fn test_port_flags_read_and_reset() {
        let t = Telemetry::new();
        t.port_in(0x10);
        t.port_out(0x10);
        t.port_out(0xff);
        let v = t.view();
        assert_eq!(v.take_port(0x10), PortAccess::IN | PortAccess::OUT);
        assert!(v.take_port(0x10).is_empty());
        assert_eq!(v.take_port(0xff), PortAccess::OUT);
    }

    #[test]
    fn test_backlight_clamped() {
        let t = Telemetry::new();
        t.set_backlight(250);
        assert_eq!(t.backlight(), 100);
    }

    #[test]
    fn test_stop_sentinel() {
        let t = Telemetry::new();
        t.set_draw_fn(None);
        assert_eq!(t.draw_fn(), None);
    }
}
