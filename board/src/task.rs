//! Display task
//!
//! Runs on its own core and owns the canvas and the LCD controller:
//!
//! ```text
//! Initializing -> Running -> Draining -> Stopped
//! ```
//!
//! Every frame it polls the telemetry channel, applies backlight and
//! rotation changes, draws the selected page and pushes the canvas. A
//! cleared draw function ends the loop; the device is shut down, the
//! finished flag is raised and the task parks for good.

use crate::clock::FrameClock;
use crate::constants::{BOARD_MODEL, LCD_HEIGHT, LCD_REFRESH_HZ, LCD_WIDTH, RELEASE};
use crate::device::DisplayDevice;
use crate::draw::{Canvas, ColorDepth};
use crate::machine::MachineView;
use crate::status::{Banner, DrawFn, Frame, Pages, TempSensor};
use crate::telemetry::Telemetry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub refresh_hz: u32,
    pub width: u16,
    pub height: u16,
    pub depth: ColorDepth,
    pub banner: Banner,
    pub wait_banner: Banner,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_hz: LCD_REFRESH_HZ,
            width: LCD_WIDTH,
            height: LCD_HEIGHT,
            depth: ColorDepth::Rgb444,
            banner: Banner::startup(BOARD_MODEL, RELEASE),
            wait_banner: Banner::wait_terminal(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Initializing,
    Running,
    Draining,
    Stopped,
}

pub struct DisplayTask<'a, D, C, S> {
    telemetry: &'a Telemetry,
    machine: &'a dyn MachineView,
    device: D,
    clock: C,
    sensor: S,
    canvas: Canvas,
    pages: Pages,
    refresh_hz: u32,
    period_us: u64,
    state: TaskState,
    current: Option<DrawFn>,
    backlight: u8,
    rotated: bool,
    overruns: u32,
}

impl<'a, D, C, S> DisplayTask<'a, D, C, S>
where
    D: DisplayDevice,
    C: FrameClock,
    S: TempSensor,
{
    pub fn new(
        config: DisplayConfig,
        telemetry: &'a Telemetry,
        machine: &'a dyn MachineView,
        device: D,
        clock: C,
        sensor: S,
    ) -> Self {
        let refresh_hz = config.refresh_hz.max(1);
        Self {
            telemetry,
            machine,
            device,
            clock,
            sensor,
            canvas: Canvas::new(config.width, config.height, config.depth),
            pages: Pages::new(config.banner, config.wait_banner),
            refresh_hz,
            period_us: 1_000_000 / refresh_hz as u64,
            state: TaskState::Initializing,
            current: None,
            backlight: telemetry.backlight(),
            rotated: false,
            overruns: 0,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Frames that took longer than one refresh period.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// One pass of the state machine. Returns the state afterwards.
    pub fn step(&mut self) -> TaskState {
        if self.state == TaskState::Initializing {
            self.backlight = self.telemetry.backlight();
            self.device.init(self.backlight);
            self.state = TaskState::Running;
            log::info!(
                "display running: {}x{} {} bpp at {} Hz",
                self.canvas.width(),
                self.canvas.height(),
                self.canvas.depth().bits(),
                self.refresh_hz
            );
        }

        if self.state == TaskState::Running {
            self.frame();
        }

        if self.state == TaskState::Draining {
            self.device.shutdown();
            self.telemetry.set_finished();
            self.state = TaskState::Stopped;
            log::info!("display stopped after {} frames", self.telemetry.frame_count());
        }

        self.state
    }

    fn frame(&mut self) {
        let start = self.clock.now_us();

        let Some(draw_fn) = self.telemetry.draw_fn() else {
            self.state = TaskState::Draining;
            return;
        };

        let backlight = self.telemetry.backlight();
        if backlight != self.backlight {
            log::debug!("backlight {}%", backlight);
            self.device.set_backlight(backlight);
            self.backlight = backlight;
        }

        let rotated = self.telemetry.rotated();
        if rotated != self.rotated {
            log::debug!("rotation {}", if rotated { "180" } else { "0" });
            self.device.set_rotation(rotated);
            self.rotated = rotated;
        }

        let first = self.current != Some(draw_fn);
        if first {
            log::debug!("draw function {:?}", draw_fn);
            self.current = Some(draw_fn);
        }

        let mut frame = Frame {
            canvas: &mut self.canvas,
            machine: self.machine,
            telemetry: self.telemetry.view(),
            sensor: &mut self.sensor,
            refresh_hz: self.refresh_hz,
        };
        self.pages.get_mut(draw_fn).draw(&mut frame, first);

        self.device.send_framebuffer(&self.canvas);
        self.telemetry.next_frame();

        let elapsed = self.clock.now_us().saturating_sub(start);
        if elapsed < self.period_us {
            self.clock.sleep_us(self.period_us - elapsed);
        } else {
            self.overruns += 1;
            log::trace!("frame overrun: {} us", elapsed);
        }
    }

    /// Run frames until the task has stopped.
    pub fn run_until_stopped(&mut self) {
        while self.step() != TaskState::Stopped {}
    }

    /// Entry point of the display core. Never returns.
    pub fn run(mut self) -> ! {
        self.run_until_stopped();
        loop {
            self.clock.idle();
        }
    }
}
