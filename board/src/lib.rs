//! Board support for the RP2040/RP2350-GEEK Z80/8080 emulator
//!
//! Drives the on-board 240x135 LCD from the second core while the first
//! core runs the CPU emulation:
//! - `telemetry` - lock-free single-writer/single-reader fields shared by both cores
//! - `lcd` - producer-side handle selecting what the display shows
//! - `task` - the display loop owning the canvas and the LCD controller
//! - `status` - the status pages (registers, panel, drives, ports, memory)
//! - `storage` - disk images, boot code and settings on the MicroSD card
//!
//! The crate is `no_std` + `alloc`. The `std` feature adds host-side
//! implementations of the clock, storage and log sink.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod clock;
pub mod constants;
pub mod device;
pub mod draw;
pub mod lcd;
pub mod logger;
pub mod machine;
pub mod registers;
pub mod settings;
pub mod status;
pub mod storage;
pub mod task;
pub mod telemetry;

pub use clock::FrameClock;
pub use device::{DisplayDevice, HeadlessDisplay};
pub use draw::{Canvas, ColorDepth};
pub use lcd::{Lcd, ShutdownError};
pub use machine::{AtomicMachine, CpuKind, MachineView};
pub use status::{DrawFn, StatusMode, StatusPage};
pub use task::{DisplayConfig, DisplayTask, TaskState};
pub use telemetry::{LedColor, Telemetry};
