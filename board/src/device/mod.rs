//! LCD controller abstraction

pub mod display;
pub mod headless;

pub use display::DisplayDevice;
pub use headless::HeadlessDisplay;
