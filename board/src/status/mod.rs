//! Status pages and draw functions
//!
//! A draw function renders one full frame. It is called with `first` set
//! on the first frame after it was selected and must then repaint all
//! static chrome; later frames only refresh values.
//!
//! Draw functions are plain tags so they fit in one atomic of the
//! telemetry channel. `Pages` owns the per-page layout state and
//! dispatches a tag to its renderer.

pub mod banner;
pub mod cpu_reg;
pub mod drives;
pub mod info;
pub mod memory;
#[cfg(feature = "front-panel")]
pub mod panel;
#[cfg(feature = "io-panel")]
pub mod ports;

use crate::draw::Canvas;
use crate::machine::MachineView;
use crate::telemetry::TelemetryView;

pub use banner::{Banner, BannerPage, EmptyPage};
pub use cpu_reg::CpuRegPage;
pub use drives::DrivesPage;
pub use info::{adc_to_celsius, InfoLine, TempSensor};
pub use memory::{heat_color, MemoryPage};
#[cfg(feature = "front-panel")]
pub use panel::PanelPage;
#[cfg(feature = "io-panel")]
pub use ports::PortsPage;

const PAGE_SLOTS: u8 = 5;

/// Status pages in cycling order. Pages compiled out are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusPage {
    Registers = 0,
    #[cfg(feature = "front-panel")]
    Panel = 1,
    Drives = 2,
    #[cfg(feature = "io-panel")]
    Ports = 3,
    Memory = 4,
}

impl StatusPage {
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(StatusPage::Registers),
            #[cfg(feature = "front-panel")]
            1 => Some(StatusPage::Panel),
            2 => Some(StatusPage::Drives),
            #[cfg(feature = "io-panel")]
            3 => Some(StatusPage::Ports),
            4 => Some(StatusPage::Memory),
            _ => None,
        }
    }

    /// The page after this one, wrapping around.
    pub fn next(self) -> Self {
        let mut raw = self as u8;
        loop {
            raw = (raw + 1) % PAGE_SLOTS;
            if let Some(page) = Self::from_raw(raw) {
                return page;
            }
        }
    }

    /// All compiled-in pages in cycling order.
    pub fn all() -> impl Iterator<Item = StatusPage> {
        (0..PAGE_SLOTS).filter_map(Self::from_raw)
    }

    pub fn name(self) -> &'static str {
        match self {
            StatusPage::Registers => "registers",
            #[cfg(feature = "front-panel")]
            StatusPage::Panel => "panel",
            StatusPage::Drives => "drives",
            #[cfg(feature = "io-panel")]
            StatusPage::Ports => "ports",
            StatusPage::Memory => "memory",
        }
    }
}

/// Page requested by `Lcd::show_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusMode {
    /// Keep whatever page was selected last.
    Current = 0,
    Registers = 1,
    Panel = 2,
    Drives = 3,
    Ports = 4,
    Memory = 5,
}

impl StatusMode {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(StatusMode::Current),
            1 => Some(StatusMode::Registers),
            2 => Some(StatusMode::Panel),
            3 => Some(StatusMode::Drives),
            4 => Some(StatusMode::Ports),
            5 => Some(StatusMode::Memory),
            _ => None,
        }
    }

    /// The concrete page, `None` for `Current` or a page not built in.
    pub fn page(self) -> Option<StatusPage> {
        match self {
            StatusMode::Current => None,
            StatusMode::Registers => Some(StatusPage::Registers),
            #[cfg(feature = "front-panel")]
            StatusMode::Panel => Some(StatusPage::Panel),
            StatusMode::Drives => Some(StatusPage::Drives),
            #[cfg(feature = "io-panel")]
            StatusMode::Ports => Some(StatusPage::Ports),
            StatusMode::Memory => Some(StatusPage::Memory),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

/// Everything the display task can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawFn {
    Empty,
    Banner,
    WaitTerminal,
    Status(StatusPage),
}

const RAW_STATUS: u8 = 0x10;

impl DrawFn {
    /// Nonzero tag; 0 is reserved for "no draw function".
    pub const fn to_raw(self) -> u8 {
        match self {
            DrawFn::Empty => 1,
            DrawFn::Banner => 2,
            DrawFn::WaitTerminal => 3,
            DrawFn::Status(page) => RAW_STATUS + page as u8,
        }
    }

    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(DrawFn::Empty),
            2 => Some(DrawFn::Banner),
            3 => Some(DrawFn::WaitTerminal),
            r if r >= RAW_STATUS => match StatusPage::from_raw(r - RAW_STATUS) {
                Some(page) => Some(DrawFn::Status(page)),
                None => None,
            },
            _ => None,
        }
    }
}

/// Upper-case hex digit of the low nibble.
pub(crate) fn hex_char(nibble: u32) -> char {
    b"0123456789ABCDEF"[(nibble & 0xf) as usize] as char
}

/// Inputs of one frame.
pub struct Frame<'f> {
    pub canvas: &'f mut Canvas,
    pub machine: &'f dyn MachineView,
    pub telemetry: TelemetryView<'f>,
    pub sensor: &'f mut dyn TempSensor,
    pub refresh_hz: u32,
}

impl Frame<'_> {
    /// Frame counter of the frame being drawn.
    pub fn count(&self) -> u32 {
        self.telemetry.frame()
    }
}

pub trait Page {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool);
}

/// Renderer state for every draw function.
pub struct Pages {
    empty: EmptyPage,
    banner: BannerPage,
    wait: BannerPage,
    registers: CpuRegPage,
    #[cfg(feature = "front-panel")]
    panel: PanelPage,
    drives: DrivesPage,
    #[cfg(feature = "io-panel")]
    ports: PortsPage,
    memory: MemoryPage,
}

impl Pages {
    pub fn new(banner: Banner, wait: Banner) -> Self {
        Self {
            empty: EmptyPage,
            banner: BannerPage::new(banner),
            wait: BannerPage::new(wait),
            registers: CpuRegPage::new(),
            #[cfg(feature = "front-panel")]
            panel: PanelPage::new(),
            drives: DrivesPage::new(),
            #[cfg(feature = "io-panel")]
            ports: PortsPage::new(),
            memory: MemoryPage::new(),
        }
    }

    pub fn get_mut(&mut self, draw_fn: DrawFn) -> &mut dyn Page {
        match draw_fn {
            DrawFn::Empty => &mut self.empty,
            DrawFn::Banner => &mut self.banner,
            DrawFn::WaitTerminal => &mut self.wait,
            DrawFn::Status(StatusPage::Registers) => &mut self.registers,
            #[cfg(feature = "front-panel")]
            DrawFn::Status(StatusPage::Panel) => &mut self.panel,
            DrawFn::Status(StatusPage::Drives) => &mut self.drives,
            #[cfg(feature = "io-panel")]
            DrawFn::Status(StatusPage::Ports) => &mut self.ports,
            DrawFn::Status(StatusPage::Memory) => &mut self.memory,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::constants::{LCD_HEIGHT, LCD_REFRESH_HZ, LCD_WIDTH};
    use crate::draw::{ColorDepth, TextGrid};
    use crate::machine::AtomicMachine;
    use embedded_graphics::pixelcolor::Rgb888;
    use crate::telemetry::Telemetry;

    /// Draw one frame of `page` against fresh inputs.
    pub fn render(
        page: &mut dyn Page,
        canvas: &mut Canvas,
        machine: &AtomicMachine,
        telemetry: &Telemetry,
        first: bool,
    ) {
        let mut sensor = || 21.5f32;
        let mut frame = Frame {
            canvas,
            machine,
            telemetry: telemetry.view(),
            sensor: &mut sensor,
            refresh_hz: LCD_REFRESH_HZ,
        };
        page.draw(&mut frame, first);
    }

    pub fn lcd_canvas() -> Canvas {
        Canvas::new(LCD_WIDTH, LCD_HEIGHT, ColorDepth::Rgb565)
    }

    /// True if the grid cell shows `c` exactly as drawn on a blank canvas.
    pub fn cell_shows(canvas: &Canvas, grid: &TextGrid, col: i32, row: i32, c: char, fg: Rgb888, bg: Rgb888) -> bool {
        let mut reference = Canvas::new(canvas.width(), canvas.height(), canvas.depth());
        grid.char(&mut reference, col, row, c, fg, bg);
        let p = grid.cell_origin(col, row);
        let h = grid.font.character_size.height as i32;
        (p.y..p.y + h).all(|y| (p.x..p.x + grid.cwidth).all(|x| canvas.pixel(x, y) == reference.pixel(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_closes() {
        let n = StatusPage::all().count();
        for start in StatusPage::all() {
            let mut page = start;
            for _ in 0..n {
                page = page.next();
            }
            assert_eq!(page, start);
        }
    }

    #[test]
    fn test_cycle_visits_every_page() {
        let mut page = StatusPage::Registers;
        let mut seen = alloc::vec::Vec::new();
        for _ in 0..StatusPage::all().count() {
            seen.push(page);
            page = page.next();
        }
        assert_eq!(seen, StatusPage::all().collect::<alloc::vec::Vec<_>>());
    }

    #[test]
    fn test_draw_fn_tags() {
        assert_eq!(DrawFn::from_raw(0), None);
        for page in StatusPage::all() {
            let f = DrawFn::Status(page);
            assert_eq!(DrawFn::from_raw(f.to_raw()), Some(f));
        }
        for f in [DrawFn::Empty, DrawFn::Banner, DrawFn::WaitTerminal] {
            assert_eq!(DrawFn::from_raw(f.to_raw()), Some(f));
        }
    }

    #[test]
    fn test_mode_maps_to_page() {
        assert_eq!(StatusMode::Current.page(), None);
        assert_eq!(StatusMode::Memory.page(), Some(StatusPage::Memory));
        assert_eq!(StatusMode::from_raw(9), None);
    }
}
