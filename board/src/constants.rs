// Board
pub const BOARD_MODEL: &str = "RP2040-GEEK";
pub const RELEASE: &str = env!("CARGO_PKG_VERSION");

// LCD panel (ST7789V2, 1.14")
pub const LCD_WIDTH: u16 = 240;
pub const LCD_HEIGHT: u16 = 135;
pub const LCD_REFRESH_HZ: u32 = 30;
pub const DEFAULT_BACKLIGHT: u8 = 90;

// Disk drives
pub const NUM_DISKS: usize = 4;
pub const SECTOR_SIZE: usize = 128;
pub const TRACKS: u8 = 77;
pub const SECTORS_PER_TRACK: u8 = 26;
pub const DMA_ADDR_LIMIT: u16 = 0xff7f;
/// Seconds without access before a drive row is blanked.
pub const DRIVE_IDLE_SECS: u32 = 10;
/// Maximum length of a mounted image path (incl. terminator on disk).
pub const DISK_NAME_LEN: usize = 22;

// I/O ports
pub const NUM_PORTS: usize = 256;

// Memory
pub const ADDR_SPACE: usize = 65536;
pub const SEGMENT_SIZE: usize = 49152;
pub const COMMON_SIZE: usize = ADDR_SPACE - SEGMENT_SIZE;
pub const ROM_START: u16 = 0xff00;

// MicroSD layout
pub const CODE_DIR: &str = "/CODE80";
pub const CODE_EXT: &str = "*.BIN";
pub const DISK_DIR: &str = "/DISKS80";
pub const DISK_EXT: &str = "*.DSK";
pub const CONFIG_FILE: &str = "/CONF80/CFG.DAT";

// Shutdown handshake
pub const SHUTDOWN_POLL_MS: u32 = 20;
