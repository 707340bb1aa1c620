//! Persisted machine settings
//!
//! Stored little-endian in `/CONF80/CFG.DAT`:
//!
//! ```text
//! 0   magic "GK80"
//! 4   CPU (1 = Z80, 2 = 8080)
//! 5   CPU speed in MHz, u32 (0 = unlimited)
//! 9   port 255 value
//! 10  LCD brightness (percent)
//! 11  LCD rotated (0/1)
//! 12  initial status page (StatusMode numbering)
//! 13  4 x 22 bytes mounted image paths, NUL padded
//! ```

use alloc::string::String;
use core::fmt;

use crate::constants::{CONFIG_FILE, DEFAULT_BACKLIGHT, DISK_DIR, DISK_NAME_LEN, NUM_DISKS};
use crate::lcd::Lcd;
use crate::machine::CpuKind;
use crate::status::{StatusMode, StatusPage};
use crate::storage::{DiskDrives, FsError, OpenMode, Storage};

const MAGIC: [u8; 4] = *b"GK80";
const DISKS_OFFSET: usize = 13;
pub const SETTINGS_LEN: usize = DISKS_OFFSET + NUM_DISKS * DISK_NAME_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    Truncated,
    BadMagic,
    Fs(FsError),
}

impl From<FsError> for SettingsError {
    fn from(e: FsError) -> Self {
        SettingsError::Fs(e)
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Truncated => write!(f, "settings file truncated"),
            SettingsError::BadMagic => write!(f, "not a settings file"),
            SettingsError::Fs(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSettings {
    pub cpu: CpuKind,
    /// MHz, 0 runs unlimited.
    pub speed: u32,
    /// Value read from port 255 (front-panel switches).
    pub fp_value: u8,
    pub brightness: u8,
    pub rotated: bool,
    pub initial_page: StatusPage,
    /// Image paths as kept by `DiskDrives`.
    pub disks: [Option<String>; NUM_DISKS],
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            cpu: CpuKind::Z80,
            speed: 0,
            fp_value: 0,
            brightness: DEFAULT_BACKLIGHT,
            rotated: false,
            initial_page: StatusPage::Registers,
            disks: Default::default(),
        }
    }
}

impl MachineSettings {
    pub fn encode(&self) -> [u8; SETTINGS_LEN] {
        let mut buf = [0u8; SETTINGS_LEN];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4] = self.cpu as u8;
        buf[5..9].copy_from_slice(&self.speed.to_le_bytes());
        buf[9] = self.fp_value;
        buf[10] = self.brightness;
        buf[11] = self.rotated as u8;
        buf[12] = self.initial_page as u8 + 1;
        for (i, disk) in self.disks.iter().enumerate() {
            let Some(path) = disk else { continue };
            // keep the terminating NUL
            let bytes = path.as_bytes();
            let n = bytes.len().min(DISK_NAME_LEN - 1);
            let start = DISKS_OFFSET + i * DISK_NAME_LEN;
            buf[start..start + n].copy_from_slice(&bytes[..n]);
        }
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, SettingsError> {
        if buf.len() < SETTINGS_LEN {
            return Err(SettingsError::Truncated);
        }
        if buf[0..4] != MAGIC {
            return Err(SettingsError::BadMagic);
        }

        let defaults = Self::default();
        let cpu = CpuKind::from_raw(buf[4]).unwrap_or_else(|| {
            log::warn!("unknown CPU {} in settings", buf[4]);
            defaults.cpu
        });
        // only pages built into this firmware can be restored
        let initial_page = StatusMode::from_raw(buf[12])
            .and_then(StatusMode::page)
            .unwrap_or(StatusPage::Registers);

        let mut disks: [Option<String>; NUM_DISKS] = Default::default();
        for (i, disk) in disks.iter_mut().enumerate() {
            let field = &buf[DISKS_OFFSET + i * DISK_NAME_LEN..DISKS_OFFSET + (i + 1) * DISK_NAME_LEN];
            let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
            if len > 0 {
                *disk = Some(String::from_utf8_lossy(&field[..len]).into_owned());
            }
        }

        Ok(Self {
            cpu,
            speed: u32::from_le_bytes([buf[5], buf[6], buf[7], buf[8]]),
            fp_value: buf[9],
            brightness: buf[10].min(100),
            rotated: buf[11] != 0,
            initial_page,
            disks,
        })
    }

    /// Read the settings file. A missing file gives the defaults.
    pub fn load<S: Storage>(fs: &mut S) -> Result<Self, SettingsError> {
        let mut file = match fs.open(CONFIG_FILE, OpenMode::Read) {
            Ok(file) => file,
            Err(FsError::NotFound) => {
                log::info!("no {}, using defaults", CONFIG_FILE);
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let mut buf = [0u8; SETTINGS_LEN];
        let result = fs.read(&mut file, &mut buf);
        let _ = fs.close(file);
        let n = result?;
        Self::decode(&buf[..n])
    }

    pub fn save<S: Storage>(&self, fs: &mut S) -> Result<(), SettingsError> {
        let mut file = fs.open(CONFIG_FILE, OpenMode::Create)?;
        let result = fs.write(&mut file, &self.encode());
        fs.close(file)?;
        if result? < SETTINGS_LEN {
            log::warn!("short write to {}", CONFIG_FILE);
            return Err(SettingsError::Fs(FsError::Io));
        }
        Ok(())
    }

    /// Push brightness and rotation to the display.
    pub fn apply(&self, lcd: &Lcd<'_>) {
        lcd.set_brightness(self.brightness);
        lcd.set_rotation(self.rotated);
    }

    /// Remember what is mounted in `drives`.
    pub fn capture_disks(&mut self, drives: &DiskDrives<'_>) {
        for (i, disk) in self.disks.iter_mut().enumerate() {
            *disk = drives.mounted(i).map(String::from);
        }
    }

    /// Mount the saved images again. Images that vanished are skipped.
    pub fn restore_disks<S: Storage>(&self, drives: &mut DiskDrives<'_>, fs: &mut S) {
        for (i, disk) in self.disks.iter().enumerate() {
            let Some(name) = disk.as_deref().and_then(image_name) else {
                continue;
            };
            if let Err(e) = drives.mount(fs, i, name) {
                log::warn!("drive {}: can't mount {}: {}", i, name, e);
            }
        }
    }
}

/// `CPM22` for `/DISKS80/CPM22.DSK`.
fn image_name(path: &str) -> Option<&str> {
    path.strip_prefix(DISK_DIR)?.strip_prefix('/')?.strip_suffix(".DSK")
}
