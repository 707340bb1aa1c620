//! Disk drives of the emulated floppy controller
//!
//! Each drive refers to an image file `/DISKS80/<NAME>.DSK` of 77 tracks
//! with 26 sectors of 128 bytes. Images are opened per sector access, so
//! the card can be swapped between accesses.

use alloc::format;
use alloc::string::String;
use core::fmt;

use super::{FsError, OpenMode, Storage};
use crate::constants::{DISK_DIR, DISK_NAME_LEN, DMA_ADDR_LIMIT, NUM_DISKS, SECTORS_PER_TRACK, SECTOR_SIZE, TRACKS};
use crate::machine::DmaMemory;
use crate::telemetry::Telemetry;

/// Status codes reported to the emulated controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DiskStatus {
    Ok = 0,
    /// Drive number out of range
    IllegalDrive = 1,
    /// No image mounted or the image can't be opened
    NoDisk = 2,
    TrackRange = 3,
    SectorRange = 4,
    /// Transfer would run into the boot ROM page
    DmaRange = 5,
    SeekFailed = 6,
    ReadShort = 7,
    WriteShort = 8,
}

impl fmt::Display for DiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DiskStatus::Ok => "ok",
            DiskStatus::IllegalDrive => "illegal drive",
            DiskStatus::NoDisk => "no disk",
            DiskStatus::TrackRange => "track out of range",
            DiskStatus::SectorRange => "sector out of range",
            DiskStatus::DmaRange => "DMA address out of range",
            DiskStatus::SeekFailed => "seek failed",
            DiskStatus::ReadShort => "read error",
            DiskStatus::WriteShort => "write error",
        };
        f.write_str(msg)
    }
}

impl From<FsError> for DiskStatus {
    /// An image that can't be opened counts as no disk in the drive.
    fn from(_: FsError) -> Self {
        DiskStatus::NoDisk
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    IllegalDrive,
    /// Path does not fit the mount table entry.
    NameTooLong,
    /// The image is already in this other drive.
    AlreadyMounted(usize),
    Fs(FsError),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountError::IllegalDrive => write!(f, "illegal drive"),
            MountError::NameTooLong => write!(f, "disk name too long"),
            MountError::AlreadyMounted(d) => write!(f, "disk already mounted in drive {}", (b'A' + *d as u8) as char),
            MountError::Fs(e) => write!(f, "{}", e),
        }
    }
}

pub struct DiskDrives<'a> {
    names: [Option<String>; NUM_DISKS],
    telemetry: Option<&'a Telemetry>,
}

/// Image path for a disk name.
pub fn disk_path(name: &str) -> String {
    format!("{}/{}.DSK", DISK_DIR, name)
}

impl<'a> DiskDrives<'a> {
    pub fn new() -> Self {
        Self {
            names: Default::default(),
            telemetry: None,
        }
    }

    /// Report sector accesses to the drive page and the indicator LED.
    pub fn with_telemetry(telemetry: &'a Telemetry) -> Self {
        Self {
            names: Default::default(),
            telemetry: Some(telemetry),
        }
    }

    /// Path of the image in `drive`.
    pub fn mounted(&self, drive: usize) -> Option<&str> {
        self.names.get(drive)?.as_deref()
    }

    /// Put image `name` into `drive`, replacing what was there.
    pub fn mount<S: Storage>(&mut self, fs: &mut S, drive: usize, name: &str) -> Result<(), MountError> {
        if drive >= NUM_DISKS {
            return Err(MountError::IllegalDrive);
        }
        let path = disk_path(name);
        if path.len() >= DISK_NAME_LEN {
            return Err(MountError::NameTooLong);
        }
        if let Some(other) = (0..NUM_DISKS).find(|&d| d != drive && self.mounted(d) == Some(path.as_str())) {
            return Err(MountError::AlreadyMounted(other));
        }
        let file = fs.open(&path, OpenMode::Read).map_err(MountError::Fs)?;
        fs.close(file).map_err(MountError::Fs)?;
        log::info!("drive {}: {}", (b'A' + drive as u8) as char, path);
        self.names[drive] = Some(path);
        Ok(())
    }

    pub fn unmount(&mut self, drive: usize) {
        if let Some(slot) = self.names.get_mut(drive) {
            *slot = None;
        }
    }

    /// Validate a request, open the image and seek to the sector.
    fn prepare<S: Storage>(&self, fs: &mut S, drive: usize, track: u8, sector: u8, addr: u16) -> Result<S::File, DiskStatus> {
        if drive >= NUM_DISKS {
            return Err(DiskStatus::IllegalDrive);
        }
        if track >= TRACKS {
            return Err(DiskStatus::TrackRange);
        }
        if sector < 1 || sector > SECTORS_PER_TRACK {
            return Err(DiskStatus::SectorRange);
        }
        if addr > DMA_ADDR_LIMIT {
            return Err(DiskStatus::DmaRange);
        }
        let path = self.mounted(drive).ok_or(DiskStatus::NoDisk)?;
        let mut file = fs.open(path, OpenMode::ReadWrite)?;

        let pos = (track as u64 * SECTORS_PER_TRACK as u64 + sector as u64 - 1) * SECTOR_SIZE as u64;
        if fs.seek(&mut file, pos).is_err() {
            let _ = fs.close(file);
            return Err(DiskStatus::SeekFailed);
        }
        Ok(file)
    }

    fn activity(&self, drive: usize, track: u8, sector: u8, addr: u16, write: bool, active: bool) {
        if let Some(t) = self.telemetry {
            t.update_drive(drive, track, sector, addr, write, active);
        }
    }

    /// Read one sector into memory at `addr`.
    pub fn read_sector<S: Storage, M: DmaMemory + ?Sized>(
        &self,
        fs: &mut S,
        mem: &M,
        drive: usize,
        track: u8,
        sector: u8,
        addr: u16,
    ) -> DiskStatus {
        let mut file = match self.prepare(fs, drive, track, sector, addr) {
            Ok(file) => file,
            Err(status) => {
                log::debug!("read {}/{}/{}: {}", drive, track, sector, status);
                return status;
            }
        };
        self.activity(drive, track, sector, addr, false, true);

        let mut buf = [0u8; SECTOR_SIZE];
        let result = fs.read(&mut file, &mut buf);
        let _ = fs.close(file);
        let status = match result {
            Ok(n) if n == SECTOR_SIZE => {
                for (i, &b) in buf.iter().enumerate() {
                    mem.dma_write(addr + i as u16, b);
                }
                DiskStatus::Ok
            }
            _ => DiskStatus::ReadShort,
        };
        if status != DiskStatus::Ok {
            log::warn!("read {}/{}/{}: {}", drive, track, sector, status);
        }

        self.activity(drive, track, sector, addr, false, false);
        status
    }

    /// Write one sector from memory at `addr`.
    pub fn write_sector<S: Storage, M: DmaMemory + ?Sized>(
        &self,
        fs: &mut S,
        mem: &M,
        drive: usize,
        track: u8,
        sector: u8,
        addr: u16,
    ) -> DiskStatus {
        let mut file = match self.prepare(fs, drive, track, sector, addr) {
            Ok(file) => file,
            Err(status) => {
                log::debug!("write {}/{}/{}: {}", drive, track, sector, status);
                return status;
            }
        };
        self.activity(drive, track, sector, addr, true, true);

        let mut buf = [0u8; SECTOR_SIZE];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = mem.dma_read(addr + i as u16);
        }
        let result = fs.write(&mut file, &buf);
        let _ = fs.close(file);
        let status = match result {
            Ok(n) if n == SECTOR_SIZE => DiskStatus::Ok,
            _ => DiskStatus::WriteShort,
        };
        if status != DiskStatus::Ok {
            log::warn!("write {}/{}/{}: {}", drive, track, sector, status);
        }

        self.activity(drive, track, sector, addr, true, false);
        status
    }
}

impl Default for DiskDrives<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{AtomicMachine, CpuKind};
    use crate::storage::mem::MemStorage;
    use crate::telemetry::LedColor;
    use alloc::vec;

    const IMAGE_LEN: usize = TRACKS as usize * SECTORS_PER_TRACK as usize * SECTOR_SIZE;

    fn setup() -> (MemStorage, AtomicMachine) {
        let mut fs = MemStorage::new();
        let mut image = vec![0xe5u8; IMAGE_LEN];
        // track 2, sector 3
        let pos = (2 * 26 + 2) * SECTOR_SIZE;
        image[pos..pos + SECTOR_SIZE].fill(0x42);
        fs.insert("/DISKS80/CPM22.DSK", image);
        fs.insert("/DISKS80/SHORT.DSK", vec![0; 100]);
        (fs, AtomicMachine::new(CpuKind::Z80, 1))
    }

    #[test]
    fn test_mount_rules() {
        let (mut fs, _) = setup();
        let mut drives = DiskDrives::new();
        assert_eq!(drives.mount(&mut fs, 0, "CPM22"), Ok(()));
        assert_eq!(drives.mounted(0), Some("/DISKS80/CPM22.DSK"));
        assert_eq!(drives.mount(&mut fs, 1, "CPM22"), Err(MountError::AlreadyMounted(0)));
        // remounting into the same drive is fine
        assert_eq!(drives.mount(&mut fs, 0, "CPM22"), Ok(()));
        assert_eq!(drives.mount(&mut fs, 1, "NOPE"), Err(MountError::Fs(FsError::NotFound)));
        assert_eq!(drives.mount(&mut fs, 4, "CPM22"), Err(MountError::IllegalDrive));
        assert_eq!(drives.mount(&mut fs, 2, "AVERYLONGNAME"), Err(MountError::NameTooLong));
        drives.unmount(0);
        assert_eq!(drives.mounted(0), None);
        assert_eq!(fs.open_files, 0);
    }

    #[test]
    fn test_bounds_checked_in_order() {
        let (mut fs, m) = setup();
        let drives = DiskDrives::new();
        assert_eq!(drives.read_sector(&mut fs, &m, 4, 0, 1, 0), DiskStatus::IllegalDrive);
        assert_eq!(drives.read_sector(&mut fs, &m, 0, TRACKS, 0, 0), DiskStatus::TrackRange);
        assert_eq!(drives.read_sector(&mut fs, &m, 0, 0, 0, 0), DiskStatus::SectorRange);
        assert_eq!(drives.read_sector(&mut fs, &m, 0, 0, 27, 0), DiskStatus::SectorRange);
        assert_eq!(drives.read_sector(&mut fs, &m, 0, 0, 1, 0xff80), DiskStatus::DmaRange);
        assert_eq!(drives.read_sector(&mut fs, &m, 0, 0, 1, 0), DiskStatus::NoDisk);
        assert_eq!(DiskStatus::DmaRange as u8, 5);
    }

    #[test]
    fn test_read_sector_into_memory() {
        let (mut fs, m) = setup();
        let t = Telemetry::new();
        let mut drives = DiskDrives::with_telemetry(&t);
        drives.mount(&mut fs, 0, "CPM22").unwrap();
        assert_eq!(drives.read_sector(&mut fs, &m, 0, 2, 3, 0x0100), DiskStatus::Ok);
        assert_eq!(m.getmem(0x0100), 0x42);
        assert_eq!(m.getmem(0x017f), 0x42);
        assert_eq!(m.getmem(0x0180), 0x00);

        let rec = t.drive(0).unwrap();
        assert_eq!((rec.track, rec.sector, rec.addr, rec.write, rec.active), (2, 3, 0x0100, false, false));
        assert!(!t.led().intersects(LedColor::RED | LedColor::GREEN));
        assert_eq!(fs.open_files, 0);
    }

    #[test]
    fn test_write_sector_from_memory() {
        let (mut fs, m) = setup();
        let mut drives = DiskDrives::new();
        drives.mount(&mut fs, 1, "CPM22").unwrap();
        for i in 0..SECTOR_SIZE as u16 {
            m.putmem(0x2000 + i, i as u8);
        }
        assert_eq!(drives.write_sector(&mut fs, &m, 1, 76, 26, 0x2000), DiskStatus::Ok);
        let image = &fs.files["/DISKS80/CPM22.DSK"];
        let pos = IMAGE_LEN - SECTOR_SIZE;
        assert_eq!(image[pos], 0);
        assert_eq!(image[pos + 127], 127);
        assert_eq!(image.len(), IMAGE_LEN);
    }

    #[test]
    fn test_short_transfers() {
        let (mut fs, m) = setup();
        let mut drives = DiskDrives::new();
        drives.mount(&mut fs, 0, "SHORT").unwrap();
        assert_eq!(drives.read_sector(&mut fs, &m, 0, 0, 1, 0), DiskStatus::ReadShort);

        drives.mount(&mut fs, 1, "CPM22").unwrap();
        fs.capacity = Some(64);
        assert_eq!(drives.write_sector(&mut fs, &m, 1, 0, 1, 0), DiskStatus::WriteShort);
        assert_eq!(fs.open_files, 0);
    }

    #[test]
    fn test_vanished_image_is_no_disk() {
        let (mut fs, m) = setup();
        let mut drives = DiskDrives::new();
        drives.mount(&mut fs, 0, "CPM22").unwrap();
        fs.files.clear();
        assert_eq!(drives.read_sector(&mut fs, &m, 0, 0, 1, 0), DiskStatus::NoDisk);
    }
}
