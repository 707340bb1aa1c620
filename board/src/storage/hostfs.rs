//! `Storage` over a host directory standing in for the MicroSD card

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use std::vec::IntoIter;

use super::{matches_pattern, FileInfo, FsError, OpenMode, Storage};

impl From<io::Error> for FsError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => FsError::NotFound,
            io::ErrorKind::PermissionDenied => FsError::Denied,
            io::ErrorKind::AlreadyExists => FsError::Exists,
            io::ErrorKind::InvalidInput => FsError::InvalidName,
            io::ErrorKind::UnexpectedEof => FsError::Eof,
            _ => FsError::Io,
        }
    }
}

pub struct HostStorage {
    root: PathBuf,
}

impl HostStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path for a card path. Card paths are absolute and may not
    /// leave the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        let mut host = self.root.clone();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => host.push(part),
                Component::CurDir => {}
                _ => return Err(FsError::InvalidName),
            }
        }
        Ok(host)
    }
}

impl Storage for HostStorage {
    type File = File;
    type Dir = IntoIter<FileInfo>;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<File, FsError> {
        let host = self.resolve(path)?;
        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Read => options.read(true),
            OpenMode::ReadWrite => options.read(true).write(true),
            OpenMode::Create => options.read(true).write(true).create(true).truncate(true),
        };
        Ok(options.open(host)?)
    }

    fn close(&mut self, file: File) -> Result<(), FsError> {
        file.sync_all().or_else(|e| match e.kind() {
            // read-only handles can't always be synced
            io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidInput => Ok(()),
            _ => Err(FsError::from(e)),
        })
    }

    fn seek(&mut self, file: &mut File, offset: u64) -> Result<(), FsError> {
        file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn read(&mut self, file: &mut File, buf: &mut [u8]) -> Result<usize, FsError> {
        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }

    fn write(&mut self, file: &mut File, buf: &[u8]) -> Result<usize, FsError> {
        let mut total = 0;
        while total < buf.len() {
            match file.write(&buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }

    fn find_first(&mut self, dir: &str, pattern: &str) -> Result<(Self::Dir, Option<FileInfo>), FsError> {
        let mut found = Vec::new();
        for entry in fs::read_dir(self.resolve(dir)?)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if matches_pattern(pattern, &name) {
                found.push(FileInfo {
                    name,
                    size: meta.len().min(u32::MAX as u64) as u32,
                    is_dir: meta.is_dir(),
                });
            }
        }
        // read_dir order is unspecified
        found.sort_by(|a, b| a.name.cmp(&b.name));
        let mut iter = found.into_iter();
        let first = iter.next();
        Ok((iter, first))
    }

    fn find_next(&mut self, dir: &mut Self::Dir) -> Result<Option<FileInfo>, FsError> {
        Ok(dir.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{AtomicMachine, CpuKind};
    use crate::storage::{list_files, load_file, DiskDrives, DiskStatus};

    struct TempRoot(PathBuf);

    impl TempRoot {
        fn new(tag: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("geekboard-{}-{}", tag, std::process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(dir.join("DISKS80")).unwrap();
            fs::create_dir_all(dir.join("CODE80")).unwrap();
            Self(dir)
        }
    }

    impl Drop for TempRoot {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_paths_stay_inside_root() {
        let root = TempRoot::new("paths");
        let mut card = HostStorage::new(&root.0);
        assert_eq!(card.open("/../etc/passwd", OpenMode::Read).err(), Some(FsError::InvalidName));
        assert_eq!(card.open("/CODE80/NONE.BIN", OpenMode::Read).err(), Some(FsError::NotFound));
    }

    #[test]
    fn test_sector_io_on_host_files() {
        let root = TempRoot::new("sectors");
        fs::write(root.0.join("DISKS80/CPM22.DSK"), vec![0xe5u8; 77 * 26 * 128]).unwrap();
        let mut card = HostStorage::new(&root.0);
        let m = AtomicMachine::new(CpuKind::Z80, 1);
        let mut drives = DiskDrives::new();
        drives.mount(&mut card, 0, "CPM22").unwrap();

        for i in 0..128u16 {
            m.putmem(0x1000 + i, i as u8 ^ 0x5a);
        }
        assert_eq!(drives.write_sector(&mut card, &m, 0, 1, 1, 0x1000), DiskStatus::Ok);
        assert_eq!(drives.read_sector(&mut card, &m, 0, 1, 1, 0x3000), DiskStatus::Ok);
        assert_eq!(m.getmem(0x3000), 0x5a);
        assert_eq!(m.getmem(0x307f), 127 ^ 0x5a);

        let image = fs::read(root.0.join("DISKS80/CPM22.DSK")).unwrap();
        assert_eq!(image[26 * 128], 0x5a);
        assert_eq!(image[26 * 128 - 1], 0xe5);
    }

    #[test]
    fn test_listing_and_loading() {
        let root = TempRoot::new("listing");
        fs::write(root.0.join("CODE80/BOOT.BIN"), [0xc3, 0x00, 0x01]).unwrap();
        fs::write(root.0.join("CODE80/MON.BIN"), [0x00]).unwrap();
        fs::write(root.0.join("CODE80/NOTES.TXT"), b"x").unwrap();
        let mut card = HostStorage::new(&root.0);

        let names: Vec<String> = list_files(&mut card, "/CODE80", "*.bin").unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, ["BOOT.BIN", "MON.BIN"]);

        let m = AtomicMachine::new(CpuKind::Z80, 1);
        assert_eq!(load_file(&mut card, &m, "BOOT"), Ok(3));
        assert_eq!(m.getmem(0), 0xc3);
    }
}
