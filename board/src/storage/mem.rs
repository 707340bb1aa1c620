//! In-memory `Storage` for tests

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::{IntoIter, Vec};

use super::{matches_pattern, FileInfo, FsError, OpenMode, Storage};

#[derive(Default)]
pub struct MemStorage {
    pub files: BTreeMap<String, Vec<u8>>,
    /// Largest file size writes may grow to.
    pub capacity: Option<usize>,
    pub open_files: usize,
}

pub struct MemFile {
    path: String,
    pos: usize,
    writable: bool,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, data: Vec<u8>) {
        self.files.insert(path.to_string(), data);
    }
}

impl Storage for MemStorage {
    type File = MemFile;
    type Dir = IntoIter<FileInfo>;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<MemFile, FsError> {
        match mode {
            OpenMode::Create => {
                self.files.insert(path.to_string(), Vec::new());
            }
            _ if !self.files.contains_key(path) => return Err(FsError::NotFound),
            _ => {}
        }
        self.open_files += 1;
        Ok(MemFile {
            path: path.to_string(),
            pos: 0,
            writable: mode != OpenMode::Read,
        })
    }

    fn close(&mut self, _file: MemFile) -> Result<(), FsError> {
        self.open_files -= 1;
        Ok(())
    }

    fn seek(&mut self, file: &mut MemFile, offset: u64) -> Result<(), FsError> {
        file.pos = offset as usize;
        Ok(())
    }

    fn read(&mut self, file: &mut MemFile, buf: &mut [u8]) -> Result<usize, FsError> {
        let data = self.files.get(&file.path).ok_or(FsError::NotFound)?;
        let start = file.pos.min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        file.pos += n;
        Ok(n)
    }

    fn write(&mut self, file: &mut MemFile, buf: &[u8]) -> Result<usize, FsError> {
        if !file.writable {
            return Err(FsError::Denied);
        }
        let cap = self.capacity.unwrap_or(usize::MAX);
        let data = self.files.get_mut(&file.path).ok_or(FsError::NotFound)?;
        let n = buf.len().min(cap.saturating_sub(file.pos));
        if data.len() < file.pos + n {
            data.resize(file.pos + n, 0);
        }
        data[file.pos..file.pos + n].copy_from_slice(&buf[..n]);
        file.pos += n;
        Ok(n)
    }

    fn find_first(&mut self, dir: &str, pattern: &str) -> Result<(Self::Dir, Option<FileInfo>), FsError> {
        let prefix = alloc::format!("{}/", dir.trim_end_matches('/'));
        let found: Vec<FileInfo> = self
            .files
            .iter()
            .filter_map(|(path, data)| {
                let name = path.strip_prefix(&prefix)?;
                (!name.contains('/') && matches_pattern(pattern, name)).then(|| FileInfo {
                    name: name.to_string(),
                    size: data.len() as u32,
                    is_dir: false,
                })
            })
            .collect();
        let mut iter = found.into_iter();
        let first = iter.next();
        Ok((iter, first))
    }

    fn find_next(&mut self, dir: &mut Self::Dir) -> Result<Option<FileInfo>, FsError> {
        Ok(dir.next())
    }
}
