//! MicroSD storage glue
//!
//! The FAT driver is reached only through the `Storage` trait:
//! - `disks` - drive mount table and sector I/O for the emulated FDC
//! - `loader` - boot code loading and directory listings
//! - `hostfs` - `Storage` over a host directory (`std` only)

pub mod disks;
#[cfg(any(test, feature = "std"))]
pub mod hostfs;
pub mod loader;
#[cfg(test)]
pub(crate) mod mem;

use alloc::string::String;
use core::fmt;

pub use disks::{DiskDrives, DiskStatus, MountError};
#[cfg(any(test, feature = "std"))]
pub use hostfs::HostStorage;
pub use loader::{list_files, load_file};

/// Filesystem error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// No such file or directory
    NotFound,
    /// Access denied or file read-only
    Denied,
    /// File already exists
    Exists,
    /// Malformed path or name
    InvalidName,
    /// Low level I/O failure
    Io,
    /// Read or seek past the end of the file
    Eof,
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FsError::NotFound => "file not found",
            FsError::Denied => "access denied",
            FsError::Exists => "file exists",
            FsError::InvalidName => "invalid name",
            FsError::Io => "I/O error",
            FsError::Eof => "end of file",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    ReadWrite,
    /// Create or truncate, then read and write.
    Create,
}

/// Information about a directory entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u32,
    pub is_dir: bool,
}

/// Filesystem interface consumed by the disk and loader code
///
/// Implemented by the FAT driver on the board and by `HostStorage`.
pub trait Storage {
    type File;
    type Dir;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::File, FsError>;

    fn close(&mut self, file: Self::File) -> Result<(), FsError>;

    /// Move to an absolute byte offset.
    fn seek(&mut self, file: &mut Self::File, offset: u64) -> Result<(), FsError>;

    /// Read up to `buf.len()` bytes. A short count means end of file.
    fn read(&mut self, file: &mut Self::File, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Write up to `buf.len()` bytes. A short count means the medium is full.
    fn write(&mut self, file: &mut Self::File, buf: &[u8]) -> Result<usize, FsError>;

    /// Start a search for entries of `dir` matching `pattern` (`*` and `?`
    /// wildcards). Returns the first match, if any.
    fn find_first(&mut self, dir: &str, pattern: &str) -> Result<(Self::Dir, Option<FileInfo>), FsError>;

    /// Next match of a search, `None` when exhausted.
    fn find_next(&mut self, dir: &mut Self::Dir) -> Result<Option<FileInfo>, FsError>;
}

/// Case-insensitive match of `name` against a pattern with `*` (any run)
/// and `?` (any single character).
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    let p = pattern.as_bytes();
    let n = name.as_bytes();
    let (mut pi, mut ni) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == b'?' || p[pi].eq_ignore_ascii_case(&n[ni])) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == b'*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((sp, sn)) = star {
            // let the last star swallow one more character
            pi = sp + 1;
            ni = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == b'*')
}
