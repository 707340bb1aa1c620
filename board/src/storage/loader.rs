//! Boot code loading and directory listings

use alloc::format;
use alloc::vec::Vec;

use super::{FileInfo, FsError, OpenMode, Storage};
use crate::constants::{CODE_DIR, SECTOR_SIZE};
use crate::machine::DmaMemory;

/// Load `/CODE80/<name>.BIN` into memory from address 0.
///
/// The file is read in 128-byte records. Returns the number of bytes
/// loaded.
pub fn load_file<S: Storage, M: DmaMemory + ?Sized>(fs: &mut S, mem: &M, name: &str) -> Result<usize, FsError> {
    let path = format!("{}/{}.BIN", CODE_DIR, name);
    let mut file = fs.open(&path, OpenMode::Read).map_err(|e| {
        log::warn!("can't open {}: {}", path, e);
        e
    })?;

    let mut buf = [0u8; SECTOR_SIZE];
    let mut loaded = 0usize;
    let result = loop {
        let n = match fs.read(&mut file, &mut buf) {
            Ok(n) => n,
            Err(e) => break Err(e),
        };
        for (i, &b) in buf[..n].iter().enumerate() {
            mem.dma_write((loaded + i) as u16, b);
        }
        loaded += n;
        // last record reached, or the address space is full
        if n < SECTOR_SIZE || loaded >= 1 << 16 {
            break Ok(loaded);
        }
    };
    let _ = fs.close(file);

    match result {
        Ok(n) => log::info!("loaded file \"{}\" ({} bytes)", path, n),
        Err(e) => log::warn!("read error in {}: {}", path, e),
    }
    result
}

/// All entries of `dir` matching `pattern`, in directory order.
pub fn list_files<S: Storage>(fs: &mut S, dir: &str, pattern: &str) -> Result<Vec<FileInfo>, FsError> {
    let (mut search, mut next) = fs.find_first(dir, pattern)?;
    let mut found = Vec::new();
    while let Some(info) = next {
        found.push(info);
        next = fs.find_next(&mut search)?;
    }
    Ok(found)
}
