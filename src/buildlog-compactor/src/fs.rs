//! Filesystem access used by the compactor.
//!
//! Every handle is returned boxed and owned by the caller, so it is closed
//! when it goes out of scope on any exit path.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

/// The filesystem operations a compaction needs.
pub trait LogFs: Send + Sync {
    /// Open a file for reading.
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read>>;

    /// Create (or truncate) a file for writing.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write>>;

    /// Length of the file in bytes.
    fn file_len(&self, path: &Path) -> io::Result<u64>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// [`LogFs`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl LogFs for OsFs {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(path)?))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(File::create(path)?))
    }

    fn file_len(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}
