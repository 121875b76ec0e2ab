//! Gzip stream copy.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{self, BufWriter, Read, Write};

use crate::config::MAX_COMPRESSION_LEVEL;

/// Copy `reader` into `writer` through a gzip encoder.
///
/// The gzip trailer is written by an explicit `finish()`; without it the
/// archive is truncated. Returns the number of uncompressed bytes read.
///
/// Levels above [`MAX_COMPRESSION_LEVEL`] are rejected with
/// [`io::ErrorKind::InvalidInput`] before anything is read or written.
pub fn gzip_copy<R: Read, W: Write>(mut reader: R, writer: W, level: u32) -> io::Result<u64> {
    if level > MAX_COMPRESSION_LEVEL {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("compression level {level} exceeds maximum {MAX_COMPRESSION_LEVEL}"),
        ));
    }
    let mut encoder = GzEncoder::new(BufWriter::new(writer), Compression::new(level));
    let copied = io::copy(&mut reader, &mut encoder)?;
    let mut inner = encoder.finish()?;
    inner.flush()?;
    Ok(copied)
}
