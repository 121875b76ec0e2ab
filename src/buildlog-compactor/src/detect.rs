//! Gzip header sniffing.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// First two bytes of every gzip member (RFC 1952).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns true if the stream starts with the gzip magic bytes.
///
/// Reads at most two bytes. Inputs shorter than the magic are not gzip.
pub fn has_gzip_magic<R: Read>(reader: R) -> io::Result<bool> {
    let mut header = Vec::with_capacity(GZIP_MAGIC.len());
    reader
        .take(GZIP_MAGIC.len() as u64)
        .read_to_end(&mut header)?;
    Ok(header == GZIP_MAGIC)
}

/// Returns true if the file at `path` is gzip-framed.
pub fn is_gzip_file(path: &Path) -> io::Result<bool> {
    let file = File::open(path)?;
    has_gzip_magic(file)
}
