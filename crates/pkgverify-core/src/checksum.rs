//! SHA-256 digests of downloaded artifacts.
//!
//! Files are streamed through the hasher in fixed-size chunks so memory use
//! stays bounded no matter how large the artifact is.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 8 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    sha256_reader(f).with_context(|| format!("read {}", path.display()))
}

/// Hash everything `reader` yields, `BUF_SIZE` bytes at a time.
pub fn sha256_reader<R: Read>(reader: R) -> io::Result<String> {
    sha256_reader_chunked(reader, BUF_SIZE)
}

fn sha256_reader_chunked<R: Read>(mut reader: R, chunk: usize) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; chunk.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compare a declared digest against a computed one.
///
/// Hex case is ignored, as is whitespace around the declared value (XML text
/// nodes often carry it).
pub fn digests_match(declared: &str, computed: &str) -> bool {
    declared.trim().eq_ignore_ascii_case(computed.trim())
}
