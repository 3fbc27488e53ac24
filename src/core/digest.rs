//! Content fingerprinting using streamed SHA-256

use serde::{Serialize, Serializer};
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::error::DigestError;

/// Read buffer size used by [`compute_digest`].
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Width of a [`Digest`] in bytes.
pub const DIGEST_LEN: usize = 32;

/// SHA-256 fingerprint of a file's content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex encoding, 64 characters.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// Parse a 64-character hex string. Returns `None` on bad length or
    /// non-hex input.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != DIGEST_LEN * 2 || !hex.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; DIGEST_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Digest(bytes))
    }

    /// Digest of an in-memory buffer.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Digest(hasher.finalize().into())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Source of content fingerprints for the scanner.
///
/// Implementations must be safe to call from several worker threads at once.
pub trait ContentHasher: Sync {
    fn digest(&self, path: &Path) -> Result<Digest, DigestError>;
}

/// Default hasher: streams the file through SHA-256.
#[derive(Debug, Clone, Copy)]
pub struct Sha256Hasher {
    pub chunk_size: usize,
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl ContentHasher for Sha256Hasher {
    fn digest(&self, path: &Path) -> Result<Digest, DigestError> {
        compute_digest_with_chunk_size(path, self.chunk_size)
    }
}

/// Compute the SHA-256 digest of a file
///
/// # Arguments
/// * `path` - Path to a readable regular file
///
/// # Returns
/// The digest of the file's bytes, independent of its name, mtime and
/// permissions
pub fn compute_digest(path: &Path) -> Result<Digest, DigestError> {
    compute_digest_with_chunk_size(path, CHUNK_SIZE)
}

/// Same as [`compute_digest`] with an explicit read buffer size.
///
/// The buffer size only changes how many reads are issued, never the result.
/// A size of zero is treated as one.
pub fn compute_digest_with_chunk_size(path: &Path, chunk_size: usize) -> Result<Digest, DigestError> {
    let mut file = File::open(path).map_err(|e| DigestError::on_open(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DigestError::on_read(path, e)),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Digest(hasher.finalize().into()))
}
