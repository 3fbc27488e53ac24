//! Digest engine, error types and cancellation

pub mod cancel;
pub mod digest;
pub mod error;

pub use cancel::CancelToken;
pub use digest::{compute_digest, compute_digest_with_chunk_size, ContentHasher, Digest, Sha256Hasher, CHUNK_SIZE};
pub use error::{DeletionError, DigestError, FailureKind, ScanError, UnknownStrategy};
