//! Content fingerprints for schema bundle files.
//!
//! The hash is the standard base64 encoding of the SHA-256 digest of the
//! file's bytes. It depends only on content, never on the file name or path,
//! and is used to spot out-of-band edits to a bundle between plans.

use std::fs::File;
use std::io;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

use crate::error::ProviderError;

/// Hash the file at `path`, streaming its contents through SHA-256.
pub fn hash_file(path: impl AsRef<Path>) -> Result<String, ProviderError> {
    let path = path.as_ref();
    let io_err = |source: io::Error| ProviderError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(io_err)?;

    Ok(encode_digest(&hasher.finalize()))
}

/// Hash an in-memory buffer the same way [`hash_file`] hashes a file.
pub fn hash_bytes(bytes: &[u8]) -> String {
    encode_digest(&Sha256::digest(bytes))
}

fn encode_digest(digest: &[u8]) -> String {
    STANDARD.encode(digest)
}
