use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Hash algorithms a provider checksum can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Sha1,
    Sha256,
}

impl ChecksumAlgorithm {
    /// Infer the algorithm from the shape of a hex digest.
    pub fn detect(digest: &str) -> Option<Self> {
        if !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digest.len() {
            40 => Some(Self::Sha1),
            64 => Some(Self::Sha256),
            _ => None,
        }
    }
}

/// Lowercase hex digest of a file's contents.
pub fn file_digest(path: &Path, algorithm: ChecksumAlgorithm) -> io::Result<String> {
    let mut file = File::open(path)?;
    match algorithm {
        ChecksumAlgorithm::Sha1 => digest_reader::<Sha1>(&mut file),
        ChecksumAlgorithm::Sha256 => digest_reader::<Sha256>(&mut file),
    }
}

/// Lowercase hex digest of an in-memory buffer.
pub fn digest_bytes(bytes: &[u8], algorithm: ChecksumAlgorithm) -> String {
    match algorithm {
        ChecksumAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
        ChecksumAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
    }
}

/// Compare a local file against a remote checksum.
///
/// Returns `None` when the remote checksum is not a digest we can reproduce.
pub fn matches_remote(path: &Path, remote_checksum: &str) -> io::Result<Option<bool>> {
    let Some(algorithm) = ChecksumAlgorithm::detect(remote_checksum) else {
        return Ok(None);
    };
    let local = file_digest(path, algorithm)?;
    Ok(Some(local.eq_ignore_ascii_case(remote_checksum)))
}

fn digest_reader<D: Digest>(reader: &mut impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
