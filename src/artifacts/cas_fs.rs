use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;

/// Hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Blob location for a digest: `<root>/sha256/<aa>/<bb>/<hex>`
pub fn cas_path(root: &Path, hex: &str) -> PathBuf {
    root.join("sha256").join(&hex[0..2]).join(&hex[2..4]).join(hex)
}

/// Store `bytes` under their digest, writing only if absent. Returns the hex digest.
pub fn write_cas(root: &Path, bytes: &[u8]) -> StoreResult<String> {
    let hex = sha256_hex(bytes);
    let path = cas_path(root, &hex);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    if !path.exists() {
        fs::write(&path, bytes)?;
    }
    Ok(hex)
}
