//! File existence checks, content reads, and content hashing, grounded
//! on `chronos::filesystem`. The hash only needs to be stable within
//! one process's lifetime, so the standard library's `SipHash` is
//! enough — no need for a cryptographic digest.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::error::{ReloadError, Result};

pub fn check_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ReloadError::FileNotFound(path.to_path_buf()))
    }
}

pub fn read_content(path: &Path) -> Result<String> {
    check_exists(path)?;
    std::fs::read_to_string(path).map_err(|source| ReloadError::Io { path: path.to_path_buf(), source })
}

pub fn content_hash(path: &Path) -> Result<u64> {
    let content = read_content(path)?;
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    Ok(hasher.finish())
}
