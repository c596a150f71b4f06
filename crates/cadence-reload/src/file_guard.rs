//! Detects whether a file's content has changed since it was last
//! checked. Grounded on `chronos::FileGuard`.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::filesystem::content_hash;

pub struct FileGuard {
    path: PathBuf,
    previous_hash: u64,
}

impl FileGuard {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let previous_hash = content_hash(&path)?;
        Ok(Self { path, previous_hash })
    }

    /// Recomputes the content hash, compares it to the stored value,
    /// updates it, and reports whether it changed.
    pub fn check_for_change(&mut self) -> Result<bool> {
        let current_hash = content_hash(&self.path)?;
        let changed = current_hash != self.previous_hash;
        self.previous_hash = current_hash;
        Ok(changed)
    }
}
