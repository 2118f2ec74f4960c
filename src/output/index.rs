use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::Error;

/// A VisIt-style index: one snapshot path per line, relative to the index.
#[derive(Debug)]
pub struct SnapshotIndex {
    path: PathBuf,
}

impl SnapshotIndex {
    /// Opens `dir/name.visit`, truncating it unless `append` is set.
    pub fn create<P: AsRef<Path>>(dir: P, name: &str, append: bool) -> Result<Self, Error> {
        let path = dir.as_ref().join(format!("{}.visit", name));
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(!append)
            .open(&path)?;

        Ok(Self { path })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add(&self, rel_path: &str) -> Result<(), Error> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", rel_path)?;
        Ok(())
    }
}
