use std::path::{Path, PathBuf};
use std::fs;
use crate::core::error::Result;
use crate::storage::segment::SegmentId;

/// Directory structure of an index root
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,      // Root directory
    pub docs_dir: PathBuf,      // Document store (books.dat)
    pub index_dir: PathBuf,     // Search index root
    pub segments_dir: PathBuf,  // Search index segments (.seg files)
    pub meta_dir: PathBuf,      // Search index manifest
}

impl StorageLayout {
    /// Describes the layout without touching the disk.
    pub fn at(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let docs_dir = base_dir.join("docs");
        let index_dir = base_dir.join("index");
        let segments_dir = index_dir.join("segments");
        let meta_dir = index_dir.join("meta");

        StorageLayout {
            base_dir,
            docs_dir,
            index_dir,
            segments_dir,
            meta_dir,
        }
    }

    /// Describes the layout and creates its directories.
    pub fn create(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let layout = Self::at(base_dir);

        fs::create_dir_all(&layout.docs_dir)?;
        fs::create_dir_all(&layout.segments_dir)?;
        fs::create_dir_all(&layout.meta_dir)?;

        Ok(layout)
    }

    pub fn documents_path(&self) -> PathBuf {
        self.docs_dir.join("books.dat")
    }

    pub fn segment_path(&self, id: &SegmentId) -> PathBuf {
        self.segments_dir.join(format!("{}.seg", id.0))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.meta_dir.join("manifest.bin")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join(".lock")
    }

    /// True when both stores have been created at this root.
    pub fn exists(&self) -> bool {
        self.documents_path().exists() && self.manifest_path().exists()
    }
}

/// Removes a whole index root before a full re-import. Missing roots are fine.
pub fn reset_index(base_dir: &Path) -> Result<()> {
    if base_dir.exists() {
        tracing::info!("deleting old index at {}", base_dir.display());
        fs::remove_dir_all(base_dir)?;
    }
    Ok(())
}
