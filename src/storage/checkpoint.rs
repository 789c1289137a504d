use std::fs;
use std::io::Write;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use crate::storage::layout::StorageLayout;
use crate::storage::segment::SegmentId;
use crate::core::error::{Error, Result};

/// Search index manifest: which segments make up the index, in replay order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub language: String,
    pub segments: Vec<SegmentId>,
    pub timestamp: DateTime<Utc>,
    pub doc_count: usize,
}

impl Checkpoint {
    pub fn new(language: &str) -> Self {
        Checkpoint {
            language: language.to_string(),
            segments: Vec::new(),
            timestamp: Utc::now(),
            doc_count: 0,
        }
    }

    /// Load checkpoint from disk
    pub fn load(storage: &StorageLayout) -> Result<Option<Self>> {
        let path = storage.manifest_path();
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        let checkpoint = bincode::deserialize(&data)
            .map_err(|e| Error::read_failure(format!("manifest {}: {}", path.display(), e)))?;
        Ok(Some(checkpoint))
    }

    /// Replaces the manifest on disk. Readers see either the old or the new one.
    pub fn save(&mut self, storage: &StorageLayout) -> Result<()> {
        self.timestamp = Utc::now();
        let data = bincode::serialize(self)?;

        let mut tmp = NamedTempFile::new_in(&storage.meta_dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(storage.manifest_path())
            .map_err(|e| Error::write_failure(format!("manifest: {}", e)))?;
        Ok(())
    }
}
