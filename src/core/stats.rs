use serde::{Serialize, Deserialize};

/// Counters reported by an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub processed: u64,        // Records read from the stream
    pub imported: u64,         // Records handed to the store
    pub duplicates: u64,       // Repeated identifiers dropped
    pub deleted_skipped: u64,  // Records dropped by the deletion flag
}

/// Sizes of the two stores behind a database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub indexed: usize,
}
