use std::path::PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index_path: PathBuf,   // Root holding the document store and search index
    pub library_path: PathBuf, // Where book folders and sub-archives live
    pub language: String,      // Analyzer language for a freshly created index

    pub batch_size: usize,            // Records per store write
    pub stream_queue_capacity: usize, // Reader -> importer hand-off slots
    pub page_size: usize,             // Hits per search page
}

impl Default for Config {
    fn default() -> Self {
        Config {
            index_path: PathBuf::from("./index"),
            library_path: PathBuf::from("./library"),
            language: "en".to_string(),

            batch_size: 1000,
            stream_queue_capacity: 128,
            page_size: 10,
        }
    }
}
