pub mod core;
pub mod inpx;
pub mod storage;
pub mod analysis;
pub mod index;
pub mod scoring;
pub mod search;
pub mod writer;
pub mod compression;
pub mod library;

pub use crate::core::config::Config;
pub use crate::core::database::Database;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::stats::{ImportStats, IndexStats};
pub use crate::core::types::{Author, Book, BookFile, FileLocation};
pub use crate::inpx::collection::{Collection, CollectionInfo};
pub use crate::search::field::SearchField;
pub use crate::search::results::{SearchHits, SearchResult};
pub use crate::writer::importer::{import_collection, BookSink, ImportAborted, ImportOptions, Importer};

/*
┌──────────────────────────────────────── INGEST ─────────────────────────────────────────┐
│                                                                                          │
│  .inpx (zip) ──> Collection ──spawn──> reader thread ──bounded(128)──> BookStream        │
│                   │ collection.info      │ *.inp entries, archive order                  │
│                   │ version.info         │ line -> split 0x04 -> decode(FieldStructure)  │
│                   │ structure.info       │ stamp file.archive                            │
│                                                                                          │
│  BookStream ──> Importer ──(deleted filter, first-id-wins dedup)──> BatchWriter          │
│                                                           │ flush when len > batch_size  │
│                                                           v                              │
│                                                    Database::add_books                   │
│                                         ┌─────────────────┴──────────────────┐           │
│                                         v                                    v           │
│                              DocumentStore (docs/books.dat)   SearchIndex (index/...)    │
│                              append-only log, crc32, LZ4      segments + manifest        │
└──────────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────────── SERVE ──────────────────────────────────────────┐
│                                                                                          │
│  search_by_field(field, query, page, size)                                               │
│      Analyzer(lang) -> InvertedIndex (BM25 per field, tombstones) -> SearchField order   │
│      -> page of ids + total -> hydrate from DocumentStore (NotFound hits dropped)        │
│                                                                                          │
│  get_most_recent(count)                                                                  │
│      date index [today - 1y, today], newest first -> hydrate                             │
└──────────────────────────────────────────────────────────────────────────────────────────┘
*/
