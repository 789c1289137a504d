use std::path::{Path, PathBuf};
use chrono::{Local, Months, NaiveDate};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::IndexStats;
use crate::core::types::Book;
use crate::index::projection::IndexedBook;
use crate::index::search_index::{SearchIndex, SegmentedSearchIndex};
use crate::search::field::SearchField;
use crate::search::results::SearchResult;
use crate::storage::document_store::DocumentStore;
use crate::storage::file_lock::FileLock;
use crate::storage::layout::StorageLayout;
use crate::storage::log_store::LogDocumentStore;
use crate::writer::importer::BookSink;

/// Keeps the document store and the search index of one index root in step.
///
/// Writes go to the document store first and then to the search index.
/// Queries run against the index and are hydrated from the document store.
pub struct Database {
    docs: Box<dyn DocumentStore>,
    index: Box<dyn SearchIndex>,
    path: Option<PathBuf>,
    _lock: Option<FileLock>,
}

impl Database {
    /// Opens the index root at `path` for writing, creating whatever is missing.
    /// An existing search index keeps the language it was built with.
    pub fn create(path: impl AsRef<Path>, language: &str) -> Result<Self> {
        let path = path.as_ref();
        let layout = StorageLayout::create(path)
            .map_err(|e| Error::write_failure(format!("creating index at {}: {}", path.display(), e)))?;
        let lock = FileLock::acquire(&layout, true)?;

        let docs = LogDocumentStore::create(layout.documents_path())?;
        let index = SegmentedSearchIndex::create(&layout, language)?;
        tracing::info!("index ready at {} ({} books)", path.display(), docs.len());

        Ok(Database {
            docs: Box::new(docs),
            index: Box::new(index),
            path: Some(path.to_path_buf()),
            _lock: Some(lock),
        })
    }

    /// Opens an existing index root. `StoreReadFailure` when nothing is there.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let layout = StorageLayout::at(path);
        if !layout.exists() {
            return Err(Error::read_failure(format!("no index at {}", path.display())));
        }
        let lock = FileLock::acquire(&layout, false)?;

        let docs = LogDocumentStore::open(layout.documents_path())?;
        let index = SegmentedSearchIndex::open(&layout)?;
        tracing::info!("opened index at {} ({} books)", path.display(), docs.len());

        Ok(Database {
            docs: Box::new(docs),
            index: Box::new(index),
            path: Some(path.to_path_buf()),
            _lock: Some(lock),
        })
    }

    /// Coordinator over caller-supplied backends.
    pub fn with_backends(docs: Box<dyn DocumentStore>, index: Box<dyn SearchIndex>) -> Self {
        Database {
            docs,
            index,
            path: None,
            _lock: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stores a batch. In partial mode ids already present are skipped and
    /// only the books actually written reach the search index. A failing
    /// index write leaves the documents in place.
    pub fn add_books(&mut self, books: &[Book], partial: bool) -> Result<()> {
        if books.is_empty() {
            return Ok(());
        }

        let written = self
            .docs
            .put_books(books, partial)
            .map_err(|e| e.with_kind(ErrorKind::StoreWriteFailure))?;

        let projections: Vec<IndexedBook> = books
            .iter()
            .zip(written)
            .filter(|(_, written)| *written)
            .map(|(book, _)| IndexedBook::from(book))
            .collect();

        self.index.index_books(&projections).map_err(|e| {
            Error::write_failure(format!(
                "search index rejected a batch of {} books already in the document store: {}",
                projections.len(),
                e.context
            ))
        })
    }

    pub fn get_by_id(&self, id: &str) -> Result<Book> {
        self.docs.get_book(id)
    }

    /// One page of books matching `query` in `field`. Hits missing from the
    /// document store are dropped; `total` still counts them.
    pub fn search_by_field(
        &self,
        field: SearchField,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> Result<SearchResult<Book>> {
        let hits = self.index.search_by_field(field, query, page, page_size)?;
        let books = self.hydrate(&hits.hits)?;

        Ok(SearchResult {
            total: hits.total,
            hits: books,
        })
    }

    /// Up to `count` books published during the last year, newest first.
    pub fn get_most_recent(&self, count: usize) -> Result<Vec<Book>> {
        self.get_most_recent_at(Local::now().date_naive(), count)
    }

    /// Same as [`Database::get_most_recent`] with an explicit "today".
    pub fn get_most_recent_at(&self, today: NaiveDate, count: usize) -> Result<Vec<Book>> {
        let from = today.checked_sub_months(Months::new(12)).unwrap_or(NaiveDate::MIN);
        let ids = self.index.most_recent(from, today, count)?;
        self.hydrate(&ids)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.docs.len(),
            indexed: self.index.len(),
        }
    }

    /// Closes the search index, then the document store. Both are always
    /// attempted; the first error is returned.
    pub fn close(mut self) -> Result<()> {
        let index_result = self.index.close();
        let docs_result = self.docs.close();

        if let Some(path) = &self.path {
            tracing::info!("closed index at {}", path.display());
        }

        match (index_result, docs_result) {
            (Err(e), Err(other)) => {
                tracing::warn!("document store also failed to close: {}", other);
                Err(e)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    fn hydrate(&self, ids: &[String]) -> Result<Vec<Book>> {
        let mut books = Vec::with_capacity(ids.len());
        for id in ids {
            match self.docs.get_book(id) {
                Ok(book) => books.push(book),
                Err(e) if e.is_not_found() => {
                    tracing::debug!("dropping hit {}: not in the document store", id);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(books)
    }
}

impl BookSink for Database {
    fn add_books(&mut self, books: &[Book], partial: bool) -> Result<()> {
        Database::add_books(self, books, partial)
    }
}
