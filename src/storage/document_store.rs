use std::collections::HashMap;
use crate::core::error::{Error, Result};
use crate::core::types::Book;

/// Key-value persistence of canonical book records, keyed by `Book::id`.
pub trait DocumentStore: Send + Sync {
    /// Stores a batch. Returns one flag per input book telling whether it was
    /// written; with `partial` set, ids already present are left untouched.
    fn put_books(&mut self, books: &[Book], partial: bool) -> Result<Vec<bool>>;

    /// Fetches one record. `NotFound` when the id is unknown.
    fn get_book(&self, id: &str) -> Result<Book>;

    fn contains(&self, id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sync(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// Volatile backend, useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    books: HashMap<String, Book>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn put_books(&mut self, books: &[Book], partial: bool) -> Result<Vec<bool>> {
        let mut written = Vec::with_capacity(books.len());
        for book in books {
            if partial && self.books.contains_key(&book.id) {
                written.push(false);
                continue;
            }
            self.books.insert(book.id.clone(), book.clone());
            written.push(true);
        }
        Ok(written)
    }

    fn get_book(&self, id: &str) -> Result<Book> {
        self.books
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("book {}", id)))
    }

    fn contains(&self, id: &str) -> bool {
        self.books.contains_key(id)
    }

    fn len(&self) -> usize {
        self.books.len()
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
