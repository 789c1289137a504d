use std::collections::HashSet;
use std::fmt;
use std::time::Instant;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::stats::ImportStats;
use crate::core::types::Book;
use crate::inpx::collection::Collection;
use crate::writer::batch::BatchWriter;

/// Destination of imported batches.
pub trait BookSink {
    fn add_books(&mut self, books: &[Book], partial: bool) -> Result<()>;
}

impl<S: BookSink + ?Sized> BookSink for &mut S {
    fn add_books(&mut self, books: &[Book], partial: bool) -> Result<()> {
        (**self).add_books(books, partial)
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub keep_deleted: bool,  // Import records flagged as deleted
    pub partial: bool,       // Leave ids already in the store untouched
    pub batch_size: usize,   // Flush once a batch grows past this
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            keep_deleted: false,
            partial: false,
            batch_size: Config::default().batch_size,
        }
    }
}

/// Filters, de-duplicates and batches a sequence of books into a sink.
pub struct Importer<S: BookSink> {
    sink: S,
    options: ImportOptions,
    stats: ImportStats,
}

impl<S: BookSink> Importer<S> {
    pub fn new(sink: S, options: ImportOptions) -> Self {
        Importer {
            sink,
            options,
            stats: ImportStats::default(),
        }
    }

    /// Consumes `books` in order. A sink error aborts the run at once;
    /// the counters keep what happened up to that point.
    pub fn run(&mut self, books: impl IntoIterator<Item = Book>) -> Result<()> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut batch = BatchWriter::new(&mut self.sink, self.options.batch_size, self.options.partial);

        for book in books {
            self.stats.processed += 1;

            if book.deleted && !self.options.keep_deleted {
                self.stats.deleted_skipped += 1;
                continue;
            }

            // First occurrence wins
            if !seen.insert(book.id.clone()) {
                self.stats.duplicates += 1;
                continue;
            }

            self.stats.imported += batch.push(book)? as u64;
        }

        self.stats.imported += batch.flush()? as u64;
        Ok(())
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// An import that stopped early, with the counters reached before it did.
#[derive(Debug, Clone)]
pub struct ImportAborted {
    pub stats: ImportStats,
    pub error: Error,
}

impl fmt::Display for ImportAborted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (after {} records: {} imported, {} duplicates, {} deleted skipped)",
            self.error,
            self.stats.processed,
            self.stats.imported,
            self.stats.duplicates,
            self.stats.deleted_skipped
        )
    }
}

impl std::error::Error for ImportAborted {}

impl From<ImportAborted> for Error {
    fn from(aborted: ImportAborted) -> Self {
        aborted.error
    }
}

/// Streams every record of `collection` into `sink` and reports the counters.
/// A stream error is returned after the books read before it were stored,
/// together with the counters reached so far.
pub fn import_collection<S: BookSink>(
    collection: &mut Collection,
    sink: S,
    options: ImportOptions,
) -> std::result::Result<ImportStats, ImportAborted> {
    let start = Instant::now();
    let mut stream = collection.stream().map_err(|error| ImportAborted {
        stats: ImportStats::default(),
        error,
    })?;
    let mut importer = Importer::new(sink, options);

    let outcome = importer.run(&mut stream).and_then(|_| stream.finish());
    let stats = *importer.stats();
    if let Err(error) = outcome {
        let aborted = ImportAborted { stats, error };
        tracing::warn!("import aborted: {}", aborted);
        return Err(aborted);
    }

    tracing::info!(
        "imported {} of {} books from {} ({} duplicates, {} deleted skipped) in {:?}",
        stats.imported,
        stats.processed,
        collection.metadata().name,
        stats.duplicates,
        stats.deleted_skipped,
        start.elapsed()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{Error, ErrorKind};

    #[derive(Default)]
    struct Recorder {
        batches: Vec<Vec<String>>,
        fail_on_batch: Option<usize>,
    }

    impl BookSink for Recorder {
        fn add_books(&mut self, books: &[Book], _partial: bool) -> Result<()> {
            if self.fail_on_batch == Some(self.batches.len()) {
                return Err(Error::write_failure("disk full"));
            }
            self.batches.push(books.iter().map(|b| b.id.clone()).collect());
            Ok(())
        }
    }

    fn deleted(id: &str) -> Book {
        let mut book = Book::new(id, "gone");
        book.deleted = true;
        book
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut sink = Recorder::default();
        let mut importer = Importer::new(&mut sink, ImportOptions::default());
        let mut second = Book::new("1", "second copy");
        second.series = "x".to_string();

        importer
            .run(vec![Book::new("1", "first copy"), Book::new("2", "other"), second])
            .unwrap();

        let stats = *importer.stats();
        assert_eq!(stats, ImportStats { processed: 3, imported: 2, duplicates: 1, deleted_skipped: 0 });
        assert_eq!(sink.batches, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_deleted_filter_runs_before_dedup() {
        let mut sink = Recorder::default();
        let mut importer = Importer::new(&mut sink, ImportOptions::default());
        importer.run(vec![deleted("1"), Book::new("1", "live")]).unwrap();
        assert_eq!(
            *importer.stats(),
            ImportStats { processed: 2, imported: 1, duplicates: 0, deleted_skipped: 1 }
        );

        let options = ImportOptions { keep_deleted: true, ..Default::default() };
        let mut importer = Importer::new(Recorder::default(), options);
        importer.run(vec![deleted("1"), Book::new("1", "live")]).unwrap();
        assert_eq!(
            *importer.stats(),
            ImportStats { processed: 2, imported: 1, duplicates: 1, deleted_skipped: 0 }
        );
    }

    #[test]
    fn test_sink_failure_aborts_with_partial_counts() {
        let sink = Recorder { fail_on_batch: Some(1), ..Default::default() };
        let options = ImportOptions { batch_size: 2, ..Default::default() };
        let mut importer = Importer::new(sink, options);

        let books = (0..10).map(|i| Book::new(i.to_string(), "t"));
        let err = importer.run(books).unwrap_err();

        assert_eq!(err.kind, ErrorKind::StoreWriteFailure);
        assert_eq!(importer.stats().processed, 6);
        assert_eq!(importer.stats().imported, 3);
        assert_eq!(importer.into_sink().batches.len(), 1);
    }
}
