use std::time::Instant;
use chrono::NaiveDate;
use rayon::prelude::*;
use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, Result};
use crate::index::inverted::{AnalyzedBook, IndexedField, InvertedIndex};
use crate::index::projection::IndexedBook;
use crate::search::field::SearchField;
use crate::search::results::SearchHits;
use crate::storage::checkpoint::Checkpoint;
use crate::storage::layout::StorageLayout;
use crate::storage::segment::{read_segment, write_segment, SegmentId};

/// Full-text search over book projections.
pub trait SearchIndex: Send + Sync {
    fn index_books(&mut self, books: &[IndexedBook]) -> Result<()>;

    /// Ordered ids of one page plus the total match count.
    fn search_by_field(&self, field: SearchField, query: &str, page: usize, page_size: usize) -> Result<SearchHits>;

    /// Ids published within `[from, to]`, newest first, at most `count`.
    fn most_recent(&self, from: NaiveDate, to: NaiveDate, count: usize) -> Result<Vec<String>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn close(&mut self) -> Result<()>;
}

struct SegmentStore {
    layout: StorageLayout,
    checkpoint: Checkpoint,
}

/// Search index made of immutable on-disk segments, one per indexed batch,
/// replayed into an [`InvertedIndex`] when opened.
pub struct SegmentedSearchIndex {
    analyzer: Analyzer,
    index: InvertedIndex,
    store: Option<SegmentStore>,
}

impl SegmentedSearchIndex {
    /// Index that lives only in memory.
    pub fn in_memory(language: &str) -> Self {
        SegmentedSearchIndex {
            analyzer: Analyzer::for_language(language),
            index: InvertedIndex::new(),
            store: None,
        }
    }

    /// Opens the index under `layout`, or starts an empty one analyzed for
    /// `language`. An existing index keeps the language it was built with.
    pub fn create(layout: &StorageLayout, language: &str) -> Result<Self> {
        if Checkpoint::load(layout)?.is_some() {
            return Self::open(layout);
        }

        let mut checkpoint = Checkpoint::new(language);
        checkpoint
            .save(layout)
            .map_err(|e| Error::write_failure(format!("creating search index: {}", e)))?;
        tracing::info!("created search index at {} ({})", layout.index_dir.display(), language);

        Ok(SegmentedSearchIndex {
            analyzer: Analyzer::for_language(language),
            index: InvertedIndex::new(),
            store: Some(SegmentStore { layout: layout.clone(), checkpoint }),
        })
    }

    pub fn open(layout: &StorageLayout) -> Result<Self> {
        let start = Instant::now();
        let checkpoint = Checkpoint::load(layout)?.ok_or_else(|| {
            Error::read_failure(format!("no search index at {}", layout.index_dir.display()))
        })?;

        let segments: Vec<Vec<IndexedBook>> = checkpoint
            .segments
            .par_iter()
            .map(|id| read_segment(layout, id))
            .collect::<Result<_>>()?;

        let mut index = SegmentedSearchIndex {
            analyzer: Analyzer::for_language(&checkpoint.language),
            index: InvertedIndex::new(),
            store: None,
        };
        for books in &segments {
            index.apply(books);
        }

        tracing::info!(
            "opened search index at {}: {} segments, {} books in {:?}",
            layout.index_dir.display(),
            checkpoint.segments.len(),
            index.len(),
            start.elapsed()
        );

        index.store = Some(SegmentStore { layout: layout.clone(), checkpoint });
        Ok(index)
    }

    pub fn language(&self) -> &'static str {
        self.analyzer.language.code()
    }

    pub fn segment_ids(&self) -> &[SegmentId] {
        self.store.as_ref().map(|s| s.checkpoint.segments.as_slice()).unwrap_or(&[])
    }

    fn analyze(&self, book: &IndexedBook) -> AnalyzedBook {
        let mut analyzed = AnalyzedBook::default();
        analyzed.fields[IndexedField::Title as usize] = self.analyzer.terms(&book.title);
        analyzed.fields[IndexedField::Authors as usize] = self.analyzer.terms(&book.authors);
        analyzed.fields[IndexedField::Series as usize] = self.analyzer.terms(&book.series);
        analyzed
    }

    /// Analyzes a batch in parallel, then inserts it in order.
    fn apply(&mut self, books: &[IndexedBook]) {
        let analyzed: Vec<AnalyzedBook> = books.par_iter().map(|book| self.analyze(book)).collect();
        for (book, terms) in books.iter().zip(&analyzed) {
            self.index.add_document(book, terms);
        }
    }
}

impl SearchIndex for SegmentedSearchIndex {
    fn index_books(&mut self, books: &[IndexedBook]) -> Result<()> {
        if books.is_empty() {
            return Ok(());
        }

        if let Some(store) = self.store.as_mut() {
            let segment = write_segment(&store.layout, books)
                .map_err(|e| Error::write_failure(format!("writing index segment: {}", e)))?;
            store.checkpoint.segments.push(segment.id);
            store.checkpoint.doc_count += books.len();
            store
                .checkpoint
                .save(&store.layout)
                .map_err(|e| Error::write_failure(format!("updating index manifest: {}", e)))?;
            tracing::debug!("wrote segment {} with {} books", segment.id.0, segment.doc_count);
        }

        self.apply(books);
        Ok(())
    }

    fn search_by_field(&self, field: SearchField, query: &str, page: usize, page_size: usize) -> Result<SearchHits> {
        let terms = self.analyzer.terms(query);
        if terms.is_empty() {
            return Ok(SearchHits::empty());
        }

        let hits = self.index.search(field, &terms);
        let ids = hits
            .iter()
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .filter_map(|hit| self.index.doc(hit.ord))
            .map(|entry| entry.id.clone())
            .collect();

        Ok(SearchHits {
            total: hits.len() as u64,
            hits: ids,
        })
    }

    fn most_recent(&self, from: NaiveDate, to: NaiveDate, count: usize) -> Result<Vec<String>> {
        Ok(self
            .index
            .date_range(from, to)
            .take(count)
            .filter_map(|ord| self.index.doc(ord))
            .map(|entry| entry.id.clone())
            .collect())
    }

    fn len(&self) -> usize {
        self.index.live_count()
    }

    fn close(&mut self) -> Result<()> {
        if let Some(store) = self.store.as_mut() {
            store
                .checkpoint
                .save(&store.layout)
                .map_err(|e| Error::write_failure(format!("closing search index: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str, authors: &str, series: &str, series_no: i32, published: Option<NaiveDate>) -> IndexedBook {
        IndexedBook {
            id: id.to_string(),
            title: title.to_string(),
            authors: authors.to_string(),
            series: series.to_string(),
            series_no,
            published,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_fields_are_searched_separately() {
        let mut index = SegmentedSearchIndex::in_memory("en");
        index
            .index_books(&[
                book("1", "Dune", "Frank Herbert", "Dune", 1, None),
                book("2", "Children of Dune", "Frank Herbert", "Dune", 3, None),
                book("3", "Herbert West", "H. P. Lovecraft", "", 0, None),
            ])
            .unwrap();

        let by_title = index.search_by_field(SearchField::Title, "herbert", 0, 10).unwrap();
        assert_eq!(by_title.hits, vec!["3"]);

        let by_author = index.search_by_field(SearchField::Authors, "herbert", 0, 10).unwrap();
        assert_eq!(by_author.total, 2);

        let anywhere = index.search_by_field(SearchField::All, "herbert", 0, 10).unwrap();
        assert_eq!(anywhere.total, 3);
    }

    #[test]
    fn test_series_ordering() {
        let mut index = SegmentedSearchIndex::in_memory("en");
        index
            .index_books(&[
                book("1", "Dune", "", "Dune", 1, None),
                book("2", "Dune Messiah", "", "Dune", 2, None),
                book("3", "Children of Dune", "", "Dune", 3, None),
            ])
            .unwrap();

        let result = index.search_by_field(SearchField::Series, "dune", 0, 10).unwrap();
        assert_eq!(result.hits, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_series_names_sort_ignoring_case() {
        let mut index = SegmentedSearchIndex::in_memory("en");
        index
            .index_books(&[
                book("1", "Nightfall", "", "Beta Saga", 1, None),
                book("2", "Daybreak", "", "alpha saga", 1, None),
                book("3", "Dusk", "", "Gamma Saga", 1, None),
            ])
            .unwrap();

        let result = index.search_by_field(SearchField::Series, "saga", 0, 10).unwrap();
        assert_eq!(result.hits, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_stop_words_only_query_matches_nothing() {
        let mut index = SegmentedSearchIndex::in_memory("en");
        index.index_books(&[book("1", "The Thing", "", "", 0, None)]).unwrap();

        let result = index.search_by_field(SearchField::All, "the", 0, 10).unwrap();
        assert_eq!(result, SearchHits::empty());
    }

    #[test]
    fn test_reopen_replays_segments() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path()).unwrap();

        let mut index = SegmentedSearchIndex::create(&layout, "ru").unwrap();
        index.index_books(&[book("1", "Война и мир", "Лев Толстой", "", 0, date(2020, 5, 1))]).unwrap();
        index.index_books(&[book("2", "Анна Каренина", "Лев Толстой", "", 0, date(2021, 5, 1))]).unwrap();
        index.close().unwrap();
        drop(index);

        let reopened = SegmentedSearchIndex::create(&layout, "en").unwrap();
        assert_eq!(reopened.language(), "ru");
        assert_eq!(reopened.segment_ids().len(), 2);
        assert_eq!(reopened.len(), 2);

        let result = reopened.search_by_field(SearchField::Title, "войны", 0, 10).unwrap();
        assert_eq!(result.hits, vec!["1"]);

        let recent = reopened
            .most_recent(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(), 10)
            .unwrap();
        assert_eq!(recent, vec!["2", "1"]);
    }

    #[test]
    fn test_open_without_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path()).unwrap();
        let err = SegmentedSearchIndex::open(&layout).err().unwrap();
        assert_eq!(err.kind, crate::core::error::ErrorKind::StoreReadFailure);
    }
}
