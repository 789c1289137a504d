use chrono::NaiveDate;
use serde::Serialize;
use crate::index::posting::DocOrd;

/// One page of matches plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<T> {
    pub total: u64,
    pub hits: Vec<T>,
}

/// Search phase result: ordered book ids.
pub type SearchHits = SearchResult<String>;

impl<T> SearchResult<T> {
    pub fn empty() -> Self {
        SearchResult { total: 0, hits: Vec::new() }
    }

    /// Whether another page follows `page` (zero-based).
    pub fn has_next(&self, page: usize, page_size: usize) -> bool {
        ((page as u64) + 1) * (page_size as u64) < self.total
    }

    pub fn total_pages(&self, page_size: usize) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.total.div_ceil(page_size as u64)
    }
}

/// A live match with the keys its field's ordering needs.
#[derive(Debug, Clone)]
pub struct RankedHit<'a> {
    pub ord: DocOrd,
    pub score: f32,
    pub published: Option<NaiveDate>,
    pub series_key: &'a str,
    pub series_no: i32,
}
