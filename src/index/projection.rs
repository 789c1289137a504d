use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::core::types::Book;

/// Series markers some libraries append to a series name.
const SERIES_SUFFIXES: [&str; 3] = ["[a]", "[p]", "[m]"];

/// Denormalized view of a [`Book`] carrying only what the search index needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedBook {
    pub id: String,
    pub title: String,
    pub authors: String,   // Comma-joined full names
    pub series: String,
    pub series_no: i32,
    pub published: Option<NaiveDate>,
}

impl From<&Book> for IndexedBook {
    fn from(book: &Book) -> Self {
        let authors = book
            .authors
            .iter()
            .map(|author| author.full_name())
            .collect::<Vec<_>>()
            .join(",");

        IndexedBook {
            id: book.id.clone(),
            title: book.title.clone(),
            authors,
            series: trim_series_markers(&book.series).to_string(),
            series_no: book.series_no,
            published: book.published,
        }
    }
}

/// Strips the `[a]`, `[p]` and `[m]` markers (each at most once, in that order)
/// and any whitespace left before them.
pub fn trim_series_markers(series: &str) -> &str {
    let mut trimmed = series;
    for suffix in SERIES_SUFFIXES {
        trimmed = trimmed.strip_suffix(suffix).unwrap_or(trimmed);
    }
    trimmed.trim_end()
}
