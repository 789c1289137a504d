use serde::{Serialize, Deserialize};
use chrono::NaiveDate;

/// Author names as they appear in a record: `last,first,middle`.
/// Empty strings stand for absent parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
}

impl Author {
    pub fn new(last_name: &str, first_name: &str, middle_name: &str) -> Self {
        Author {
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            middle_name: middle_name.to_string(),
        }
    }

    /// "First Middle Last", or the last name alone when nothing else is known.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Where the bytes of a book live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLocation<'a> {
    /// Plain directory below the library root.
    Folder(&'a str),
    /// Nested container named after the record file it was listed in.
    Archive(&'a str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFile {
    pub name: String,
    pub ext: String,
    pub size: u64,
    pub folder: String,
    pub archive: String,
}

impl BookFile {
    pub fn location(&self) -> FileLocation<'_> {
        if self.folder.is_empty() {
            FileLocation::Archive(&self.archive)
        } else {
            FileLocation::Folder(&self.folder)
        }
    }

    pub fn is_archived(&self) -> bool {
        matches!(self.location(), FileLocation::Archive(_))
    }
}

/// Canonical book record, keyed by `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub authors: Vec<Author>,
    pub genres: Vec<String>,
    pub series: String,
    pub series_no: i32,
    pub file: BookFile,
    pub published: Option<NaiveDate>,
    pub deleted: bool,
    pub language: String,
    pub rating: String,
    pub keywords: String,
    pub insertion_no: String,
}

impl Book {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Book {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}
