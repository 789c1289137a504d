use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Book, FileLocation};

/// Where the bytes of a book can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookSource {
    File(PathBuf),
    ArchiveEntry { archive: PathBuf, entry: String },
}

/// Resolves books to files below a library root.
#[derive(Debug, Clone)]
pub struct BookFetcher {
    library_path: PathBuf,
}

impl BookFetcher {
    pub fn new(library_path: impl Into<PathBuf>) -> Self {
        BookFetcher {
            library_path: library_path.into(),
        }
    }

    pub fn resolve(&self, book: &Book) -> BookSource {
        match book.file.location() {
            FileLocation::Folder(folder) => {
                let mut path = self.library_path.clone();
                path.extend(folder.split(['/', '\\']).filter(|part| !part.is_empty()));
                path.push(&book.file.name);
                BookSource::File(path)
            }
            FileLocation::Archive(archive) => BookSource::ArchiveEntry {
                archive: self.library_path.join(format!("{}.zip", archive)),
                entry: Self::file_name(book),
            },
        }
    }

    /// Name the book is stored under: the bare file name in a folder,
    /// `<name>.<ext>` inside a sub-archive.
    pub fn file_name(book: &Book) -> String {
        if book.file.is_archived() {
            format!("{}.{}", book.file.name, book.file.ext)
        } else {
            book.file.name.clone()
        }
    }

    /// Reads the whole file. `NotFound` when the file or entry is missing.
    pub fn read(&self, book: &Book) -> Result<Vec<u8>> {
        match self.resolve(book) {
            BookSource::File(path) => fs::read(&path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    Error::not_found(format!("{} (book {})", path.display(), book.id))
                }
                _ => Error::from(e),
            }),
            BookSource::ArchiveEntry { archive, entry } => read_entry(&archive, &entry, &book.id),
        }
    }
}

fn read_entry(archive_path: &Path, entry: &str, id: &str) -> Result<Vec<u8>> {
    let file = File::open(archive_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            Error::not_found(format!("archive {} (book {})", archive_path.display(), id))
        }
        _ => Error::from(e),
    })?;

    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::new(ErrorKind::Io, format!("{}: {}", archive_path.display(), e)))?;

    let mut content = match archive.by_name(entry) {
        Ok(content) => content,
        Err(ZipError::FileNotFound) => {
            tracing::warn!("{} not found in {} (book {})", entry, archive_path.display(), id);
            return Err(Error::not_found(format!("{} in {}", entry, archive_path.display())));
        }
        Err(e) => {
            return Err(Error::new(ErrorKind::Io, format!("{}: {}", archive_path.display(), e)))
        }
    };

    let mut data = Vec::with_capacity(content.size() as usize);
    content.read_to_end(&mut data)?;
    Ok(data)
}
