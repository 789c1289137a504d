use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use zip::ZipArchive;
use zip::result::ZipError;
use crate::core::error::{Error, ErrorKind, Result};
use crate::inpx::field::FieldStructure;
use crate::inpx::stream::BookStream;

pub const COLLECTION_INFO: &str = "collection.info";
pub const VERSION_INFO: &str = "version.info";
pub const STRUCTURE_INFO: &str = "structure.info";

/// Suffix of the per-sub-archive record files.
pub const RECORD_SUFFIX: &str = ".inp";

/// Default number of decoded records buffered between reader and consumer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// Collection-level metadata from the control entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub id: i64,
    pub comment: String,
    pub version: String,
}

/// An opened collection archive.
///
/// Records are streamed once per open: `stream()` hands the archive to a reader
/// thread, and a fresh `open` is needed to read the records again.
pub struct Collection {
    pub path: PathBuf,
    archive: Option<ZipArchive<File>>,
    info: CollectionInfo,
    structure: FieldStructure,
    queue_capacity: usize,
    error: Arc<Mutex<Option<Error>>>,
}

impl Collection {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| {
            Error::collection_unreadable(format!("error opening archive {}: {}", path.display(), e))
        })?;
        let mut archive = ZipArchive::new(file)?;

        let collection_text = read_entry(&mut archive, COLLECTION_INFO)?
            .ok_or_else(|| Error::collection_unreadable(format!("{} not found", COLLECTION_INFO)))?;
        let mut info = parse_collection_info(&collection_text)?;

        let version_text = read_entry(&mut archive, VERSION_INFO)?
            .ok_or_else(|| Error::collection_unreadable(format!("{} not found", VERSION_INFO)))?;
        info.version = first_clean_line(&version_text);

        // Optional; older collections rely on the default layout.
        let structure = match read_entry(&mut archive, STRUCTURE_INFO) {
            Ok(Some(text)) => FieldStructure::parse(&first_clean_line(&text)),
            Ok(None) => FieldStructure::default(),
            Err(e) => {
                tracing::warn!("unreadable {}, using default structure: {}", STRUCTURE_INFO, e);
                FieldStructure::default()
            }
        };

        tracing::info!(
            "opened collection '{}' (id {}, version {}, {} fields per record)",
            info.name,
            info.id,
            info.version,
            structure.len()
        );

        Ok(Collection {
            path,
            archive: Some(archive),
            info,
            structure,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            error: Arc::new(Mutex::new(None)),
        })
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn metadata(&self) -> &CollectionInfo {
        &self.info
    }

    pub fn structure(&self) -> &FieldStructure {
        &self.structure
    }

    /// Starts the reader thread. Fails if the records were already streamed.
    pub fn stream(&mut self) -> Result<BookStream> {
        let archive = self.archive.take().ok_or_else(|| {
            Error::new(ErrorKind::InvalidState, "collection is already being streamed".to_string())
        })?;

        Ok(BookStream::spawn(
            archive,
            self.structure.clone(),
            self.queue_capacity,
            self.error.clone(),
        ))
    }

    /// Error that aborted the stream, if any.
    pub fn last_error(&self) -> Option<Error> {
        self.error.lock().clone()
    }

    pub fn close(self) {}
}

/// Reads a whole control entry, `None` when the archive lacks it.
fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .map_err(|e| Error::collection_unreadable(format!("error reading {}: {}", name, e)))?;

    Ok(Some(String::from_utf8_lossy(&data).into_owned()))
}

/// Trims whitespace and byte-order marks.
pub fn clean(value: &str) -> String {
    value
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_string()
}

fn first_clean_line(text: &str) -> String {
    text.lines().next().map(clean).unwrap_or_default()
}

/// `collection.info` layout: name, source file name, numeric id, comment.
/// Collections without the file name line carry the id on the second line.
pub fn parse_collection_info(text: &str) -> Result<CollectionInfo> {
    let lines: Vec<&str> = text.lines().collect();
    let name = lines
        .first()
        .map(|line| clean(line))
        .ok_or_else(|| Error::collection_unreadable(format!("{} is empty", COLLECTION_INFO)))?;

    let (id_line, id) = [2, 1]
        .into_iter()
        .find_map(|idx| {
            let line = lines.get(idx)?;
            let token = clean(line);
            let token = token.split_whitespace().next()?;
            token.parse::<i64>().ok().map(|id| (idx, id))
        })
        .ok_or_else(|| {
            Error::collection_unreadable(format!("{} has no collection id", COLLECTION_INFO))
        })?;

    let comment = lines.get(id_line + 1).map(|line| clean(line)).unwrap_or_default();

    Ok(CollectionInfo {
        name,
        id,
        comment,
        version: String::new(),
    })
}
