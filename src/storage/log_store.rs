use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use parking_lot::Mutex;
use crate::compression::compress::{CompressedBlock, CompressionType};
use crate::core::error::{Error, Result};
use crate::core::types::Book;
use crate::storage::document_store::DocumentStore;

const MAGIC: &[u8; 4] = b"IXDS";
const VERSION: u32 = 1;
const HEADER_SIZE: u64 = 8;

/// Location of one stored value inside the log.
#[derive(Debug, Clone, Copy)]
struct RecordPointer {
    offset: u64,  // First byte of the value
    len: u32,
    checksum: u32,
}

/// Append-only record log with an in-memory key index.
///
/// File layout:
/// ```text
/// [magic "IXDS"][version u32]
/// [key_len u32][key][value_len u32][crc32 u32][value]   (repeated)
/// ```
/// `value` is an LZ4 [`CompressedBlock`] of the bincode-encoded [`Book`].
/// Later records for the same key shadow earlier ones.
pub struct LogDocumentStore {
    path: PathBuf,
    file: Mutex<File>,
    offsets: HashMap<String, RecordPointer>,
    end: u64,
    writable: bool,
}

impl LogDocumentStore {
    /// Opens the log at `path` for writing, creating an empty one when absent.
    /// A torn record at the tail is cut off.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let mut file = File::create(path).map_err(|e| Error::write_failure(e.to_string()))?;
            file.write_all(MAGIC)?;
            file.write_all(&VERSION.to_le_bytes())?;
            file.sync_all()?;
            tracing::info!("created document store at {}", path.display());
        }
        Self::open_with(path, true)
    }

    /// Opens an existing log for reading only. A torn tail is ignored and
    /// left on disk for the next writer to cut off.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path.as_ref(), false)
    }

    fn open_with(path: &Path, writable: bool) -> Result<Self> {
        let path = path.to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(&path)
            .map_err(|e| Error::read_failure(format!("{}: {}", path.display(), e)))?;

        let file_len = file.metadata()?.len();
        let (offsets, end) = {
            let mut reader = BufReader::new(&file);
            read_header(&mut reader, &path)?;
            scan_records(&mut reader, file_len)?
        };

        if end < file_len {
            if writable {
                tracing::warn!(
                    "document store {} has a torn tail; truncating {} bytes",
                    path.display(),
                    file_len - end
                );
                file.set_len(end)?;
            } else {
                tracing::warn!(
                    "document store {} has a torn tail of {} bytes",
                    path.display(),
                    file_len - end
                );
            }
        }

        tracing::info!("opened document store {} with {} books", path.display(), offsets.len());

        Ok(LogDocumentStore {
            path,
            file: Mutex::new(file),
            offsets,
            end,
            writable,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_header(reader: &mut impl Read, path: &Path) -> Result<()> {
    let mut magic = [0u8; 4];
    let mut version = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .and_then(|_| reader.read_exact(&mut version))
        .map_err(|_| Error::read_failure(format!("{}: missing header", path.display())))?;

    if &magic != MAGIC {
        return Err(Error::read_failure(format!("{}: not a document store", path.display())));
    }
    let version = u32::from_le_bytes(version);
    if version != VERSION {
        return Err(Error::read_failure(format!(
            "{}: unsupported version {}",
            path.display(),
            version
        )));
    }
    Ok(())
}

/// Walks all complete records. Returns the key table and the end of the
/// last complete record.
fn scan_records(
    reader: &mut impl Read,
    file_len: u64,
) -> Result<(HashMap<String, RecordPointer>, u64)> {
    let mut offsets = HashMap::new();
    let mut pos = HEADER_SIZE;

    loop {
        let mut len_buf = [0u8; 4];
        match reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let key_len = u32::from_le_bytes(len_buf) as u64;

        // key + value_len + crc must fit before we allocate
        if pos + 4 + key_len + 8 > file_len {
            break;
        }
        let mut key = vec![0u8; key_len as usize];
        reader.read_exact(&mut key)?;

        let mut value_len = [0u8; 4];
        let mut checksum = [0u8; 4];
        reader.read_exact(&mut value_len)?;
        reader.read_exact(&mut checksum)?;
        let value_len = u32::from_le_bytes(value_len);

        let value_offset = pos + 4 + key_len + 8;
        if value_offset + value_len as u64 > file_len {
            break;
        }
        io::copy(&mut reader.by_ref().take(value_len as u64), &mut io::sink())?;

        let key = String::from_utf8_lossy(&key).into_owned();
        offsets.insert(
            key,
            RecordPointer {
                offset: value_offset,
                len: value_len,
                checksum: u32::from_le_bytes(checksum),
            },
        );
        pos = value_offset + value_len as u64;
    }

    Ok((offsets, pos))
}

impl DocumentStore for LogDocumentStore {
    fn put_books(&mut self, books: &[Book], partial: bool) -> Result<Vec<bool>> {
        if !self.writable {
            return Err(Error::write_failure(format!("{} is open read-only", self.path.display())));
        }

        let mut buffer = Vec::new();
        let mut pending: HashMap<&str, RecordPointer> = HashMap::new();
        let mut written = Vec::with_capacity(books.len());

        for book in books {
            let id = book.id.as_str();
            if partial && (self.offsets.contains_key(id) || pending.contains_key(id)) {
                written.push(false);
                continue;
            }

            let value = CompressedBlock::encode(book, CompressionType::LZ4)
                .map_err(|e| Error::write_failure(format!("book {}: {}", id, e)))?;
            let checksum = crc32fast::hash(&value);

            buffer.extend_from_slice(&(id.len() as u32).to_le_bytes());
            buffer.extend_from_slice(id.as_bytes());
            buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
            buffer.extend_from_slice(&checksum.to_le_bytes());
            let offset = self.end + buffer.len() as u64;
            buffer.extend_from_slice(&value);

            pending.insert(id, RecordPointer { offset, len: value.len() as u32, checksum });
            written.push(true);
        }

        if buffer.is_empty() {
            return Ok(written);
        }

        {
            let file = self.file.get_mut();
            file.seek(SeekFrom::Start(self.end))
                .and_then(|_| file.write_all(&buffer))
                .and_then(|_| file.sync_data())
                .map_err(|e| Error::write_failure(format!("{}: {}", self.path.display(), e)))?;
        }

        self.end += buffer.len() as u64;
        for (id, pointer) in pending {
            self.offsets.insert(id.to_string(), pointer);
        }

        Ok(written)
    }

    fn get_book(&self, id: &str) -> Result<Book> {
        let pointer = self
            .offsets
            .get(id)
            .copied()
            .ok_or_else(|| Error::not_found(format!("book {}", id)))?;

        let mut value = vec![0u8; pointer.len as usize];
        {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(pointer.offset))
                .and_then(|_| file.read_exact(&mut value))
                .map_err(|e| Error::read_failure(format!("book {}: {}", id, e)))?;
        }

        if crc32fast::hash(&value) != pointer.checksum {
            return Err(Error::read_failure(format!("book {}: checksum mismatch", id)));
        }

        CompressedBlock::decode(&value)
            .map_err(|e| Error::read_failure(format!("book {}: {}", id, e)))
    }

    fn contains(&self, id: &str) -> bool {
        self.offsets.contains_key(id)
    }

    fn len(&self) -> usize {
        self.offsets.len()
    }

    fn sync(&mut self) -> Result<()> {
        if self.writable {
            self.file.get_mut().sync_all()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.sync()
            .map_err(|e| Error::write_failure(format!("closing {}: {}", self.path.display(), e)))
    }
}
