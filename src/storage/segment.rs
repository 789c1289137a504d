use std::fs::{self, File};
use std::io::Write;
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::compression::compress::{CompressedBlock, CompressionType};
use crate::core::error::{Error, Result};
use crate::storage::layout::StorageLayout;

/// Unique segment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub Uuid);

impl SegmentId {
    pub fn new() -> Self {
        SegmentId(Uuid::new_v4())
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

/// One immutable batch of indexed entries on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub doc_count: u32,
}

/// Segment file header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentHeader {
    pub version: u32,     // Format version
    pub doc_count: u32,   // Number of entries
    pub checksum: u32,    // CRC32 of the payload
}

impl SegmentHeader {
    pub const VERSION: u32 = 1;
}

// [ header_len u32 ][ HEADER (bincode) ][ PAYLOAD (CompressedBlock of Vec<T>) ]

/// Writes `entries` as a new segment file and returns its descriptor.
pub fn write_segment<T: Serialize>(storage: &StorageLayout, entries: &[T]) -> Result<Segment> {
    let id = SegmentId::new();
    let payload = CompressedBlock::encode(&entries, CompressionType::LZ4)?;

    let header = SegmentHeader {
        version: SegmentHeader::VERSION,
        doc_count: entries.len() as u32,
        checksum: crc32fast::hash(&payload),
    };
    let header_data = bincode::serialize(&header)?;

    let path = storage.segment_path(&id);
    let mut file = File::create(&path)?;
    file.write_all(&(header_data.len() as u32).to_le_bytes())?;
    file.write_all(&header_data)?;
    file.write_all(&payload)?;
    file.sync_all()?;

    Ok(Segment {
        id,
        doc_count: header.doc_count,
    })
}

/// Loads every entry of a segment, verifying its checksum.
pub fn read_segment<T: for<'de> Deserialize<'de>>(storage: &StorageLayout, id: &SegmentId) -> Result<Vec<T>> {
    let path = storage.segment_path(id);
    let data = fs::read(&path)
        .map_err(|e| Error::read_failure(format!("segment {}: {}", path.display(), e)))?;

    let corrupt = || Error::read_failure(format!("segment {} is corrupt", path.display()));

    if data.len() < 4 {
        return Err(corrupt());
    }
    let header_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let body = data.get(4..4 + header_len).ok_or_else(corrupt)?;
    let header: SegmentHeader = bincode::deserialize(body).map_err(|_| corrupt())?;

    let payload = &data[4 + header_len..];
    if header.version != SegmentHeader::VERSION || crc32fast::hash(payload) != header.checksum {
        return Err(corrupt());
    }

    let entries: Vec<T> = CompressedBlock::decode(payload).map_err(|_| corrupt())?;
    if entries.len() != header.doc_count as usize {
        return Err(corrupt());
    }
    Ok(entries)
}
