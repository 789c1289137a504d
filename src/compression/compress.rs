use crate::core::error::{Error, ErrorKind, Result};
use serde::{Serialize, Deserialize};

/// Compressed block storage for stored records and index segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedBlock {
    pub data: Vec<u8>,
    pub original_size: usize,
    pub compression: CompressionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionType {
    None,
    LZ4,      // Fast compression (~500 MB/s), ratio 2-3x
}

impl CompressedBlock {
    pub fn compress(data: &[u8], compression: CompressionType) -> Self {
        let compressed = match compression {
            CompressionType::None => data.to_vec(),
            CompressionType::LZ4 => lz4_flex::block::compress(data),
        };

        CompressedBlock {
            data: compressed,
            original_size: data.len(),
            compression,
        }
    }

    pub fn decompress(&self) -> Result<Vec<u8>> {
        match self.compression {
            CompressionType::None => Ok(self.data.clone()),

            CompressionType::LZ4 => {
                lz4_flex::block::decompress(&self.data, self.original_size)
                    .map_err(|e| Error::new(ErrorKind::Parse, e.to_string()))
            }
        }
    }

    /// Serializes `value` with bincode and compresses the bytes.
    pub fn encode<T: Serialize>(value: &T, compression: CompressionType) -> Result<Vec<u8>> {
        let raw = bincode::serialize(value)?;
        let block = Self::compress(&raw, compression);
        Ok(bincode::serialize(&block)?)
    }

    /// Inverse of [`CompressedBlock::encode`].
    pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
        let block: CompressedBlock = bincode::deserialize(bytes)?;
        let raw = block.decompress()?;
        Ok(bincode::deserialize(&raw)?)
    }
}
