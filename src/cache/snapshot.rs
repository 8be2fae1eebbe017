//! On-disk cache snapshots.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic "LXQC" | version: u32 | crc32 of body: u32 | body length: u64 | body
//! ```
//!
//! The body is the bincode encoding of the backend address and the entries.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::error::{LexpandError, Result};

use super::performance::{CacheKey, Performance};

const MAGIC: &[u8; 4] = b"LXQC";
const VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct Snapshot {
    pub host: String,
    pub port: u16,
    pub entries: Vec<(CacheKey, Performance)>,
}

pub(super) fn write<W: Write>(writer: &mut W, snapshot: &Snapshot) -> Result<()> {
    let body = bincode::serialize(snapshot)
        .map_err(|e| LexpandError::serialization(format!("Failed to encode snapshot: {e}")))?;

    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(VERSION)?;
    writer.write_u32::<LittleEndian>(crc32fast::hash(&body))?;
    writer.write_u64::<LittleEndian>(body.len() as u64)?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

pub(super) fn read<R: Read>(reader: &mut R) -> Result<Snapshot> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|_| LexpandError::format("Snapshot is too short"))?;
    if &magic != MAGIC {
        return Err(LexpandError::format("Not a cache snapshot"));
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(LexpandError::format(format!(
            "Unsupported snapshot version {version}"
        )));
    }
    let checksum = reader.read_u32::<LittleEndian>()?;
    let length = reader.read_u64::<LittleEndian>()?;

    let mut body = Vec::new();
    reader.take(length).read_to_end(&mut body)?;
    if body.len() as u64 != length {
        return Err(LexpandError::format(format!(
            "Snapshot body is truncated: {} of {length} bytes",
            body.len()
        )));
    }
    if crc32fast::hash(&body) != checksum {
        return Err(LexpandError::format("Snapshot checksum mismatch"));
    }

    bincode::deserialize(&body)
        .map_err(|e| LexpandError::serialization(format!("Failed to decode snapshot: {e}")))
}

pub(super) fn save(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer, snapshot)
}

pub(super) fn load(path: &Path) -> Result<Snapshot> {
    let file = File::open(path).map_err(|e| {
        LexpandError::config(format!("Failed to open snapshot '{}': {}", path.display(), e))
    })?;
    read(&mut BufReader::new(file))
}
