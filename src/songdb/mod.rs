//! Song Identification Table
//!
//! Game rips ship as bare `.adx`/`.pcm` files with no embedded metadata, so
//! human-readable titles come from a lookup table keyed by a content hash
//! of each file's first 8 KiB. The table is loaded once at process start
//! from a CSV file into an immutable map and passed by reference to
//! whoever needs lookups; it is never a hidden global.
//!
//! CSV columns: `hash,title,kind,filename`, hash as 8 hex digits.

use crate::{AdxError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Bytes of file content that feed the hash
pub const PROBE_BYTES: usize = 8192;

/// One identified song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongEntry {
    /// Human-readable title
    pub title: String,
    /// Track kind (bgm, jingle, voice, ...)
    pub kind: String,
    /// Canonical filename of the rip
    pub filename: String,
}

#[derive(Debug, Deserialize)]
struct SongRecord {
    hash: String,
    title: String,
    kind: String,
    filename: String,
}

/// Immutable content-hash → song mapping
#[derive(Debug, Default)]
pub struct SongTable {
    entries: HashMap<u32, SongEntry>,
}

impl SongTable {
    /// Load the table from a CSV file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SongTable> {
        let mut reader = csv::Reader::from_path(path.as_ref())
            .map_err(|e| AdxError::SongDb(format!("failed to open song table: {e}")))?;

        let mut entries = HashMap::new();
        for record in reader.deserialize() {
            let record: SongRecord =
                record.map_err(|e| AdxError::SongDb(format!("malformed song record: {e}")))?;
            let hash = u32::from_str_radix(&record.hash, 16).map_err(|_| {
                AdxError::SongDb(format!("bad hash field {:?}", record.hash))
            })?;
            entries.insert(
                hash,
                SongEntry {
                    title: record.title,
                    kind: record.kind,
                    filename: record.filename,
                },
            );
        }
        Ok(SongTable { entries })
    }

    /// Look up a song by the leading bytes of its file.
    pub fn identify(&self, head: &[u8]) -> Option<&SongEntry> {
        self.entries.get(&content_hash(head))
    }

    /// Number of known songs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// FNV-1a over the first [`PROBE_BYTES`] of `head`.
pub fn content_hash(head: &[u8]) -> u32 {
    let mut hash: u32 = 0x811C_9DC5;
    for &byte in head.iter().take(PROBE_BYTES) {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}
