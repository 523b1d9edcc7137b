//! llama-stack key/value database reader
//!
//! Both llama-stack providers persist their state in a sqlite table of
//! `(key, value)` text pairs. The record whose key contains `faiss_index`
//! holds a JSON object:
//!
//! ```text
//! {
//!   "chunk_by_index": { "0": "{\"content\": \"...\", \"metadata\": {...}}", ... },
//!   "faiss_index": "<base64 blob>"
//! }
//! ```
//!
//! The index blob is only measured, never decoded.

use log::{debug, info, warn};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::config::Config;
use crate::error::StoreError;
use crate::stats::TextStats;

/// A single decoded chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: u64,
    pub content: String,
    /// Every payload field except `content`, in original order
    pub metadata: Map<String, Value>,
    /// Length of `content` in characters
    pub content_length: usize,
}

impl Chunk {
    fn new(index: u64, content: String, metadata: Map<String, Value>) -> Self {
        let content_length = content.chars().count();
        Self {
            index,
            content,
            metadata,
            content_length,
        }
    }
}

/// Everything read from a key/value database
///
/// Fields gathered before a failure are kept; the failure itself lands in `error`.
#[derive(Debug, Clone, Default)]
pub struct KvStoreData {
    pub total_chunks: usize,
    /// `None` when no index record exists
    pub chunks: Option<Vec<Chunk>>,
    pub text_stats: TextStats,
    /// Character length of the serialized FAISS index
    pub index_size_chars: usize,
    pub vector_db_info: Option<Value>,
    pub openai_vector_store_info: Option<Value>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndexRecord {
    #[serde(default)]
    chunk_by_index: Map<String, Value>,
    #[serde(default)]
    faiss_index: Option<String>,
}

/// Decode one chunk payload
///
/// A JSON object is split into `content` and metadata. Anything else,
/// including malformed JSON, becomes the content verbatim.
pub fn decode_chunk(index: u64, payload: &str) -> Chunk {
    let fields = match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(fields)) => fields,
        _ => {
            debug!("Chunk {} payload is not a JSON object, using raw text", index);
            return Chunk::new(index, payload.to_string(), Map::new());
        }
    };

    let mut content = String::new();
    let mut metadata = Map::new();
    for (key, value) in fields {
        if key == "content" {
            content = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
        } else {
            metadata.insert(key, value);
        }
    }

    Chunk::new(index, content, metadata)
}

/// Read chunk and registry state from a llama-stack key/value database
///
/// Never fails: any error is attached to the returned data as a string.
pub fn read_store(db_file: &Path, config: &Config) -> KvStoreData {
    let mut data = KvStoreData::default();
    if let Err(e) = read_into(db_file, config, &mut data) {
        warn!("Failed to read {}: {}", db_file.display(), e);
        data.error = Some(e.to_string());
    }
    data
}

fn read_into(db_file: &Path, config: &Config, data: &mut KvStoreData) -> Result<(), StoreError> {
    if !db_file.exists() {
        return Err(StoreError::NotFound {
            path: db_file.to_path_buf(),
        });
    }

    // Dropped at the end of this scope on every path, closing the handle
    let conn = Connection::open_with_flags(db_file, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let table = KvTable {
        conn: &conn,
        table: &config.kv_table,
    };

    if let Some(raw) = table.find(&config.index_key)? {
        let record: IndexRecord = serde_json::from_str(&raw)?;
        data.total_chunks = record.chunk_by_index.len();
        let chunks = decode_chunks(&record.chunk_by_index)?;
        info!("Decoded {} chunks from {}", chunks.len(), db_file.display());

        data.text_stats = TextStats::from_chunks(&chunks);
        data.index_size_chars = record.faiss_index.as_deref().map_or(0, |s| s.chars().count());
        data.chunks = Some(chunks);
    } else {
        info!("No '{}' record in {}", config.index_key, db_file.display());
    }

    if let Some(raw) = table.find(&config.vector_dbs_key)? {
        data.vector_db_info = Some(serde_json::from_str(&raw)?);
    }

    if let Some(raw) = table.find(&config.openai_vector_stores_key)? {
        data.openai_vector_store_info = Some(serde_json::from_str(&raw)?);
    }

    Ok(())
}

fn decode_chunks(chunk_by_index: &Map<String, Value>) -> Result<Vec<Chunk>, StoreError> {
    let mut entries = chunk_by_index
        .iter()
        .map(|(key, payload)| {
            key.trim()
                .parse::<u64>()
                .map(|index| (index, payload))
                .map_err(|_| StoreError::InvalidChunkIndex { key: key.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|(index, _)| *index);

    Ok(entries
        .into_iter()
        .map(|(index, payload)| match payload {
            Value::String(s) => decode_chunk(index, s),
            other => decode_chunk(index, &other.to_string()),
        })
        .collect())
}

/// Borrowed view of the `(key, value)` table
struct KvTable<'a> {
    conn: &'a Connection,
    table: &'a str,
}

impl KvTable<'_> {
    /// Value of the first record whose key contains `key_substring`
    fn find(&self, key_substring: &str) -> Result<Option<String>, StoreError> {
        let sql = format!("SELECT value FROM {} WHERE key LIKE ?1 LIMIT 1", self.table);
        let value = self
            .conn
            .query_row(&sql, params![format!("%{}%", key_substring)], |row| {
                match row.get_ref(0)? {
                    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                        Ok(String::from_utf8_lossy(bytes).into_owned())
                    }
                    other => Err(rusqlite::Error::InvalidColumnType(
                        0,
                        "value".to_string(),
                        other.data_type(),
                    )),
                }
            })
            .optional()?;
        Ok(value)
    }
}
