//! vdbinspect - inspect RAG vector database artifacts
//!
//! Reads the files a RAG build pipeline leaves on disk and reports chunk
//! counts, text statistics and configuration metadata, either as a text
//! report or as JSON.
//!
//! # Recognized layouts
//!
//! ```text
//! <db-path>/
//! ├── metadata.json          # plain FAISS layout (build metadata sidecar)
//! ├── llama-stack.yaml       # optional llama-stack config (models, vector_dbs)
//! ├── faiss_store.db         # llamastack-faiss: sqlite `kvstore` table
//! └── sqlite-vec_store.db    # llamastack-sqlite-vec: sqlite `kvstore` table
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use vdbinspect::{Config, InspectOptions, inspect, render_text};
//!
//! let config = Config::default();
//! let report = inspect(Path::new("./vector_db"), &InspectOptions::default(), &config)?;
//! print!("{}", render_text(&report, &config)?);
//! ```

pub mod cli;
pub mod config;
mod error;
mod kvstore;
mod layout;
mod report;
mod sidecar;
mod stats;

pub use config::Config;
pub use error::StoreError;
pub use kvstore::{Chunk, KvStoreData, decode_chunk, read_store};
pub use layout::StoreLayout;
pub use report::{InspectOptions, InspectionReport, inspect, render_json, render_text};
pub use sidecar::{StackConfigExcerpt, read_build_metadata, read_stack_config};
pub use stats::TextStats;

/// Build metadata sidecar written next to a plain FAISS index
pub const METADATA_FILE: &str = "metadata.json";

/// llama-stack run configuration sidecar
pub const STACK_CONFIG_FILE: &str = "llama-stack.yaml";

/// Key/value database used by the llamastack-faiss provider
pub const FAISS_STORE_DB: &str = "faiss_store.db";

/// Key/value database used by the llamastack-sqlite-vec provider
pub const SQLITE_VEC_STORE_DB: &str = "sqlite-vec_store.db";

/// Default number of characters shown per sampled chunk
pub const DEFAULT_PREVIEW_CHARS: usize = 500;
