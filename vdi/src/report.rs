//! Inspection report assembly and rendering

use colored::*;
use eyre::{Context, Result};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::cli::StoreType;
use crate::config::Config;
use crate::kvstore::{Chunk, KvStoreData, read_store};
use crate::layout::StoreLayout;
use crate::sidecar::{StackConfigExcerpt, read_build_metadata, read_stack_config};
use crate::stats::TextStats;

const RULE_WIDTH: usize = 80;
const CHUNK_RULE_WIDTH: usize = 40;
const FAISS_NOTE: &str = "Standard FAISS format - use llama_index to load";

/// What to inspect and how much chunk content to keep
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    pub store_type: StoreType,
    /// Keep every chunk in the report
    pub list_chunks: bool,
    /// Keep the first N chunks as a sample (ignored with `list_chunks`)
    pub sample: usize,
}

/// Everything known about one vector store directory
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub db_path: String,
    pub vector_store_type: StoreLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llama_stack_config: Option<StackConfigExcerpt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_stats: Option<TextStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faiss_index_size_chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_db_info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_vector_store_info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<Chunk>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_chunks: Option<Vec<Chunk>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl InspectionReport {
    fn new(db_path: &Path, layout: StoreLayout) -> Self {
        let absolute = std::path::absolute(db_path).unwrap_or_else(|_| db_path.to_path_buf());
        Self {
            db_path: normalize_lexically(&absolute).display().to_string(),
            vector_store_type: layout,
            build_metadata: None,
            llama_stack_config: None,
            db_files: None,
            total_chunks: None,
            text_stats: None,
            faiss_index_size_chars: None,
            vector_db_info: None,
            openai_vector_store_info: None,
            chunks: None,
            sample_chunks: None,
            error: None,
            note: None,
        }
    }

    fn attach_store(&mut self, data: KvStoreData, options: &InspectOptions) {
        self.total_chunks = Some(data.total_chunks);
        self.text_stats = Some(data.text_stats);
        self.faiss_index_size_chars = Some(data.index_size_chars);
        self.vector_db_info = data.vector_db_info;
        self.openai_vector_store_info = data.openai_vector_store_info;
        self.error = data.error;

        if let Some(chunks) = data.chunks {
            if options.list_chunks {
                self.chunks = Some(chunks);
            } else if options.sample > 0 {
                self.sample_chunks = Some(chunks.into_iter().take(options.sample).collect());
            }
        }
    }
}

/// Inspect the vector store at `db_path`
///
/// Key/value store failures are reported inline; sidecar and directory
/// read failures are returned as errors.
pub fn inspect(
    db_path: &Path,
    options: &InspectOptions,
    config: &Config,
) -> Result<InspectionReport> {
    let layout = options.store_type.resolve(db_path);
    if options.store_type == StoreType::Auto {
        info!("Detected vector store type: {}", layout);
    }

    let mut report = InspectionReport::new(db_path, layout);
    report.build_metadata = read_build_metadata(db_path)?;
    report.llama_stack_config = read_stack_config(db_path)?;

    if db_path.is_dir() {
        report.db_files = Some(list_files(db_path)?);
    }

    if let Some(db_file) = layout.db_path(db_path) {
        report.attach_store(read_store(&db_file, config), options);
    } else if layout == StoreLayout::Faiss {
        report.note = Some(FAISS_NOTE.to_string());
    }

    Ok(report)
}

/// Drop `.` and trailing separators and fold `..` without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).context(format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Render the report as pretty-printed JSON
pub fn render_json(report: &InspectionReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Render the report as a human-readable text report
pub fn render_text(report: &InspectionReport, config: &Config) -> Result<String> {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines: Vec<String> = vec![
        rule.clone(),
        "VECTOR DATABASE INSPECTION REPORT".bold().to_string(),
        rule.clone(),
        String::new(),
        format!("Database Path: {}", report.db_path),
        format!("Vector Store Type: {}", report.vector_store_type),
    ];

    if let Some(files) = &report.db_files {
        lines.push(String::new());
        lines.push("Files in database directory:".to_string());
        lines.extend(files.iter().map(|f| format!("  - {}", f)));
    }

    if let Some(stack) = &report.llama_stack_config {
        lines.push(String::new());
        lines.push("--- Llama Stack Configuration ---".to_string());
        if let Some(models) = non_empty_list(&stack.models) {
            lines.push("  Models:".to_string());
            for model in models {
                let dimension = model.get("metadata").and_then(|m| m.get("embedding_dimension"));
                lines.push(format!("    - {}", display_or_na(model.get("model_id"))));
                lines.push(format!("      Dimension: {}", display_or_na(dimension)));
            }
        }
        if let Some(vector_dbs) = non_empty_list(&stack.vector_dbs) {
            lines.push("  Vector DBs:".to_string());
            for vdb in vector_dbs {
                lines.push(format!("    - ID: {}", display_or_na(vdb.get("vector_db_id"))));
            }
        }
    }

    lines.push(String::new());
    lines.push("--- Statistics ---".to_string());
    let total_chunks = report.total_chunks.map_or("N/A".to_string(), |n| n.to_string());
    lines.push(format!("  Total Chunks: {}", total_chunks));

    if let Some(stats) = &report.text_stats {
        lines.push(String::new());
        lines.push("--- Text Statistics ---".to_string());
        lines.push(format!("  Total Characters: {}", with_thousands(stats.total_characters)));
        lines.push(format!("  Avg Chunk Length: {:.2} chars", stats.avg_chunk_length));
        lines.push(format!("  Min Chunk Length: {} chars", stats.min_chunk_length));
        lines.push(format!("  Max Chunk Length: {} chars", stats.max_chunk_length));
    }

    if let Some(size) = report.faiss_index_size_chars {
        lines.push(format!("  FAISS Index Size: {} chars (base64)", with_thousands(size)));
    }

    if let Some(error) = &report.error {
        lines.push(String::new());
        lines.push(format!("❌ Error: {}", error).red().to_string());
    }

    if let Some(note) = &report.note {
        lines.push(String::new());
        lines.push(format!("ℹ️  Note: {}", note).cyan().to_string());
    }

    if let Some(samples) = &report.sample_chunks {
        lines.push(String::new());
        lines.push(format!("--- Sample Chunks ({} shown) ---", samples.len()));
        for chunk in samples {
            lines.push(String::new());
            lines.push(format!("[Chunk {}] ({} chars)", chunk.index, chunk.content_length));
            lines.push("-".repeat(CHUNK_RULE_WIDTH));
            lines.push(preview(&chunk.content, config.preview_chars));
            if !chunk.metadata.is_empty() {
                lines.push(format!("Metadata: {}", Value::Object(chunk.metadata.clone())));
            }
        }
    }

    if let Some(chunks) = &report.chunks {
        lines.push(String::new());
        lines.push(format!("--- All Chunks ({} total) ---", chunks.len()));
        lines.push(serde_json::to_string_pretty(chunks).context("Failed to serialize chunks")?);
    }

    lines.push(String::new());
    lines.push(rule);

    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}

fn non_empty_list(value: &Value) -> Option<&Vec<Value>> {
    value.as_array().filter(|items| !items.is_empty())
}

fn display_or_na(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// First `limit` characters of `content`, with `...` appended when cut
fn preview(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Format an integer with `,` thousands separators
fn with_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
