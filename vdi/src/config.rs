//! Configuration for vdbinspect

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the key/value table inside the llama-stack databases
    pub kv_table: String,

    /// Key substring identifying the serialized FAISS index record
    pub index_key: String,

    /// Key substring identifying vector DB registrations
    pub vector_dbs_key: String,

    /// Key substring identifying OpenAI-compatible vector store records
    pub openai_vector_stores_key: String,

    /// Characters of content shown per sampled chunk
    pub preview_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kv_table: "kvstore".to_string(),
            index_key: "faiss_index".to_string(),
            vector_dbs_key: "vector_dbs".to_string(),
            openai_vector_stores_key: "openai_vector_stores".to_string(),
            preview_chars: crate::DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from_file(config_path)
                .context(format!("Failed to load config from {}", config_path.display()));
        }

        // Try default locations
        let default_paths = [
            Some(PathBuf::from(".vdbinspect.yml")),
            dirs::config_dir().map(|p| p.join("vdbinspect").join("config.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_from_file(path)
                    .context(format!("Failed to load config from {}", path.display()));
            }
        }

        Ok(Config::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration before use
    ///
    /// The table name is spliced into SQL, so it must be a bare identifier.
    pub fn validate(&self) -> Result<()> {
        let valid_table = !self.kv_table.is_empty()
            && self.kv_table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_table {
            return Err(eyre::eyre!(
                "Invalid kv_table '{}': only ASCII letters, digits and '_' are allowed",
                self.kv_table
            ));
        }
        Ok(())
    }
}
