//! CLI argument parsing for vdbinspect

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::layout::StoreLayout;

#[derive(Parser, Debug)]
#[command(name = "vdi")]
#[command(
    author,
    version,
    about = "Inspect RAG vector database contents and statistics",
    long_about = None
)]
pub struct Cli {
    /// Path to the vector database directory
    #[arg(short = 'p', long, required = true)]
    pub db_path: PathBuf,

    /// List all chunks with their content
    #[arg(long)]
    pub list_chunks: bool,

    /// Output all results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Vector store type: auto, faiss, llamastack-faiss, llamastack-sqlite-vec
    #[arg(long, default_value = "auto")]
    pub vector_store_type: StoreType,

    /// Show N sample chunks (0 = none)
    #[arg(long, default_value = "0")]
    pub sample: usize,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Store type requested on the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreType {
    #[default]
    Auto,
    Layout(StoreLayout),
}

impl StoreType {
    /// Resolve to a concrete layout, detecting from `db_path` when auto
    pub fn resolve(self, db_path: &Path) -> StoreLayout {
        match self {
            Self::Auto => StoreLayout::detect(db_path),
            Self::Layout(layout) => layout,
        }
    }
}

impl std::str::FromStr for StoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "faiss" | "plain" => Ok(Self::Layout(StoreLayout::Faiss)),
            "llamastack-faiss" | "keyvalue-variant-a" => {
                Ok(Self::Layout(StoreLayout::LlamastackFaiss))
            }
            "llamastack-sqlite-vec" | "keyvalue-variant-b" => {
                Ok(Self::Layout(StoreLayout::LlamastackSqliteVec))
            }
            _ => Err(format!(
                "Unknown vector store type: {}. \
                 Use: auto, faiss, llamastack-faiss, or llamastack-sqlite-vec",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_type_parse() {
        assert_eq!("auto".parse::<StoreType>().unwrap(), StoreType::Auto);
        assert_eq!(
            "llamastack-faiss".parse::<StoreType>().unwrap(),
            StoreType::Layout(StoreLayout::LlamastackFaiss)
        );
        assert_eq!(
            "keyvalue-variant-b".parse::<StoreType>().unwrap(),
            StoreType::Layout(StoreLayout::LlamastackSqliteVec)
        );
        assert_eq!("PLAIN".parse::<StoreType>().unwrap(), StoreType::Layout(StoreLayout::Faiss));
        assert!("chroma".parse::<StoreType>().is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["vdi", "--db-path", "/tmp/db"]).unwrap();
        assert_eq!(cli.db_path, PathBuf::from("/tmp/db"));
        assert!(!cli.list_chunks);
        assert!(!cli.json);
        assert_eq!(cli.vector_store_type, StoreType::Auto);
        assert_eq!(cli.sample, 0);
    }

    #[test]
    fn test_cli_requires_db_path() {
        assert!(Cli::try_parse_from(["vdi", "--json"]).is_err());
    }

    #[test]
    fn test_cli_rejects_negative_sample() {
        assert!(Cli::try_parse_from(["vdi", "-p", "/tmp/db", "--sample", "-1"]).is_err());
    }

    #[test]
    fn test_explicit_layout_skips_detection() {
        let store_type = StoreType::Layout(StoreLayout::LlamastackSqliteVec);
        assert_eq!(
            store_type.resolve(Path::new("/nonexistent/path")),
            StoreLayout::LlamastackSqliteVec
        );
    }
}
