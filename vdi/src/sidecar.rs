//! Sidecar files stored next to the index: build metadata and llama-stack config

use eyre::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// The parts of `llama-stack.yaml` worth reporting
///
/// Missing or null sections become empty lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfigExcerpt {
    pub models: Value,
    pub vector_dbs: Value,
}

impl StackConfigExcerpt {
    fn from_mapping(map: &serde_yaml::Mapping) -> Self {
        let section = |key: &str| match map.get(key) {
            None | Some(serde_yaml::Value::Null) => Value::Array(Vec::new()),
            Some(value) => yaml_to_json(value),
        };
        Self {
            models: section("models"),
            vector_dbs: section("vector_dbs"),
        }
    }
}

/// Read `metadata.json` from `dir`, if present
///
/// An existing but unreadable or malformed file is an error.
pub fn read_build_metadata(dir: &Path) -> Result<Option<Value>> {
    let path = dir.join(crate::METADATA_FILE);
    if !path.exists() {
        debug!("No {} in {}", crate::METADATA_FILE, dir.display());
        return Ok(None);
    }

    let content =
        fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&content).context(format!("Failed to parse {}", path.display()))?;
    Ok((!is_empty_value(&value)).then_some(value))
}

/// Read the `models` and `vector_dbs` sections of `llama-stack.yaml`, if present
pub fn read_stack_config(dir: &Path) -> Result<Option<StackConfigExcerpt>> {
    let path = dir.join(crate::STACK_CONFIG_FILE);
    if !path.exists() {
        debug!("No {} in {}", crate::STACK_CONFIG_FILE, dir.display());
        return Ok(None);
    }

    let content = fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let document: serde_yaml::Value =
        serde_yaml::from_str(&content).context(format!("Failed to parse {}", path.display()))?;

    match &document {
        serde_yaml::Value::Null => Ok(None),
        serde_yaml::Value::Mapping(map) if map.is_empty() => Ok(None),
        serde_yaml::Value::Mapping(map) => Ok(Some(StackConfigExcerpt::from_mapping(map))),
        _ => Err(eyre::eyre!(
            "Unexpected structure in {}: expected a mapping at the top level",
            path.display()
        )),
    }
}

/// Convert YAML to JSON, rendering non-string mapping keys as text
fn yaml_to_json(value: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn yaml_key(key: &serde_yaml::Value) -> String {
    match yaml_to_json(key) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const STACK_YAML: &str = r#"
version: '2'
image_name: rag
apis:
  - inference
  - vector_io
models:
  - model_id: sentence-transformers/all-mpnet-base-v2
    model_type: embedding
    provider_id: sentence-transformers
    metadata:
      embedding_dimension: 768
vector_dbs:
  - vector_db_id: product-docs
    embedding_model: sentence-transformers/all-mpnet-base-v2
    embedding_dimension: 768
providers:
  vector_io:
    - provider_id: faiss
"#;

    #[test]
    fn test_build_metadata_absent() {
        let temp = TempDir::new().unwrap();
        assert!(read_build_metadata(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_build_metadata_passthrough() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("metadata.json"),
            r#"{"embedding_model": "all-mpnet", "chunk_size": 380, "index_id": "docs"}"#,
        )
        .unwrap();

        let metadata = read_build_metadata(temp.path()).unwrap().unwrap();
        assert_eq!(metadata["chunk_size"], 380);
        let keys: Vec<&String> = metadata.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["embedding_model", "chunk_size", "index_id"]);
    }

    #[test]
    fn test_build_metadata_empty_object_is_absent() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("metadata.json"), "{}").unwrap();
        assert!(read_build_metadata(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_build_metadata_falsy_scalars_are_absent() {
        let temp = TempDir::new().unwrap();
        for falsy in ["0", "0.0", "false", "null", "\"\"", "[]"] {
            fs::write(temp.path().join("metadata.json"), falsy).unwrap();
            let metadata = read_build_metadata(temp.path()).unwrap();
            assert!(metadata.is_none(), "{} should be absent", falsy);
        }

        fs::write(temp.path().join("metadata.json"), "7").unwrap();
        assert_eq!(read_build_metadata(temp.path()).unwrap(), Some(json!(7)));
    }

    #[test]
    fn test_build_metadata_malformed_is_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("metadata.json"), "{oops").unwrap();

        let err = read_build_metadata(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_stack_config_keeps_only_models_and_vector_dbs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("llama-stack.yaml"), STACK_YAML).unwrap();

        let excerpt = read_stack_config(temp.path()).unwrap().unwrap();

        assert_eq!(excerpt.models[0]["metadata"]["embedding_dimension"], 768);
        assert_eq!(excerpt.vector_dbs[0]["vector_db_id"], "product-docs");
        let serialized = serde_json::to_value(&excerpt).unwrap();
        assert_eq!(serialized.as_object().unwrap().len(), 2);
        assert!(serialized.get("providers").is_none());
    }

    #[test]
    fn test_stack_config_missing_sections_default_to_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("llama-stack.yaml"), "version: '2'\nmodels:\n").unwrap();

        let excerpt = read_stack_config(temp.path()).unwrap().unwrap();
        assert_eq!(excerpt.models, json!([]));
        assert_eq!(excerpt.vector_dbs, json!([]));
    }

    #[test]
    fn test_stack_config_non_string_keys_are_stringified() {
        let temp = TempDir::new().unwrap();
        let yaml = concat!(
            "models:\n",
            "  - model_id: m\n",
            "    metadata:\n",
            "      embedding_dimension: 768\n",
            "      1: x\n",
            "      true: y\n",
            "      ~: z\n",
            "vector_dbs: []\n",
        );
        fs::write(temp.path().join("llama-stack.yaml"), yaml).unwrap();

        let excerpt = read_stack_config(temp.path()).unwrap().unwrap();

        let metadata = &excerpt.models[0]["metadata"];
        assert_eq!(metadata["embedding_dimension"], 768);
        assert_eq!(metadata["1"], "x");
        assert_eq!(metadata["true"], "y");
        assert_eq!(metadata["null"], "z");
    }

    #[test]
    fn test_stack_config_non_mapping_is_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("llama-stack.yaml"), "- just\n- a list\n").unwrap();

        let err = read_stack_config(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Unexpected structure"));
    }

    #[test]
    fn test_stack_config_empty_file_is_absent() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("llama-stack.yaml"), "").unwrap();
        assert!(read_stack_config(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_stack_config_absent() {
        let temp = TempDir::new().unwrap();
        assert!(read_stack_config(temp.path()).unwrap().is_none());
    }
}
