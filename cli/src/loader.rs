#![deny(missing_docs)]

//! # Schema Loader
//!
//! Reads a schema document from disk. Files ending in `.yaml` or `.yml` are
//! parsed as YAML, anything else as JSON.

use crate::error::{CliError, CliResult};
use rdlgen_core::Schema;
use std::fs;
use std::path::Path;
use tracing::debug;

/// True when the extension selects the YAML parser.
fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("yaml") | Some("yml")
    )
}

/// Loads and parses the schema at `path`.
pub fn load_schema(path: &Path) -> CliResult<Schema> {
    if !path.exists() {
        return Err(CliError::General(format!(
            "Schema file not found: {:?}",
            path
        )));
    }
    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "loaded schema file");
    if is_yaml(path) {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// Writes `content` to `output`, or stdout when no path is given.
pub fn write_output(output: Option<&Path>, content: &str) -> CliResult<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
            eprintln!("Wrote {:?}", path);
        }
        None => println!("{}", content),
    }
    Ok(())
}
