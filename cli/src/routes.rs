#![deny(missing_docs)]

//! # Routes Command
//!
//! Prints only the route patterns of a schema, without resolving types.

use crate::error::CliResult;
use crate::loader::{load_schema, write_output};
use rdlgen_core::generate_routes;
use std::path::PathBuf;

/// Arguments for the routes command.
#[derive(clap::Args, Debug, Clone)]
pub struct RoutesArgs {
    /// Path to the schema (JSON, or YAML by extension).
    #[clap(long, short = 's')]
    pub schema: PathBuf,

    /// Output file. Prints to stdout when omitted.
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Deployment name prefixed to every pattern (e.g. `/api`).
    #[clap(long, short = 'f', default_value = "", env = "RDLGEN_FINAL_NAME")]
    pub final_name: String,
}

/// Executes the routes command.
pub fn execute(args: &RoutesArgs) -> CliResult<()> {
    let schema = load_schema(&args.schema)?;
    let routes = generate_routes(&schema, &args.final_name)?;
    let json = serde_json::to_string_pretty(&routes)?;
    write_output(args.output.as_deref(), &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_execute_writes_patterns() {
        let dir = tempdir().unwrap();
        let schema_path = dir.path().join("pay.json");
        fs::write(
            &schema_path,
            r#"{"name": "mobilePayment", "resources": [
                {"method": "GET", "path": "/passcodes/{id}"},
                {"method": "DELETE", "path": "/passcodes/{id}"}
            ]}"#,
        )
        .unwrap();
        let output = dir.path().join("routes.json");
        let args = RoutesArgs {
            schema: schema_path,
            output: Some(output.clone()),
            final_name: "/api".into(),
        };

        execute(&args).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(
            value[0]["pathRegex"],
            r"^/api/mobilePayment/v1/passcodes/[^/]+(/?\?|/?$)"
        );
        assert_eq!(value[1]["pathRegex"], r"^/api/mobilePayment/v1/passcodes/[^/]+/?$");
    }
}
