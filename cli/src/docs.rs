#![deny(missing_docs)]

//! # Docs Command
//!
//! Writes the Swagger description of a schema.

use crate::error::CliResult;
use crate::loader::{load_schema, write_output};
use crate::resolve::ResolveArgs;
use rdlgen_core::{generate_api_doc, ApiDocOptions};

/// Transfer schemes accepted on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeArg {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
    /// WebSocket.
    Ws,
    /// WebSocket over TLS.
    Wss,
}

impl SchemeArg {
    fn as_str(self) -> &'static str {
        match self {
            SchemeArg::Http => "http",
            SchemeArg::Https => "https",
            SchemeArg::Ws => "ws",
            SchemeArg::Wss => "wss",
        }
    }
}

/// Arguments for the docs command.
#[derive(clap::Args, Debug, Clone)]
pub struct DocsArgs {
    /// Schema, output and generation switches shared with `resolve`.
    #[clap(flatten)]
    pub resolve: ResolveArgs,

    /// Scheme the API is served over.
    #[clap(long, value_enum, env = "RDLGEN_SCHEME")]
    pub scheme: Option<SchemeArg>,

    /// Host serving the API, e.g. `api.example.com:8080`.
    #[clap(long, env = "RDLGEN_API_HOST")]
    pub host: Option<String>,
}

impl DocsArgs {
    /// Deployment details for the document.
    pub fn options(&self) -> ApiDocOptions {
        ApiDocOptions {
            scheme: self.scheme.map(|s| s.as_str().to_string()),
            host: self.host.clone(),
        }
    }
}

/// Executes the docs command.
pub fn execute(args: &DocsArgs) -> CliResult<()> {
    let schema = load_schema(&args.resolve.schema)?;
    let doc = generate_api_doc(&schema, &args.resolve.config(), &args.options())?;
    let json = serde_json::to_string_pretty(&doc)?;
    write_output(args.resolve.output.as_deref(), &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::PolicyArg;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn args(schema: PathBuf, output: PathBuf) -> DocsArgs {
        DocsArgs {
            resolve: ResolveArgs {
                schema,
                output: Some(output),
                namespace: None,
                no_annotations: false,
                path_naming: false,
                handler_impl: false,
                vendor_errors: true,
                class_suffix: false,
                undeclared: PolicyArg::Tolerant,
                final_name: "/api".into(),
            },
            scheme: Some(SchemeArg::Https),
            host: Some("pets.example.com".into()),
        }
    }

    #[test]
    fn test_execute_writes_swagger() {
        let dir = tempdir().unwrap();
        let schema_path = dir.path().join("pets.yaml");
        fs::write(
            &schema_path,
            r#"
name: pets
types:
  - kind: struct
    name: Pet
    fields:
      - name: id
        type: Int64
  - kind: struct
    name: Problem
    fields:
      - name: reason
        type: String
resources:
  - method: GET
    path: /pets/{id}
    type: Pet
    inputs:
      - name: id
        type: Int64
        pathParam: true
    exceptions:
      NOT_FOUND:
        type: Problem
"#,
        )
        .unwrap();
        let output = dir.path().join("pets_swagger.json");

        execute(&args(schema_path, output.clone())).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(value["basePath"], "/api/pets/v1");
        assert_eq!(value["schemes"][0], "https");
        assert_eq!(value["host"], "pets.example.com");
        let get = &value["paths"]["/pets/{id}"]["get"];
        assert_eq!(get["parameters"][0]["in"], "path");
        assert_eq!(get["parameters"][0]["format"], "int64");
        assert_eq!(get["responses"]["404"]["description"], "Not Found");
        assert_eq!(
            get["responses"]["404"]["schema"]["$ref"],
            "#/definitions/Problem"
        );
        assert!(value["definitions"]["VendorErrorBody"].is_object());
    }
}
