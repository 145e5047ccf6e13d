#![deny(missing_docs)]

//! # Resolve Command
//!
//! Runs the full generation pass and prints the resolved model as JSON.

use crate::error::CliResult;
use crate::loader::{load_schema, write_output};
use rdlgen_core::{generate, GeneratorConfig, UndeclaredPolicy};
use std::path::PathBuf;
use tracing::info;

/// Policy names accepted on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicyArg {
    /// Abort on statuses without a declared exception.
    Strict,
    /// Fall back to the generic error branch.
    #[default]
    Tolerant,
}

impl From<PolicyArg> for UndeclaredPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Strict => UndeclaredPolicy::Strict,
            PolicyArg::Tolerant => UndeclaredPolicy::Tolerant,
        }
    }
}

/// Arguments for the resolve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Path to the schema (JSON, or YAML by extension).
    #[clap(long, short = 's')]
    pub schema: PathBuf,

    /// Output file. Prints to stdout when omitted.
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Overrides the schema namespace.
    #[clap(long, env = "RDLGEN_NAMESPACE")]
    pub namespace: Option<String>,

    /// Skip validation and documentation directives.
    #[clap(long, env = "RDLGEN_NO_ANNOTATIONS")]
    pub no_annotations: bool,

    /// Derive method names from resource paths.
    #[clap(long, env = "RDLGEN_PATH_NAMING")]
    pub path_naming: bool,

    /// Include the handler implementation skeleton.
    #[clap(long, env = "RDLGEN_HANDLER_IMPL")]
    pub handler_impl: bool,

    /// Include the vendor error classes.
    #[clap(long, env = "RDLGEN_VENDOR_ERRORS")]
    pub vendor_errors: bool,

    /// Append `_Pc` to generated class names.
    #[clap(long, env = "RDLGEN_CLASS_SUFFIX")]
    pub class_suffix: bool,

    /// Handling of statuses without a declared exception.
    #[clap(long, value_enum, default_value_t = PolicyArg::Tolerant, env = "RDLGEN_UNDECLARED")]
    pub undeclared: PolicyArg,

    /// Deployment name prefixed to route patterns.
    #[clap(long, default_value = "", env = "RDLGEN_FINAL_NAME")]
    pub final_name: String,
}

impl ResolveArgs {
    /// Translates the flags into the core configuration.
    pub fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            namespace: self.namespace.clone(),
            generate_annotations: !self.no_annotations,
            use_path_naming: self.path_naming,
            generate_handler_impl: self.handler_impl,
            generate_vendor_errors: self.vendor_errors,
            class_suffix: self.class_suffix,
            undeclared_exceptions: self.undeclared.into(),
            final_name: self.final_name.clone(),
        }
    }
}

/// Executes the resolve command.
pub fn execute(args: &ResolveArgs) -> CliResult<()> {
    let schema = load_schema(&args.schema)?;
    let resolved = generate(&schema, &args.config())?;
    info!(schema = %resolved.name, "resolution complete");
    let json = serde_json::to_string_pretty(&resolved)?;
    write_output(args.output.as_deref(), &json)
}
