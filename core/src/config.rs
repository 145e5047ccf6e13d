#![deny(missing_docs)]

//! # Generator Configuration
//!
//! Plain parameters handed to the core by the CLI layer.

use serde::{Deserialize, Serialize};

/// What the exception dispatch table does with a response status that is
/// neither a success status nor a declared exception.
///
/// The policy travels with each resource's dispatch table and applies when
/// a status is dispatched. It never fails schema resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndeclaredPolicy {
    /// Fail with [`crate::AppError::UndeclaredException`].
    Strict,
    /// Fall back to the generic error branch and log a warning.
    #[default]
    Tolerant,
}

/// Switches controlling one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Overrides the schema namespace for the generated package.
    pub namespace: Option<String>,
    /// Emit validation and documentation directives.
    pub generate_annotations: bool,
    /// Derive method names from the path instead of method + type.
    pub use_path_naming: bool,
    /// Produce a handler implementation skeleton descriptor.
    pub generate_handler_impl: bool,
    /// Include the vendor error classes among the support artifacts.
    pub generate_vendor_errors: bool,
    /// Append `_Pc` to generated class names.
    pub class_suffix: bool,
    /// Policy for statuses without a declared exception.
    pub undeclared_exceptions: UndeclaredPolicy,
    /// Prefix prepended to every route pattern.
    pub final_name: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            generate_annotations: true,
            use_path_naming: false,
            generate_handler_impl: false,
            generate_vendor_errors: false,
            class_suffix: false,
            undeclared_exceptions: UndeclaredPolicy::default(),
            final_name: String::new(),
        }
    }
}

impl GeneratorConfig {
    /// The suffix appended to every generated class name.
    pub fn class_suffix(&self) -> &'static str {
        if self.class_suffix {
            "_Pc"
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = GeneratorConfig::default();
        assert!(cfg.generate_annotations);
        assert_eq!(cfg.undeclared_exceptions, UndeclaredPolicy::Tolerant);
        assert_eq!(cfg.class_suffix(), "");
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let cfg: GeneratorConfig =
            serde_json::from_str(r#"{"class_suffix": true, "undeclared_exceptions": "strict"}"#)
                .unwrap();
        assert_eq!(cfg.class_suffix(), "_Pc");
        assert_eq!(cfg.undeclared_exceptions, UndeclaredPolicy::Strict);
        assert!(cfg.generate_annotations);
    }
}
