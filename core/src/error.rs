//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Resolution failures carry an [`ErrorContext`] so the caller can decide
//! between aborting the run and skipping only the offending unit.

use derive_more::{Display, From};
use std::fmt;

/// Where in the schema a failure was detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The resource (method name or path) being analyzed.
    pub resource: Option<String>,
    /// The type being resolved or generated.
    pub type_name: Option<String>,
    /// The struct field or resource input involved.
    pub field: Option<String>,
}

impl ErrorContext {
    /// An empty context.
    pub fn none() -> Self {
        Self::default()
    }

    /// Context rooted at a resource.
    pub fn resource(name: impl Into<String>) -> Self {
        Self {
            resource: Some(name.into()),
            ..Self::default()
        }
    }

    /// Context rooted at a named type.
    pub fn type_name(name: impl Into<String>) -> Self {
        Self {
            type_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns a copy of this context narrowed to a field or input.
    pub fn with_field(&self, field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..self.clone()
        }
    }

    /// True when no location is recorded.
    pub fn is_empty(&self) -> bool {
        self.resource.is_none() && self.type_name.is_none() && self.field.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::new();
        if let Some(r) = &self.resource {
            parts.push(format!("resource '{}'", r));
        }
        if let Some(t) = &self.type_name {
            parts.push(format!("type '{}'", t));
        }
        if let Some(field) = &self.field {
            parts.push(format!("field '{}'", field));
        }
        write!(f, " ({})", parts.join(", "))
    }
}

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// A type reference that the schema does not define.
    #[from(ignore)]
    #[display("Unknown type '{type_name}'{context}")]
    UnknownType {
        /// The unresolved reference.
        type_name: String,
        /// Where the reference was found.
        context: ErrorContext,
    },

    /// A supertype or item chain that loops back on itself.
    #[from(ignore)]
    #[display("Cyclic type reference: {path}")]
    CyclicType {
        /// The chain of type names, rendered `A -> B -> A`.
        path: String,
    },

    /// Structurally valid input that violates a schema rule.
    #[from(ignore)]
    #[display("Invalid schema{context}: {message}")]
    InvalidSchema {
        /// Where the violation was found.
        context: ErrorContext,
        /// What is wrong.
        message: String,
    },

    /// Two generated artifacts resolve to the same name.
    #[from(ignore)]
    #[display("Naming collision: '{name}' is generated for both {first} and {second}")]
    NamingCollision {
        /// The colliding generated name.
        name: String,
        /// The first owner of the name.
        first: String,
        /// The second owner of the name.
        second: String,
    },

    /// A status code without a declared exception type under the strict policy.
    #[from(ignore)]
    #[display("Undeclared exception status '{status}' for resource '{resource}'")]
    UndeclaredException {
        /// The resource method name.
        resource: String,
        /// The undeclared status symbol.
        status: String,
    },

    /// A union value that cannot be marshaled or unmarshaled.
    #[from(ignore)]
    #[display("Union '{union}': {message}")]
    UnionCodec {
        /// The union class name.
        union: String,
        /// What went wrong.
        message: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

impl AppError {
    /// Shorthand for an [`AppError::InvalidSchema`].
    pub fn invalid(context: ErrorContext, message: impl Into<String>) -> Self {
        AppError::InvalidSchema {
            context,
            message: message.into(),
        }
    }

    /// Shorthand for an [`AppError::UnknownType`].
    pub fn unknown_type(type_name: impl Into<String>, context: ErrorContext) -> Self {
        AppError::UnknownType {
            type_name: type_name.into(),
            context,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
