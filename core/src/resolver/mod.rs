#![deny(missing_docs)]

//! # Resolver Module
//!
//! - **types**: Schema type reference -> target type descriptor.
//! - **naming**: Class, method and identifier naming rules.
//! - **status**: Status symbol -> HTTP code table.
//! - **defaults**: Declared default values checked per base kind.

pub mod defaults;
pub mod naming;
pub mod status;
pub mod types;

pub use defaults::{string_literal, DefaultValue};
pub use status::{require_status_code, status_code, status_message};
pub use types::{ResolvedType, TypeResolver};
