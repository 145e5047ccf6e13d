#![deny(missing_docs)]

//! # RDL Generator Core
//!
//! Semantic layer of the RDL code generator: turns a parsed schema into
//! fully resolved descriptors that a template renderer can emit directly.

/// Shared error types.
pub mod error;

/// Generation switches.
pub mod config;

/// Schema document model and type registry.
pub mod schema;

/// Type resolution, naming and default values.
pub mod resolver;

/// Annotation to directive mapping.
pub mod annotations;

/// Resource (endpoint) analysis.
pub mod resource;

/// Struct and enum model resolution.
pub mod model_generator;

/// Union tagging and JSON codec derivation.
pub mod union_generator;

/// Route pattern generation.
pub mod route_generator;

/// Whole-schema generation pass.
pub mod generator;

/// Swagger description of the service.
pub mod api_doc;

pub use annotations::{AnnotationMapper, AnnotationSite, Directive, DirectiveArg, ValidationGroups};
pub use api_doc::{generate_api_doc, ApiDocOptions};
pub use config::{GeneratorConfig, UndeclaredPolicy};
pub use error::{AppError, AppResult, ErrorContext};
pub use generator::{generate, HandlerImpl, ResolvedSchema};
pub use model_generator::{EnumModel, FieldModel, ModelGenerator, StructModel};
pub use resolver::{DefaultValue, ResolvedType, TypeResolver};
pub use resource::{ResolvedResource, ResourceAnalyzer};
pub use route_generator::{generate_routes, root_path, RoutePattern};
pub use schema::{BaseType, Resource, Schema, TypeDef, TypeRegistry};
pub use union_generator::{JsonKind, UnionCodec, UnionValue};
