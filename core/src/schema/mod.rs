#![deny(missing_docs)]

//! # Schema Module
//!
//! - **models**: The input schema document (types and resources).
//! - **registry**: Name lookup, supertype chains and cycle detection.

pub mod models;
pub mod registry;

pub use models::{
    AliasTypeDef, Annotations, ArrayTypeDef, BaseType, EnumElementDef, EnumTypeDef, ExceptionDef,
    MapTypeDef, Resource, ResourceAuth, ResourceInput, ResourceOutput, Schema, StructFieldDef,
    StructTypeDef, TypeDef, UnionTypeDef,
};
pub use registry::{TypeChain, TypeEntry, TypeRegistry};
