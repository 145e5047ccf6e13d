#![deny(missing_docs)]

//! # Schema Models
//!
//! The structured schema document consumed by the generator.
//!
//! These structs arrive already parsed (from JSON or YAML) and are treated as
//! immutable for the duration of a generation run. Declaration order of
//! fields, variants, elements, annotations and exceptions is significant and
//! preserved through `Vec` and `IndexMap`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Extended annotations (`x_min`, `x_pattern`, ...) in declaration order.
pub type Annotations = IndexMap<String, String>;

/// The root schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Service name (e.g. `sample`).
    pub name: String,
    /// Dotted namespace used for the generated package.
    #[serde(default)]
    pub namespace: Option<String>,
    /// API version. Absent means 1.
    #[serde(default)]
    pub version: Option<i32>,
    /// Explicit base path overriding `/{name}`.
    #[serde(default)]
    pub base: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Type definitions.
    #[serde(default)]
    pub types: Vec<TypeDef>,
    /// Resource (endpoint) definitions.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Schema {
    /// The declared version, defaulting to 1.
    pub fn version(&self) -> i32 {
        self.version.unwrap_or(1)
    }
}

/// A named type definition, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDef {
    /// A record with named fields.
    Struct(StructTypeDef),
    /// A sum type over other types.
    Union(UnionTypeDef),
    /// A closed set of symbols.
    Enum(EnumTypeDef),
    /// A homogeneous sequence.
    Array(ArrayTypeDef),
    /// A keyed collection.
    Map(MapTypeDef),
    /// A named scalar (string, number, bytes...).
    Alias(AliasTypeDef),
}

impl TypeDef {
    /// The type's declared name.
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Struct(t) => &t.name,
            TypeDef::Union(t) => &t.name,
            TypeDef::Enum(t) => &t.name,
            TypeDef::Array(t) => &t.name,
            TypeDef::Map(t) => &t.name,
            TypeDef::Alias(t) => &t.name,
        }
    }

    /// The supertype this definition derives from.
    pub fn supertype(&self) -> &str {
        match self {
            TypeDef::Struct(t) => &t.type_ref,
            TypeDef::Union(t) => &t.type_ref,
            TypeDef::Enum(t) => &t.type_ref,
            TypeDef::Array(t) => &t.type_ref,
            TypeDef::Map(t) => &t.type_ref,
            TypeDef::Alias(t) => &t.type_ref,
        }
    }

    /// The type's comment, if any.
    pub fn comment(&self) -> Option<&str> {
        match self {
            TypeDef::Struct(t) => t.comment.as_deref(),
            TypeDef::Union(t) => t.comment.as_deref(),
            TypeDef::Enum(t) => t.comment.as_deref(),
            TypeDef::Array(t) => t.comment.as_deref(),
            TypeDef::Map(t) => t.comment.as_deref(),
            TypeDef::Alias(t) => t.comment.as_deref(),
        }
    }

    /// The type's extended annotations.
    pub fn annotations(&self) -> &Annotations {
        match self {
            TypeDef::Struct(t) => &t.annotations,
            TypeDef::Union(t) => &t.annotations,
            TypeDef::Enum(t) => &t.annotations,
            TypeDef::Array(t) => &t.annotations,
            TypeDef::Map(t) => &t.annotations,
            TypeDef::Alias(t) => &t.annotations,
        }
    }
}

/// A struct definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructTypeDef {
    /// Type name.
    pub name: String,
    /// `Struct` or the name of a parent struct.
    #[serde(rename = "type", default = "struct_base")]
    pub type_ref: String,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<StructFieldDef>,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Extended annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

/// A single struct field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructFieldDef {
    /// Field name.
    pub name: String,
    /// Field type reference.
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Whether the field may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Default value, typed per the field's base kind.
    #[serde(default)]
    pub default: Option<JsonValue>,
    /// Item type override for generic fields (`Array<T>`, `Map<K,T>`).
    #[serde(default)]
    pub items: Option<String>,
    /// Key type override for map fields.
    #[serde(default)]
    pub keys: Option<String>,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Extended annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

/// A union definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionTypeDef {
    /// Type name.
    pub name: String,
    /// Always `Union`.
    #[serde(rename = "type", default = "union_base")]
    pub type_ref: String,
    /// Variant type references in declaration order.
    pub variants: Vec<String>,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Extended annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

/// An enum definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumTypeDef {
    /// Type name.
    pub name: String,
    /// Always `Enum`.
    #[serde(rename = "type", default = "enum_base")]
    pub type_ref: String,
    /// Elements in declaration order.
    pub elements: Vec<EnumElementDef>,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Extended annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

/// One symbol of an enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumElementDef {
    /// The symbol.
    pub symbol: String,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
}

/// An array definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayTypeDef {
    /// Type name.
    pub name: String,
    /// `Array` or another array type.
    #[serde(rename = "type", default = "array_base")]
    pub type_ref: String,
    /// Item type. Absent means `Any`.
    #[serde(default)]
    pub items: Option<String>,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Extended annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

/// A map definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTypeDef {
    /// Type name.
    pub name: String,
    /// `Map` or another map type.
    #[serde(rename = "type", default = "map_base")]
    pub type_ref: String,
    /// Key type. Absent means `Any`.
    #[serde(default)]
    pub keys: Option<String>,
    /// Item type. Absent means `Any`.
    #[serde(default)]
    pub items: Option<String>,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Extended annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

/// A named scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasTypeDef {
    /// Type name.
    pub name: String,
    /// The aliased scalar or another alias.
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Extended annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

fn struct_base() -> String {
    "Struct".into()
}

fn union_base() -> String {
    "Union".into()
}

fn enum_base() -> String {
    "Enum".into()
}

fn array_base() -> String {
    "Array".into()
}

fn map_base() -> String {
    "Map".into()
}

fn any_type() -> String {
    "Any".into()
}

fn string_type() -> String {
    "String".into()
}

fn ok_status() -> String {
    "OK".into()
}

/// One endpoint definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// HTTP method (`GET`, `POST`, ...).
    pub method: String,
    /// Path template, e.g. `/users/{id}`.
    pub path: String,
    /// Explicit method name, overriding derivation.
    #[serde(default)]
    pub name: Option<String>,
    /// Success payload type. Absent means `Any`.
    #[serde(rename = "type", default = "any_type")]
    pub type_ref: String,
    /// Inputs in declaration order.
    #[serde(default)]
    pub inputs: Vec<ResourceInput>,
    /// Response headers.
    #[serde(default)]
    pub outputs: Vec<ResourceOutput>,
    /// Default success status symbol.
    #[serde(default = "ok_status")]
    pub expected: String,
    /// Additional success status symbols.
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Declared error types keyed by status symbol.
    #[serde(default)]
    pub exceptions: IndexMap<String, ExceptionDef>,
    /// Authentication / authorization requirement.
    #[serde(default)]
    pub auth: Option<ResourceAuth>,
    /// Whether completion is asynchronous.
    #[serde(rename = "async", default)]
    pub is_async: Option<bool>,
    /// Response media types.
    #[serde(default)]
    pub produces: Vec<String>,
    /// Request media types.
    #[serde(default)]
    pub consumes: Vec<String>,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Extended annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

impl Resource {
    /// True when the resource is marked asynchronous.
    pub fn is_async(&self) -> bool {
        self.is_async.unwrap_or(false)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method.to_uppercase(), self.path)
    }
}

/// One resource input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Whether the input may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Default value.
    #[serde(default)]
    pub default: Option<JsonValue>,
    /// Bound to a `{name}` path segment.
    #[serde(default)]
    pub path_param: bool,
    /// Bound to this query parameter.
    #[serde(default)]
    pub query_param: Option<String>,
    /// Bound to this request header.
    #[serde(default)]
    pub header: Option<String>,
    /// Legacy v1 context marker; such inputs are ignored.
    #[serde(default)]
    pub context: Option<String>,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
    /// Extended annotations.
    #[serde(default)]
    pub annotations: Annotations,
}

impl ResourceInput {
    /// The query parameter name, ignoring empty strings.
    pub fn query_name(&self) -> Option<&str> {
        self.query_param.as_deref().filter(|q| !q.is_empty())
    }

    /// The header name, ignoring empty strings.
    pub fn header_name(&self) -> Option<&str> {
        self.header.as_deref().filter(|h| !h.is_empty())
    }

    /// True for legacy context inputs.
    pub fn is_context(&self) -> bool {
        self.context.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// A response header attached to a successful result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceOutput {
    /// Variable name.
    pub name: String,
    /// Value type. Absent means `String`.
    #[serde(rename = "type", default = "string_type")]
    pub type_ref: String,
    /// Header name on the wire.
    pub header: String,
    /// Whether the header may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
}

/// A declared exception type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionDef {
    /// The error payload type.
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Description.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Authentication / authorization spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAuth {
    /// Only authentication is required.
    #[serde(default)]
    pub authenticate: bool,
    /// Action to authorize.
    #[serde(default)]
    pub action: Option<String>,
    /// Resource template to authorize against (may embed `{param}`).
    #[serde(default)]
    pub resource: Option<String>,
    /// Trusted domain.
    #[serde(default)]
    pub domain: Option<String>,
}

/// The fixed set of built-in base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    /// Boolean.
    Bool,
    /// 8-bit integer.
    Int8,
    /// 16-bit integer.
    Int16,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Raw bytes.
    Bytes,
    /// Text.
    String,
    /// Point in time.
    Timestamp,
    /// Identifier-like text.
    Symbol,
    /// UUID.
    #[serde(rename = "UUID")]
    Uuid,
    /// Sequence.
    Array,
    /// Keyed collection.
    Map,
    /// Record.
    Struct,
    /// Closed set of symbols.
    Enum,
    /// Sum type.
    Union,
    /// Anything.
    Any,
}

impl BaseType {
    /// Looks up a built-in by its schema spelling.
    pub fn from_builtin(name: &str) -> Option<Self> {
        let bt = match name {
            "Bool" => BaseType::Bool,
            "Int8" => BaseType::Int8,
            "Int16" => BaseType::Int16,
            "Int32" => BaseType::Int32,
            "Int64" => BaseType::Int64,
            "Float32" => BaseType::Float32,
            "Float64" => BaseType::Float64,
            "Bytes" => BaseType::Bytes,
            "String" => BaseType::String,
            "Timestamp" => BaseType::Timestamp,
            "Symbol" => BaseType::Symbol,
            "UUID" => BaseType::Uuid,
            "Array" => BaseType::Array,
            "Map" => BaseType::Map,
            "Struct" => BaseType::Struct,
            "Enum" => BaseType::Enum,
            "Union" => BaseType::Union,
            "Any" => BaseType::Any,
            _ => return None,
        };
        Some(bt)
    }

    /// True for the fixed-width scalars that have an unboxed form.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            BaseType::Bool
                | BaseType::Int8
                | BaseType::Int16
                | BaseType::Int32
                | BaseType::Int64
                | BaseType::Float32
                | BaseType::Float64
        )
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BaseType::Bool => "Bool",
            BaseType::Int8 => "Int8",
            BaseType::Int16 => "Int16",
            BaseType::Int32 => "Int32",
            BaseType::Int64 => "Int64",
            BaseType::Float32 => "Float32",
            BaseType::Float64 => "Float64",
            BaseType::Bytes => "Bytes",
            BaseType::String => "String",
            BaseType::Timestamp => "Timestamp",
            BaseType::Symbol => "Symbol",
            BaseType::Uuid => "UUID",
            BaseType::Array => "Array",
            BaseType::Map => "Map",
            BaseType::Struct => "Struct",
            BaseType::Enum => "Enum",
            BaseType::Union => "Union",
            BaseType::Any => "Any",
        };
        f.write_str(s)
    }
}
