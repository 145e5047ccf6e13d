#![deny(missing_docs)]

//! # Type Resolution
//!
//! Maps a schema type reference (plus optionality and item/key overrides) to
//! the target representation consumed by the renderer.
//!
//! - Scalars are primitive unless optional or used as a generic argument.
//! - `Array` -> `List<T>`, `Map` -> `Map<K, V>`, items default to `Any`.
//! - Structs, enums and unions resolve to their generated class name.
//! - Shapes with no target mapping fall back to an opaque `Object`.

use crate::config::GeneratorConfig;
use crate::error::{AppError, AppResult, ErrorContext};
use crate::resolver::naming;
use crate::schema::{BaseType, StructFieldDef, TypeRegistry};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// A fully resolved target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedType {
    /// Target type name, e.g. `int`, `List<String>`, `UserV2`.
    pub name: String,
    /// The schema reference this was resolved from.
    pub type_ref: String,
    /// Base kind of the reference.
    pub kind: BaseType,
    /// False only for unboxed primitives.
    pub boxed: bool,
    /// True when the shape had no mapping and fell back to `Object`.
    pub opaque: bool,
    /// Generic arguments (`List` item, `Map` key and value).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ResolvedType>,
    /// Imports needed by this type and its arguments.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub imports: BTreeSet<String>,
}

impl ResolvedType {
    fn new(name: impl Into<String>, kind: BaseType, boxed: bool) -> Self {
        Self {
            name: name.into(),
            type_ref: String::new(),
            kind,
            boxed,
            opaque: false,
            args: Vec::new(),
            imports: BTreeSet::new(),
        }
    }

    fn with_import(mut self, import: &str) -> Self {
        self.imports.insert(import.to_string());
        self
    }

    fn generic(name: String, kind: BaseType, args: Vec<ResolvedType>, import: &str) -> Self {
        let mut resolved = Self::new(name, kind, true).with_import(import);
        for arg in &args {
            resolved.imports.extend(arg.imports.iter().cloned());
        }
        resolved.args = args;
        resolved
    }

    fn opaque(kind: BaseType) -> Self {
        Self {
            opaque: true,
            ..Self::new("Object", kind, true)
        }
    }

    /// True for unboxed primitives (`int`, `boolean`, ...).
    pub fn is_primitive(&self) -> bool {
        !self.boxed
    }

    /// True for structs, enums and unions.
    pub fn is_named(&self) -> bool {
        !self.opaque && matches!(self.kind, BaseType::Struct | BaseType::Enum | BaseType::Union)
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolves type references against one schema.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    registry: &'a TypeRegistry<'a>,
    version: i32,
    suffix: &'static str,
}

impl<'a> TypeResolver<'a> {
    /// Creates a resolver using the schema version and the class suffix switch.
    pub fn new(registry: &'a TypeRegistry<'a>, config: &GeneratorConfig) -> Self {
        Self {
            registry,
            version: registry.schema().version(),
            suffix: config.class_suffix(),
        }
    }

    /// The registry this resolver reads from.
    pub fn registry(&self) -> &'a TypeRegistry<'a> {
        self.registry
    }

    /// Generated class name for a schema type name.
    pub fn class_name(&self, name: &str) -> String {
        naming::class_name(name, self.version, self.suffix)
    }

    /// Resolves a reference with no location context.
    pub fn resolve(
        &self,
        type_ref: &str,
        optional: bool,
        items: Option<&str>,
        keys: Option<&str>,
    ) -> AppResult<ResolvedType> {
        self.resolve_in(type_ref, optional, items, keys, &ErrorContext::none())
    }

    /// Resolves a reference, attaching `context` to any failure.
    pub fn resolve_in(
        &self,
        type_ref: &str,
        optional: bool,
        items: Option<&str>,
        keys: Option<&str>,
        context: &ErrorContext,
    ) -> AppResult<ResolvedType> {
        let mut stack = Vec::new();
        self.resolve_inner(type_ref, optional, items, keys, context, &mut stack)
    }

    /// Resolves a struct field honouring its optional flag and overrides.
    pub fn resolve_field(
        &self,
        field: &StructFieldDef,
        context: &ErrorContext,
    ) -> AppResult<ResolvedType> {
        self.resolve_in(
            &field.type_ref,
            field.optional,
            field.items.as_deref(),
            field.keys.as_deref(),
            &context.with_field(&field.name),
        )
    }

    fn resolve_inner(
        &self,
        type_ref: &str,
        boxed: bool,
        items: Option<&str>,
        keys: Option<&str>,
        context: &ErrorContext,
        stack: &mut Vec<String>,
    ) -> AppResult<ResolvedType> {
        if stack.iter().any(|s| s == type_ref) {
            let mut path = stack.clone();
            path.push(type_ref.to_string());
            return Err(AppError::CyclicType {
                path: path.join(" -> "),
            });
        }
        let chain = self.registry.chain(type_ref, context)?;
        let mut resolved = match chain.base {
            BaseType::Array => {
                let item_ref = items.or(chain.array_items()).unwrap_or("Any");
                let item = self.resolve_arg(type_ref, item_ref, context, stack)?;
                ResolvedType::generic(
                    format!("List<{}>", item.name),
                    BaseType::Array,
                    vec![item],
                    "java.util.List",
                )
            }
            BaseType::Map => {
                let (declared_keys, declared_items) = chain.map_keys_items();
                let key_ref = keys.or(declared_keys).unwrap_or("Any");
                let item_ref = items.or(declared_items).unwrap_or("Any");
                let key = self.resolve_arg(type_ref, key_ref, context, stack)?;
                let item = self.resolve_arg(type_ref, item_ref, context, stack)?;
                ResolvedType::generic(
                    format!("Map<{}, {}>", key.name, item.name),
                    BaseType::Map,
                    vec![key, item],
                    "java.util.Map",
                )
            }
            kind @ (BaseType::Struct | BaseType::Enum | BaseType::Union) => match chain.named() {
                Some(def) => ResolvedType::new(self.class_name(def.name()), kind, true),
                None => {
                    warn!(
                        type_ref,
                        "no generated class for anonymous {}, using Object{}", kind, context
                    );
                    ResolvedType::opaque(kind)
                }
            },
            scalar => scalar_type(scalar, boxed),
        };
        resolved.type_ref = type_ref.to_string();
        Ok(resolved)
    }

    fn resolve_arg(
        &self,
        owner: &str,
        arg_ref: &str,
        context: &ErrorContext,
        stack: &mut Vec<String>,
    ) -> AppResult<ResolvedType> {
        let tracked = self.registry.find_def(owner).is_some();
        if tracked {
            stack.push(owner.to_string());
        }
        let result = self.resolve_inner(arg_ref, true, None, None, context, stack);
        if tracked {
            stack.pop();
        }
        result
    }
}

fn scalar_type(kind: BaseType, boxed: bool) -> ResolvedType {
    let (primitive, object) = match kind {
        BaseType::Bool => ("boolean", "Boolean"),
        BaseType::Int8 => ("byte", "Byte"),
        BaseType::Int16 => ("short", "Short"),
        BaseType::Int32 => ("int", "Integer"),
        BaseType::Int64 => ("long", "Long"),
        BaseType::Float32 => ("float", "Float"),
        BaseType::Float64 => ("double", "Double"),
        BaseType::Bytes => return ResolvedType::new("byte[]", kind, true),
        BaseType::String | BaseType::Symbol => return ResolvedType::new("String", kind, true),
        BaseType::Timestamp => {
            return ResolvedType::new("OffsetDateTime", kind, true)
                .with_import("java.time.OffsetDateTime")
        }
        BaseType::Uuid => return ResolvedType::new("UUID", kind, true).with_import("java.util.UUID"),
        BaseType::Any => return ResolvedType::new("Object", kind, true),
        BaseType::Array | BaseType::Map | BaseType::Struct | BaseType::Enum | BaseType::Union => {
            return ResolvedType::opaque(kind)
        }
    };
    if boxed {
        ResolvedType::new(object, kind, true)
    } else {
        ResolvedType::new(primitive, kind, false)
    }
}
