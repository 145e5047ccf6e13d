#![deny(missing_docs)]

//! # Type Registry
//!
//! Name-indexed lookup over a schema's type definitions.
//!
//! Every supertype walk goes through [`TypeRegistry::chain`], which tracks the
//! names it has visited so a definition that eventually derives from itself
//! is reported as [`AppError::CyclicType`] instead of recursing forever.

use crate::error::{AppError, AppResult, ErrorContext};
use crate::schema::models::{
    Annotations, BaseType, EnumTypeDef, Schema, StructFieldDef, StructTypeDef, TypeDef,
    UnionTypeDef,
};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A type reference looked up in the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeEntry<'a> {
    /// One of the built-in base types.
    Builtin(BaseType),
    /// A user-defined type.
    Defined(&'a TypeDef),
}

/// The supertype chain of a reference: user definitions nearest-first, then
/// the built-in base type at the root.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeChain<'a> {
    /// User definitions from the reference itself up to the last one before the built-in.
    pub defs: Vec<&'a TypeDef>,
    /// The built-in the chain bottoms out in.
    pub base: BaseType,
}

impl<'a> TypeChain<'a> {
    /// The nearest struct, enum or union definition, i.e. the named class.
    pub fn named(&self) -> Option<&'a TypeDef> {
        self.defs
            .iter()
            .copied()
            .find(|d| matches!(d, TypeDef::Struct(_) | TypeDef::Enum(_) | TypeDef::Union(_)))
    }

    /// The nearest declared array item type.
    pub fn array_items(&self) -> Option<&'a str> {
        self.defs.iter().copied().find_map(|d| match d {
            TypeDef::Array(a) => a.items.as_deref(),
            _ => None,
        })
    }

    /// The nearest declared map key and item types.
    pub fn map_keys_items(&self) -> (Option<&'a str>, Option<&'a str>) {
        let keys = self.defs.iter().copied().find_map(|d| match d {
            TypeDef::Map(m) => m.keys.as_deref(),
            _ => None,
        });
        let items = self.defs.iter().copied().find_map(|d| match d {
            TypeDef::Map(m) => m.items.as_deref(),
            _ => None,
        });
        (keys, items)
    }
}

/// Lookup-by-name over one schema.
#[derive(Debug)]
pub struct TypeRegistry<'a> {
    schema: &'a Schema,
    index: HashMap<&'a str, &'a TypeDef>,
}

impl<'a> TypeRegistry<'a> {
    /// Indexes the schema's types. Duplicate names are rejected.
    pub fn new(schema: &'a Schema) -> AppResult<Self> {
        let mut index = HashMap::with_capacity(schema.types.len());
        for def in &schema.types {
            let name = def.name();
            if BaseType::from_builtin(name).is_some() {
                return Err(AppError::invalid(
                    ErrorContext::type_name(name),
                    "type name shadows a built-in base type",
                ));
            }
            if index.insert(name, def).is_some() {
                return Err(AppError::invalid(
                    ErrorContext::type_name(name),
                    "duplicate type name",
                ));
            }
        }
        Ok(Self { schema, index })
    }

    /// The indexed schema.
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Looks up a reference among built-ins and user types.
    pub fn find(&self, name: &str) -> Option<TypeEntry<'a>> {
        if let Some(bt) = BaseType::from_builtin(name) {
            return Some(TypeEntry::Builtin(bt));
        }
        self.index.get(name).map(|d| TypeEntry::Defined(*d))
    }

    /// Looks up a user-defined type only.
    pub fn find_def(&self, name: &str) -> Option<&'a TypeDef> {
        self.index.get(name).copied()
    }

    /// Walks the supertype chain of `name` down to its built-in base.
    pub fn chain(&self, name: &str, context: &ErrorContext) -> AppResult<TypeChain<'a>> {
        let mut defs: Vec<&'a TypeDef> = Vec::new();
        let mut current = name;
        loop {
            match self.find(current) {
                Some(TypeEntry::Builtin(base)) => {
                    if let Some(first) = defs.first() {
                        check_kind(first, base)?;
                    }
                    return Ok(TypeChain { defs, base });
                }
                Some(TypeEntry::Defined(def)) => {
                    if defs.iter().any(|d| d.name() == def.name()) {
                        let mut path: Vec<&str> = defs.iter().map(|d| d.name()).collect();
                        path.push(def.name());
                        return Err(AppError::CyclicType {
                            path: path.join(" -> "),
                        });
                    }
                    defs.push(def);
                    current = def.supertype();
                }
                None => return Err(AppError::unknown_type(current, context.clone())),
            }
        }
    }

    /// The built-in base type of a reference.
    pub fn base_type(&self, name: &str, context: &ErrorContext) -> AppResult<BaseType> {
        Ok(self.chain(name, context)?.base)
    }

    /// The nearest declared item type of an array reference.
    pub fn array_items(&self, name: &str, context: &ErrorContext) -> AppResult<Option<&'a str>> {
        Ok(self.chain(name, context)?.array_items())
    }

    /// The nearest declared key and item types of a map reference.
    pub fn map_keys_items(
        &self,
        name: &str,
        context: &ErrorContext,
    ) -> AppResult<(Option<&'a str>, Option<&'a str>)> {
        Ok(self.chain(name, context)?.map_keys_items())
    }

    /// The struct declared under exactly `name`.
    ///
    /// Aliases and supertypes are not followed; use [`TypeRegistry::chain`]
    /// for that.
    pub fn struct_def(&self, name: &str) -> Option<&'a StructTypeDef> {
        match self.find_def(name)? {
            TypeDef::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// The enum definition behind a reference, following aliases.
    pub fn enum_def(&self, name: &str, context: &ErrorContext) -> AppResult<Option<&'a EnumTypeDef>> {
        let chain = self.chain(name, context)?;
        Ok(chain.defs.iter().copied().find_map(|d| match d {
            TypeDef::Enum(e) => Some(e),
            _ => None,
        }))
    }

    /// The union declared under exactly `name`. Aliases are not followed.
    pub fn union_def(&self, name: &str) -> Option<&'a UnionTypeDef> {
        match self.find_def(name)? {
            TypeDef::Union(u) => Some(u),
            _ => None,
        }
    }

    /// All fields of a struct, supertype fields first.
    ///
    /// A field redeclared by a descendant keeps its inherited position but
    /// takes the descendant's definition.
    pub fn flattened_fields(&self, def: &StructTypeDef) -> AppResult<Vec<&'a StructFieldDef>> {
        let context = ErrorContext::type_name(&def.name);
        let chain = self.chain(&def.name, &context)?;
        let mut fields: IndexMap<&'a str, &'a StructFieldDef> = IndexMap::new();
        for ancestor in chain.defs.iter().copied().rev() {
            if let TypeDef::Struct(s) = ancestor {
                for field in &s.fields {
                    fields.insert(field.name.as_str(), field);
                }
            }
        }
        Ok(fields.into_values().collect())
    }

    /// The annotations declared on a user-defined type, when non-empty.
    pub fn annotations_of(&self, name: &str) -> Option<&'a Annotations> {
        self.find_def(name)
            .map(|d| d.annotations())
            .filter(|a| !a.is_empty())
    }
}

fn check_kind(def: &TypeDef, base: BaseType) -> AppResult<()> {
    let expected = match def {
        TypeDef::Struct(_) => Some(BaseType::Struct),
        TypeDef::Union(_) => Some(BaseType::Union),
        TypeDef::Enum(_) => Some(BaseType::Enum),
        TypeDef::Array(_) => Some(BaseType::Array),
        TypeDef::Map(_) => Some(BaseType::Map),
        TypeDef::Alias(_) => None,
    };
    match expected {
        Some(kind) if kind != base => Err(AppError::invalid(
            ErrorContext::type_name(def.name()),
            format!("declared as {} but derives from {}", kind, base),
        )),
        _ => Ok(()),
    }
}
