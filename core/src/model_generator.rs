#![deny(missing_docs)]

//! # Model Generation
//!
//! Resolves struct and enum type definitions into data model descriptors:
//! flattened fields with target types, validation directives and typed
//! default initializers.

use crate::annotations::{
    effective_annotations, AnnotationMapper, AnnotationSite, Directive, ValidationGroups,
};
use crate::config::GeneratorConfig;
use crate::error::{AppResult, ErrorContext};
use crate::resolver::naming::{escape_field_name, upper_first};
use crate::resolver::{DefaultValue, ResolvedType, TypeResolver};
use crate::schema::{EnumTypeDef, StructTypeDef};
use serde::Serialize;
use std::collections::BTreeSet;

/// A resolved struct field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldModel {
    /// Identifier in generated code.
    pub name: String,
    /// Name as declared (the JSON key).
    pub schema_name: String,
    /// Getter / setter suffix.
    pub accessor: String,
    /// Resolved field type.
    pub field_type: ResolvedType,
    /// Whether the field may be absent.
    pub optional: bool,
    /// Declared default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Directives on the field itself.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    /// Directives for each generic argument, taken from the argument type.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arg_directives: Vec<Vec<Directive>>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One default assignment performed by the zero-argument constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Initializer {
    /// Field identifier.
    pub field: String,
    /// Target-language literal.
    pub literal: String,
}

/// A resolved struct type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructModel {
    /// Generated class name.
    pub class_name: String,
    /// Schema type name.
    pub type_name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Fields, inherited first.
    pub fields: Vec<FieldModel>,
    /// Every declared default, in field order.
    pub initializers: Vec<Initializer>,
    /// True when at least one default differs from the zero value.
    pub has_initializer: bool,
    /// Imports required by field types and directives.
    pub imports: BTreeSet<String>,
}

impl StructModel {
    /// Looks up a field by its declared name.
    pub fn field(&self, schema_name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.schema_name == schema_name)
    }
}

/// One enum symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumSymbol {
    /// The symbol.
    pub symbol: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A resolved enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumModel {
    /// Generated class name.
    pub class_name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Symbols in declaration order.
    pub symbols: Vec<EnumSymbol>,
}

/// Builds model descriptors for one schema.
#[derive(Debug, Clone, Copy)]
pub struct ModelGenerator<'a> {
    resolver: TypeResolver<'a>,
    mapper: AnnotationMapper,
}

impl<'a> ModelGenerator<'a> {
    /// Creates a generator in the field annotation dialect.
    pub fn new(resolver: TypeResolver<'a>, config: &GeneratorConfig) -> Self {
        Self {
            resolver,
            mapper: AnnotationMapper::new(AnnotationSite::Field, config.generate_annotations),
        }
    }

    /// Resolves a struct, recording validation groups into `groups`.
    pub fn struct_model(
        &self,
        def: &StructTypeDef,
        groups: &mut ValidationGroups,
    ) -> AppResult<StructModel> {
        let registry = self.resolver.registry();
        let context = ErrorContext::type_name(&def.name);
        let mut fields = Vec::new();
        let mut initializers = Vec::new();
        let mut imports = BTreeSet::new();

        for field in registry.flattened_fields(def)? {
            let field_ctx = context.with_field(&field.name);
            let field_type = self.resolver.resolve_field(field, &context)?;

            let default = match &field.default {
                Some(value) => {
                    let enum_def = registry.enum_def(&field.type_ref, &field_ctx)?;
                    Some(DefaultValue::from_json(value, &field_type, enum_def, &field_ctx)?)
                }
                None => None,
            };

            let directives = match effective_annotations(
                &field.annotations,
                registry.annotations_of(&field.type_ref),
            ) {
                Some(annotations) => self.mapper.map(annotations, groups),
                None => Vec::new(),
            };
            let mut arg_directives: Vec<Vec<Directive>> = field_type
                .args
                .iter()
                .map(|arg| match registry.annotations_of(&arg.type_ref) {
                    Some(annotations) => self.mapper.map(annotations, groups),
                    None => Vec::new(),
                })
                .collect();
            if arg_directives.iter().all(Vec::is_empty) {
                arg_directives.clear();
            }

            imports.extend(field_type.imports.iter().cloned());
            for d in directives.iter().chain(arg_directives.iter().flatten()) {
                imports.extend(d.imports.iter().cloned());
            }

            let name = escape_field_name(&field.name);
            if let Some(value) = &default {
                initializers.push(Initializer {
                    field: name.clone(),
                    literal: value.literal(),
                });
            }
            fields.push(FieldModel {
                accessor: upper_first(&field.name),
                name,
                schema_name: field.name.clone(),
                field_type,
                optional: field.optional,
                default,
                directives,
                arg_directives,
                comment: field.comment.clone(),
            });
        }

        let has_initializer = fields
            .iter()
            .filter_map(|f| f.default.as_ref())
            .any(|d| !d.is_zero());

        Ok(StructModel {
            class_name: self.resolver.class_name(&def.name),
            type_name: def.name.clone(),
            comment: def.comment.clone(),
            fields,
            initializers,
            has_initializer,
            imports,
        })
    }

    /// Resolves an enum.
    pub fn enum_model(&self, def: &EnumTypeDef) -> EnumModel {
        EnumModel {
            class_name: self.resolver.class_name(&def.name),
            comment: def.comment.clone(),
            symbols: def
                .elements
                .iter()
                .map(|e| EnumSymbol {
                    symbol: e.symbol.clone(),
                    comment: e.comment.clone(),
                })
                .collect(),
        }
    }
}
