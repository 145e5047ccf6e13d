#![deny(missing_docs)]

//! # Parameter Resolution
//!
//! Classifies resource inputs into path, query, header and body parameters.
//!
//! At most one input becomes the body: the first body candidate whose type
//! is struct-shaped. Other candidates stay [`ParamBinding::Unbound`].
//! Legacy context inputs are dropped with a warning. A `{name}` path segment
//! without a matching path input gets a synthesized `String` parameter.

use crate::annotations::{effective_annotations, AnnotationMapper, Directive, ValidationGroups};
use crate::error::{AppError, AppResult, ErrorContext};
use crate::resolver::naming::{escape_param_name, path_param_name, resource_path};
use crate::resolver::{DefaultValue, ResolvedType, TypeResolver};
use crate::schema::{BaseType, Resource, ResourceInput};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// How a parameter travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamBinding {
    /// A `{name}` path segment.
    Path,
    /// A query string parameter.
    Query,
    /// A request header.
    Header,
    /// The request payload.
    Body,
    /// A non-positional input that did not qualify as the body.
    Unbound,
}

impl fmt::Display for ParamBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamBinding::Path => "path",
            ParamBinding::Query => "query",
            ParamBinding::Header => "header",
            ParamBinding::Body => "body",
            ParamBinding::Unbound => "unbound",
        };
        f.write_str(s)
    }
}

/// A resolved handler parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParam {
    /// Identifier in generated code, with reserved words escaped.
    pub name: String,
    /// Name as declared in the schema.
    pub schema_name: String,
    /// Wire binding.
    pub binding: ParamBinding,
    /// Path segment, query parameter or header name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wire_name: Option<String>,
    /// Resolved type, always boxed.
    pub param_type: ResolvedType,
    /// Whether the input may be absent.
    pub optional: bool,
    /// Declared default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Validation and injection directives.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Determines the positional binding of an input.
///
/// Returns `None` for body candidates. Marking more than one of
/// path/query/header is rejected.
pub fn positional_binding(
    input: &ResourceInput,
    context: &ErrorContext,
) -> AppResult<Option<(ParamBinding, String)>> {
    let mut marks = Vec::new();
    if input.path_param {
        marks.push((ParamBinding::Path, input.name.clone()));
    }
    if let Some(q) = input.query_name() {
        marks.push((ParamBinding::Query, q.to_string()));
    }
    if let Some(h) = input.header_name() {
        marks.push((ParamBinding::Header, h.to_string()));
    }
    if marks.len() > 1 {
        let kinds: Vec<String> = marks.iter().map(|(b, _)| b.to_string()).collect();
        return Err(AppError::invalid(
            context.with_field(&input.name),
            format!("input is bound to more than one of {}", kinds.join(", ")),
        ));
    }
    Ok(marks.pop())
}

/// Inputs that take part in the handler signature.
pub fn active_inputs(resource: &Resource) -> impl Iterator<Item = &ResourceInput> {
    resource.inputs.iter().filter(|input| {
        if input.is_context() {
            warn!(
                input = %input.name,
                context = input.context.as_deref().unwrap_or_default(),
                "v1 style context param ignored"
            );
            false
        } else {
            true
        }
    })
}

/// Resolves every active input of `resource` in declaration order.
pub fn resolve_params(
    resource: &Resource,
    resolver: &TypeResolver<'_>,
    mapper: &AnnotationMapper,
    groups: &mut ValidationGroups,
    context: &ErrorContext,
) -> AppResult<Vec<ResolvedParam>> {
    let registry = resolver.registry();
    let path = resource_path(&resource.path);
    let mut params = Vec::new();
    let mut body_taken = false;

    for input in active_inputs(resource) {
        let input_ctx = context.with_field(&input.name);
        let param_type = resolver.resolve_in(&input.type_ref, true, None, None, &input_ctx)?;

        let (binding, wire_name) = match positional_binding(input, context)? {
            Some((binding, wire)) => (binding, Some(wire)),
            None if !body_taken && param_type.kind == BaseType::Struct => {
                body_taken = true;
                (ParamBinding::Body, None)
            }
            None => (ParamBinding::Unbound, None),
        };

        if binding == ParamBinding::Path
            && !path.split('/').any(|s| path_param_name(s) == Some(input.name.as_str()))
        {
            warn!(input = %input.name, path = %resource.path, "path param has no matching segment");
        }

        let default = match &input.default {
            Some(value) => {
                let enum_def = registry.enum_def(&input.type_ref, &input_ctx)?;
                Some(DefaultValue::from_json(value, &param_type, enum_def, &input_ctx)?)
            }
            None => None,
        };

        let mut directives = match effective_annotations(
            &input.annotations,
            registry.annotations_of(&input.type_ref),
        ) {
            Some(annotations) => mapper.map(annotations, groups),
            None => Vec::new(),
        };
        if binding == ParamBinding::Query {
            if let Some(d) = &default {
                directives.push(Directive::default_value(&d.text()));
            }
        }

        params.push(ResolvedParam {
            name: escape_param_name(&input.name),
            schema_name: input.name.clone(),
            binding,
            wire_name,
            param_type,
            optional: input.optional,
            default,
            directives,
            comment: input.comment.clone(),
        });
    }

    for segment in path.split('/').filter_map(path_param_name) {
        let bound = params
            .iter()
            .any(|p| p.binding == ParamBinding::Path && p.schema_name == segment);
        if bound {
            continue;
        }
        warn!(segment, path = %resource.path, "path segment has no input, using String");
        params.push(ResolvedParam {
            name: escape_param_name(segment),
            schema_name: segment.to_string(),
            binding: ParamBinding::Path,
            wire_name: Some(segment.to_string()),
            param_type: resolver.resolve_in(
                "String",
                true,
                None,
                None,
                &context.with_field(segment),
            )?,
            optional: false,
            default: None,
            directives: Vec::new(),
            comment: None,
        });
    }
    Ok(params)
}
