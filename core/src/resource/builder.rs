#![deny(missing_docs)]

//! # Resource Analyzer
//!
//! Turns one schema `Resource` into a [`ResolvedResource`]: method name,
//! parameters, handler contract, result wrapper, status expectations,
//! exception dispatch, auth and media types.

use crate::annotations::{AnnotationMapper, AnnotationSite, ValidationGroups};
use crate::config::GeneratorConfig;
use crate::error::{AppResult, ErrorContext};
use crate::resolver::naming::{
    capitalize, derive_method_name_from_path, derive_method_name_from_type, path_param_name,
    resource_path, uncapitalize,
};
use crate::resolver::{ResolvedType, TypeResolver};
use crate::resource::params::{
    positional_binding, resolve_params, ParamBinding, ResolvedParam,
};
use crate::resource::responses::{
    handler_return, needs_result_wrapper, result_wrapper, ExceptionDispatch, Expectations,
    HandlerReturn, ResultWrapper,
};
use crate::schema::Resource;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Media type used when a resource declares none.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json;charset=utf-8";

/// One piece of an authorization resource template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplatePart {
    /// Literal text.
    Literal(String),
    /// A `{param}` reference to a handler parameter.
    Param(String),
}

/// Access control required before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthRequirement {
    /// The caller must be authenticated.
    Authenticate,
    /// The caller must be authorized for an action on a resource.
    Authorize {
        /// The action name.
        action: String,
        /// The resource template.
        resource: Vec<TemplatePart>,
        /// The trusted domain, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        domain: Option<String>,
    },
}

/// Splits `user.{id}.posts` into literal and parameter parts.
pub fn split_template(template: &str) -> Vec<TemplatePart> {
    let mut parts = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            break;
        };
        if open > 0 {
            parts.push(TemplatePart::Literal(rest[..open].to_string()));
        }
        parts.push(TemplatePart::Param(rest[open + 1..close].to_string()));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        parts.push(TemplatePart::Literal(rest.to_string()));
    }
    parts
}

/// Everything the renderer needs to emit one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedResource {
    /// Generated method name.
    pub method_name: String,
    /// Upper-case HTTP method.
    pub http_method: String,
    /// Path with any query template removed.
    pub path: String,
    /// Path as declared.
    pub declared_path: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Handler parameters in declaration order.
    pub params: Vec<ResolvedParam>,
    /// Success payload type.
    pub return_type: ResolvedType,
    /// Handler contract.
    pub handler_return: HandlerReturn,
    /// True when outputs or async completion require a wrapper.
    pub needs_result_wrapper: bool,
    /// The wrapper descriptor, when needed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_wrapper: Option<ResultWrapper>,
    /// Success statuses.
    pub expectations: Expectations,
    /// Error statuses.
    pub exceptions: ExceptionDispatch,
    /// Access control.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthRequirement>,
    /// Response media types.
    pub produces: Vec<String>,
    /// Request media types, only for POST and PUT.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    /// Imports required by parameter types and directives.
    pub imports: BTreeSet<String>,
}

impl ResolvedResource {
    /// The request payload parameter, if any.
    pub fn body_param(&self) -> Option<&ResolvedParam> {
        self.params.iter().find(|p| p.binding == ParamBinding::Body)
    }

    /// Parameters with the given binding.
    pub fn params_bound(&self, binding: ParamBinding) -> impl Iterator<Item = &ResolvedParam> {
        self.params.iter().filter(move |p| p.binding == binding)
    }
}

/// Analyzes resources of one schema.
#[derive(Debug, Clone, Copy)]
pub struct ResourceAnalyzer<'a> {
    resolver: TypeResolver<'a>,
    config: &'a GeneratorConfig,
    mapper: AnnotationMapper,
}

impl<'a> ResourceAnalyzer<'a> {
    /// Creates an analyzer over the resolver's schema.
    pub fn new(resolver: TypeResolver<'a>, config: &'a GeneratorConfig) -> Self {
        Self {
            resolver,
            config,
            mapper: AnnotationMapper::new(AnnotationSite::Parameter, config.generate_annotations),
        }
    }

    /// Derives the generated method name.
    ///
    /// An explicit name wins; otherwise the path or the payload type is used
    /// depending on `use_path_naming`.
    pub fn method_name(&self, resource: &Resource) -> AppResult<String> {
        if let Some(name) = resource.name.as_deref().filter(|n| !n.is_empty()) {
            return Ok(uncapitalize(name));
        }
        if self.config.use_path_naming {
            return Ok(derive_method_name_from_path(&resource.method, &resource.path));
        }
        let context = ErrorContext::resource(resource.to_string());
        let mut candidates = Vec::new();
        for input in resource.inputs.iter().filter(|i| !i.is_context()) {
            if positional_binding(input, &context)?.is_none() {
                candidates.push(input);
            }
        }
        let body_type = match candidates.as_slice() {
            [only] => only.type_ref.as_str(),
            _ => resource.type_ref.as_str(),
        };
        Ok(derive_method_name_from_type(&resource.method, body_type))
    }

    /// Fully resolves one resource, recording validation groups into `groups`.
    pub fn analyze(
        &self,
        resource: &Resource,
        groups: &mut ValidationGroups,
    ) -> AppResult<ResolvedResource> {
        let method_name = self.method_name(resource)?;
        let context = ErrorContext::resource(&method_name);
        debug!(resource = %resource, method = %method_name, "analyzing resource");

        let params = resolve_params(resource, &self.resolver, &self.mapper, groups, &context)?;
        let return_type = self.resolver.resolve_in(
            &resource.type_ref,
            true,
            None,
            None,
            &context.with_field("type"),
        )?;

        let needs_wrapper = needs_result_wrapper(resource);
        let wrapper = if needs_wrapper {
            let waiter_keys = params
                .iter()
                .filter(|p| p.binding == ParamBinding::Path)
                .map(|p| p.name.clone())
                .collect();
            Some(result_wrapper(
                resource,
                format!("{}Result", capitalize(&method_name)),
                return_type.clone(),
                waiter_keys,
                &self.resolver,
                &context,
            )?)
        } else {
            None
        };
        let handler = handler_return(resource, wrapper.as_ref(), &return_type);

        let expectations = Expectations::of(resource, &context)?;
        let exceptions = ExceptionDispatch::of(
            resource,
            &method_name,
            &expectations,
            &return_type,
            self.config.undeclared_exceptions,
            &self.resolver,
            &context,
        )?;

        let mut imports = BTreeSet::new();
        for p in &params {
            imports.extend(p.param_type.imports.iter().cloned());
            for d in &p.directives {
                imports.extend(d.imports.iter().cloned());
            }
        }
        imports.extend(return_type.imports.iter().cloned());

        Ok(ResolvedResource {
            http_method: resource.method.to_uppercase(),
            path: resource_path(&resource.path).to_string(),
            declared_path: resource.path.clone(),
            comment: resource.comment.clone(),
            auth: auth_requirement(resource, &method_name),
            produces: produces(resource),
            consumes: consumes(resource),
            params,
            return_type,
            handler_return: handler,
            needs_result_wrapper: needs_wrapper,
            result_wrapper: wrapper,
            expectations,
            exceptions,
            imports,
            method_name,
        })
    }
}

fn auth_requirement(resource: &Resource, method_name: &str) -> Option<AuthRequirement> {
    let auth = resource.auth.as_ref()?;
    if auth.authenticate {
        return Some(AuthRequirement::Authenticate);
    }
    match (auth.action.as_deref(), auth.resource.as_deref()) {
        (Some(action), Some(template)) if !action.is_empty() && !template.is_empty() => {
            let parts = split_template(template);
            for part in &parts {
                if let TemplatePart::Param(name) = part {
                    let known = resource.inputs.iter().any(|i| &i.name == name)
                        || resource_path(&resource.path)
                            .split('/')
                            .any(|s| path_param_name(s) == Some(name.as_str()));
                    if !known {
                        warn!(method = method_name, param = %name, "auth template references unknown input");
                    }
                }
            }
            Some(AuthRequirement::Authorize {
                action: action.to_string(),
                resource: parts,
                domain: auth.domain.clone().filter(|d| !d.is_empty()),
            })
        }
        _ => {
            warn!(method = method_name, "badly formed auth spec in resource input");
            None
        }
    }
}

fn produces(resource: &Resource) -> Vec<String> {
    if resource.produces.is_empty() {
        vec![DEFAULT_MEDIA_TYPE.to_string()]
    } else {
        resource.produces.clone()
    }
}

fn consumes(resource: &Resource) -> Vec<String> {
    match resource.method.to_uppercase().as_str() {
        "POST" | "PUT" if resource.consumes.is_empty() => vec![DEFAULT_MEDIA_TYPE.to_string()],
        "POST" | "PUT" => resource.consumes.clone(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, TypeRegistry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(resources: serde_json::Value) -> Schema {
        serde_json::from_value(json!({
            "name": "sample",
            "types": [
                {"kind": "struct", "name": "User", "fields": [{"name": "id", "type": "Int32"}]},
                {"kind": "struct", "name": "Problem", "fields": []}
            ],
            "resources": resources
        }))
        .unwrap()
    }

    fn analyze_with(
        s: &Schema,
        config: &GeneratorConfig,
    ) -> AppResult<(Vec<ResolvedResource>, ValidationGroups)> {
        let reg = TypeRegistry::new(s)?;
        let analyzer = ResourceAnalyzer::new(TypeResolver::new(&reg, config), config);
        let mut groups = ValidationGroups::new();
        let out = s
            .resources
            .iter()
            .map(|r| analyzer.analyze(r, &mut groups))
            .collect::<AppResult<Vec<_>>>()?;
        Ok((out, groups))
    }

    #[test]
    fn test_method_name_priorities() {
        let s = schema(json!([
            {"method": "GET", "path": "/users/{id}", "name": "FetchUser", "type": "User"},
            {"method": "GET", "path": "/users/{id}", "type": "User",
             "inputs": [{"name": "id", "type": "Int32", "pathParam": true}]},
            {"method": "POST", "path": "/users", "type": "Problem",
             "inputs": [{"name": "user", "type": "User"}]}
        ]));
        let reg = TypeRegistry::new(&s).unwrap();
        let by_type = GeneratorConfig::default();
        let analyzer = ResourceAnalyzer::new(TypeResolver::new(&reg, &by_type), &by_type);
        assert_eq!(analyzer.method_name(&s.resources[0]).unwrap(), "fetchUser");
        assert_eq!(analyzer.method_name(&s.resources[1]).unwrap(), "getUser");
        assert_eq!(analyzer.method_name(&s.resources[2]).unwrap(), "postUser");

        let by_path = GeneratorConfig {
            use_path_naming: true,
            ..GeneratorConfig::default()
        };
        let analyzer = ResourceAnalyzer::new(TypeResolver::new(&reg, &by_path), &by_path);
        assert_eq!(analyzer.method_name(&s.resources[1]).unwrap(), "getUsersById");
        assert_eq!(analyzer.method_name(&s.resources[2]).unwrap(), "postUsers");
    }

    #[test]
    fn test_split_template() {
        assert_eq!(
            split_template("user.{id}.post.{postId}"),
            vec![
                TemplatePart::Literal("user.".into()),
                TemplatePart::Param("id".into()),
                TemplatePart::Literal(".post.".into()),
                TemplatePart::Param("postId".into()),
            ]
        );
        assert_eq!(split_template("{id}"), vec![TemplatePart::Param("id".into())]);
        assert_eq!(split_template("plain{"), vec![TemplatePart::Literal("plain{".into())]);
    }

    #[test]
    fn test_auth_and_media_types() {
        let s = schema(json!([
            {"method": "PUT", "path": "/users/{id}", "type": "User",
             "inputs": [{"name": "id", "type": "Int32", "pathParam": true}, {"name": "u", "type": "User"}],
             "auth": {"action": "update", "resource": "user.{id}"}},
            {"method": "GET", "path": "/me", "type": "User", "auth": {"authenticate": true},
             "produces": ["application/xml"]},
            {"method": "DELETE", "path": "/me", "type": "User", "auth": {"action": "delete"}}
        ]));
        let (out, _) = analyze_with(&s, &GeneratorConfig::default()).unwrap();
        assert_eq!(
            out[0].auth,
            Some(AuthRequirement::Authorize {
                action: "update".into(),
                resource: vec![
                    TemplatePart::Literal("user.".into()),
                    TemplatePart::Param("id".into())
                ],
                domain: None,
            })
        );
        assert_eq!(out[0].consumes, vec![DEFAULT_MEDIA_TYPE]);
        assert_eq!(out[0].produces, vec![DEFAULT_MEDIA_TYPE]);
        assert_eq!(out[1].auth, Some(AuthRequirement::Authenticate));
        assert_eq!(out[1].produces, vec!["application/xml"]);
        assert!(out[1].consumes.is_empty());
        assert_eq!(out[2].auth, None);
    }

    #[test]
    fn test_wrapper_and_imports() {
        let s = schema(json!([
            {"method": "GET", "path": "/users/{id}?at={at}", "type": "User", "async": true,
             "inputs": [
                {"name": "id", "type": "UUID", "pathParam": true},
                {"name": "at", "type": "Timestamp", "queryParam": "at", "optional": true}
             ]}
        ]));
        let (out, _) = analyze_with(&s, &GeneratorConfig::default()).unwrap();
        let r = &out[0];
        assert_eq!(r.path, "/users/{id}");
        assert!(r.needs_result_wrapper);
        let wrapper = r.result_wrapper.as_ref().unwrap();
        assert_eq!(wrapper.class_name, "GetUserResult");
        assert_eq!(wrapper.waiter_keys, vec!["id"]);
        assert_eq!(
            r.imports.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["java.time.OffsetDateTime", "java.util.UUID"]
        );
    }

    #[test]
    fn test_unknown_status_symbol_is_invalid() {
        let s = schema(json!([{"method": "GET", "path": "/u", "type": "User", "expected": "YAY"}]));
        let err = analyze_with(&s, &GeneratorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("unknown status symbol 'YAY'"));
    }
}
