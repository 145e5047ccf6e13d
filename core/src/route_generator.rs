#![deny(missing_docs)]

//! # Route Generator
//!
//! Produces the path-matching patterns a gateway or filter uses to map an
//! incoming request URI back to the resource that serves it.
//!
//! Every pattern is anchored at the deployment name and the service root:
//! `^{final_name}{root_path}{path}` where `{param}` segments match a single
//! path segment. `GET` routes also accept a trailing query string.

use crate::error::{AppError, AppResult, ErrorContext};
use crate::resolver::naming::resource_path;
use crate::schema::{Resource, Schema};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use url::Url;

/// Matches a `{param}` template segment.
fn param_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[^}]+\}").expect("Invalid regex"))
}

/// One resource's route descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePattern {
    /// HTTP method.
    pub method: String,
    /// Path template as declared.
    pub path: String,
    /// Anchored regular expression matching request URIs.
    pub path_regex: String,
}

impl RoutePattern {
    /// Compiles the pattern.
    pub fn compile(&self) -> AppResult<Regex> {
        Regex::new(&self.path_regex).map_err(|e| {
            AppError::invalid(
                ErrorContext::resource(format!("{} {}", self.method, self.path)),
                format!("route pattern '{}' does not compile: {}", self.path_regex, e),
            )
        })
    }

    /// True when `uri` is served by this route.
    pub fn matches(&self, uri: &str) -> AppResult<bool> {
        Ok(self.compile()?.is_match(uri))
    }
}

/// Root path of the generated service.
///
/// An explicit `base` wins (only its path component when it is an absolute
/// URL); otherwise `/{name}/v{version}`.
pub fn root_path(schema: &Schema) -> String {
    match schema.base.as_deref().filter(|b| !b.is_empty()) {
        Some(base) => match Url::parse(base) {
            Ok(url) if url.has_host() => url.path().trim_end_matches('/').to_string(),
            _ => base.trim_end_matches('/').to_string(),
        },
        None => format!("/{}/v{}", schema.name, schema.version()),
    }
}

/// Translates a path template into a regex fragment.
///
/// e.g. `GET /users/{id}?fields={fields}` -> `/users/[^/]+(/?\?|/?$)`
pub fn path_pattern(method: &str, path: &str) -> String {
    let mut pattern = param_regex()
        .replace_all(resource_path(path), "[^/]+")
        .into_owned();
    if method.eq_ignore_ascii_case("GET") {
        pattern.push_str(r"(/?\?|/?$)");
    } else {
        pattern.push_str("/?$");
    }
    pattern
}

/// Builds the route descriptor for a single resource.
pub fn route_pattern(
    resource: &Resource,
    final_name: &str,
    root: &str,
) -> AppResult<RoutePattern> {
    let route = RoutePattern {
        method: resource.method.clone(),
        path: resource.path.clone(),
        path_regex: format!(
            "^{}{}{}",
            final_name,
            root,
            path_pattern(&resource.method, &resource.path)
        ),
    };
    route.compile()?;
    Ok(route)
}

/// Builds route descriptors for every resource, in declaration order.
pub fn generate_routes(schema: &Schema, final_name: &str) -> AppResult<Vec<RoutePattern>> {
    let root = root_path(schema);
    schema
        .resources
        .iter()
        .map(|r| route_pattern(r, final_name, &root))
        .collect()
}
