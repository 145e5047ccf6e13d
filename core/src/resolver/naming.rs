#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helper functions for deriving target-safe names from schema identifiers,
//! HTTP methods and URL paths.

/// Upper-cases the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first character.
pub fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Accessor-suffix casing: like [`capitalize`], except that names whose
/// second character is already upper case (`eTag`) are left untouched.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(a), Some(b)) if a.is_lowercase() && b.is_uppercase() => s.to_string(),
        _ => capitalize(s),
    }
}

/// Prefixes parameter names that collide with target keywords.
pub fn escape_param_name(name: &str) -> String {
    match name {
        "type" | "default" => format!("_{}", name),
        _ => name.to_string(),
    }
}

/// Prefixes field names that collide with target keywords.
pub fn escape_field_name(name: &str) -> String {
    match name {
        "default" => format!("_{}", name),
        _ => name.to_string(),
    }
}

/// Generated class name for a schema type or service.
///
/// e.g. `user` at version 2 with the suffix enabled -> `UserV2_Pc`
pub fn class_name(name: &str, version: i32, suffix: &str) -> String {
    let mut out = capitalize(name);
    if version > 1 {
        out.push_str(&format!("V{}", version));
    }
    out.push_str(suffix);
    out
}

/// Strips the query template (`?limit={limit}`) from a resource path.
pub fn resource_path(path: &str) -> &str {
    match path.find('?') {
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// Extracts the name of a `{param}` path segment.
pub fn path_param_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|s| !s.is_empty())
}

/// Derives a method name from the HTTP method and URL path.
///
/// e.g. `GET /users/{id}/posts/{postId}` -> `getUsersByIdPostsAndPostId`
pub fn derive_method_name_from_path(method: &str, path: &str) -> String {
    let mut name = method.to_lowercase();
    let mut params_seen = 0usize;
    for segment in resource_path(path).split('/').filter(|s| !s.is_empty()) {
        match path_param_name(segment) {
            Some(param) => {
                name.push_str(if params_seen == 0 { "By" } else { "And" });
                name.push_str(&capitalize(param));
                params_seen += 1;
            }
            None => name.push_str(&capitalize(segment)),
        }
    }
    name
}

/// Identifier form of a possibly qualified type reference.
///
/// e.g. `common.user` -> `CommonUser`
pub fn type_var_name(type_ref: &str) -> String {
    type_ref
        .split('.')
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .collect()
}

/// Derives a method name from the HTTP method and the payload type.
///
/// e.g. `POST` + `User` -> `postUser`
pub fn derive_method_name_from_type(method: &str, body_type: &str) -> String {
    format!("{}{}", method.to_lowercase(), type_var_name(body_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_helpers() {
        assert_eq!(capitalize("user"), "User");
        assert_eq!(capitalize(""), "");
        assert_eq!(uncapitalize("GetUser"), "getUser");
        assert_eq!(upper_first("eTag"), "eTag");
        assert_eq!(upper_first("name"), "Name");
    }

    #[test]
    fn test_reserved_names() {
        assert_eq!(escape_param_name("type"), "_type");
        assert_eq!(escape_param_name("default"), "_default");
        assert_eq!(escape_param_name("id"), "id");
        assert_eq!(escape_field_name("type"), "type");
        assert_eq!(escape_field_name("default"), "_default");
    }

    #[test]
    fn test_class_name_versions() {
        assert_eq!(class_name("user", 1, ""), "User");
        assert_eq!(class_name("User", 2, ""), "UserV2");
        assert_eq!(class_name("sample", 3, "_Pc"), "SampleV3_Pc");
    }

    #[test]
    fn test_path_naming_without_params() {
        assert_eq!(derive_method_name_from_path("POST", "/users"), "postUsers");
        assert_eq!(
            derive_method_name_from_path("get", "/users/active/"),
            "getUsersActive"
        );
    }

    #[test]
    fn test_path_naming_by_and() {
        assert_eq!(
            derive_method_name_from_path("GET", "/users/{id}"),
            "getUsersById"
        );
        assert_eq!(
            derive_method_name_from_path("DELETE", "/users/{id}/posts/{postId}"),
            "deleteUsersByIdPostsAndPostId"
        );
        assert_eq!(
            derive_method_name_from_path("GET", "/{a}/{b}/{c}"),
            "getByAAndBAndC"
        );
    }

    #[test]
    fn test_path_naming_ignores_query() {
        assert_eq!(
            derive_method_name_from_path("GET", "/users?limit={limit}"),
            "getUsers"
        );
        assert_eq!(resource_path("/users?limit={limit}"), "/users");
    }

    #[test]
    fn test_type_naming() {
        assert_eq!(derive_method_name_from_type("POST", "User"), "postUser");
        assert_eq!(
            derive_method_name_from_type("PUT", "common.user"),
            "putCommonUser"
        );
        assert_eq!(type_var_name("a.b.Record"), "ABRecord");
    }
}
