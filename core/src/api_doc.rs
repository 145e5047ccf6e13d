#![deny(missing_docs)]

//! # API Documentation
//!
//! Describes the service as a Swagger 2.0 document.
//!
//! The document is built from the same resolution pass the code generator
//! uses, so parameter bindings, success statuses and exception types agree
//! with the generated handlers. Definitions are keyed by schema type name.
//! Unions have no Swagger counterpart and are left out; references to them
//! degrade to a plain object schema.

use crate::config::GeneratorConfig;
use crate::error::{AppResult, ErrorContext};
use crate::generator::{generate, VENDOR_ARTIFACTS};
use crate::resolver::status_message;
use crate::resource::{ParamBinding, ResolvedParam, ResolvedResource, FALLBACK_ERROR_CLASS};
use crate::route_generator::root_path;
use crate::schema::{
    Annotations, BaseType, Resource, Schema, StructFieldDef, TypeDef, TypeRegistry,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

/// Swagger version emitted.
pub const SWAGGER_VERSION: &str = "2.0";

/// Annotation carrying an example value for a field or input.
pub const EXAMPLE_ANNOTATION: &str = "x_example";

/// Resource annotations with this prefix name an operation tag.
pub const TAG_ANNOTATION_PREFIX: &str = "x_tag_";

const JSON_MEDIA_TYPE: &str = "application/json";

const SUPPORTED_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

/// Deployment details that are not part of the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiDocOptions {
    /// Transfer scheme (`http`, `https`, `ws` or `wss`).
    pub scheme: Option<String>,
    /// Host serving the API, e.g. `api.example.com:8080`.
    pub host: Option<String>,
}

/// Base path of the documented API: the deployment name followed by the
/// service root.
pub fn base_path(schema: &Schema, final_name: &str) -> String {
    let prefix = match final_name {
        "" => String::new(),
        name if name.starts_with('/') => name.to_string(),
        name => format!("/{}", name),
    };
    prefix + &root_path(schema)
}

/// Builds the Swagger document of `schema`.
pub fn generate_api_doc(
    schema: &Schema,
    config: &GeneratorConfig,
    options: &ApiDocOptions,
) -> AppResult<Value> {
    let resolved = generate(schema, config)?;
    let registry = TypeRegistry::new(schema)?;
    let doc = ApiDoc {
        registry: &registry,
    };

    let mut root = Map::new();
    root.insert("swagger".into(), json!(SWAGGER_VERSION));
    root.insert("info".into(), info_value(schema));
    if let Some(host) = options.host.as_deref().filter(|h| !h.is_empty()) {
        root.insert("host".into(), json!(host));
    }
    root.insert(
        "basePath".into(),
        json!(base_path(schema, &config.final_name)),
    );
    root.insert("schemes".into(), schemes_value(options.scheme.as_deref()));

    let paths = doc.paths(&schema.resources, &resolved.resources)?;
    if !paths.is_empty() {
        root.insert("paths".into(), Value::Object(paths));
    }

    let vendor_errors = resolved
        .support_artifacts
        .iter()
        .any(|a| a == VENDOR_ARTIFACTS[0]);
    root.insert(
        "definitions".into(),
        Value::Object(doc.definitions(schema, vendor_errors)?),
    );
    info!(schema = %schema.name, resources = resolved.resources.len(), "api doc generated");
    Ok(Value::Object(root))
}

fn info_value(schema: &Schema) -> Value {
    let title = if schema.name.is_empty() {
        "API".to_string()
    } else {
        format!("The {} API", schema.name)
    };
    let mut info = Map::new();
    info.insert("title".into(), json!(title));
    info.insert("version".into(), json!(schema.version().to_string()));
    if let Some(comment) = schema.comment.as_deref().filter(|c| !c.is_empty()) {
        info.insert("description".into(), json!(comment));
    }
    Value::Object(info)
}

fn schemes_value(scheme: Option<&str>) -> Value {
    match scheme.filter(|s| !s.is_empty()) {
        Some(s) if SUPPORTED_SCHEMES.contains(&s) => json!([s]),
        Some(s) => {
            warn!(scheme = s, "unsupported scheme ignored");
            json!([])
        }
        None => json!([]),
    }
}

struct ApiDoc<'r, 'a> {
    registry: &'r TypeRegistry<'a>,
}

impl ApiDoc<'_, '_> {
    /// Schema of a type reference: inline for scalars, a definition
    /// reference for named types.
    fn type_schema(&self, type_ref: &str) -> AppResult<Value> {
        let chain = self
            .registry
            .chain(type_ref, &ErrorContext::type_name(type_ref))?;
        let schema = match chain.base {
            BaseType::Int8 | BaseType::Bytes => json!({"type": "string", "format": "byte"}),
            BaseType::Int16 => json!({"type": "integer", "format": "int16"}),
            BaseType::Int32 => json!({"type": "integer", "format": "int32"}),
            BaseType::Int64 => json!({"type": "integer", "format": "int64"}),
            BaseType::Float32 => json!({"type": "number", "format": "float"}),
            BaseType::Float64 => json!({"type": "number", "format": "double"}),
            BaseType::String => json!({"type": "string"}),
            BaseType::Bool => json!({"type": "boolean"}),
            BaseType::Timestamp => json!({"type": "string", "format": "date-time"}),
            BaseType::Uuid => json!({"type": "string", "format": "uuid"}),
            BaseType::Symbol => json!({"type": "string", "format": "symbol"}),
            BaseType::Any => json!({"type": "object"}),
            BaseType::Union => {
                debug!(type_ref, "union referenced, using plain object");
                json!({"type": "object"})
            }
            BaseType::Struct | BaseType::Enum | BaseType::Array | BaseType::Map => {
                match chain.defs.iter().find(|d| !matches!(d, TypeDef::Alias(_))) {
                    Some(def) => definition_ref(def.name()),
                    None if chain.base == BaseType::Array => json!({"type": "array"}),
                    None => json!({"type": "object"}),
                }
            }
        };
        Ok(schema)
    }

    fn paths(
        &self,
        resources: &[Resource],
        resolved: &[ResolvedResource],
    ) -> AppResult<Map<String, Value>> {
        let mut paths: IndexMap<String, Map<String, Value>> = IndexMap::new();
        for (resource, r) in resources.iter().zip(resolved) {
            let operation = self.operation(resource, r)?;
            paths
                .entry(r.path.clone())
                .or_default()
                .insert(r.http_method.to_lowercase(), operation);
        }
        Ok(paths
            .into_iter()
            .map(|(path, ops)| (path, Value::Object(ops)))
            .collect())
    }

    fn operation(&self, resource: &Resource, r: &ResolvedResource) -> AppResult<Value> {
        let mut op = Map::new();
        let mut tags: Vec<&str> = resource
            .annotations
            .keys()
            .filter_map(|k| k.strip_prefix(TAG_ANNOTATION_PREFIX))
            .collect();
        if tags.is_empty() {
            tags.push(&resource.type_ref);
        }
        op.insert("tags".into(), json!(tags));
        if let Some(comment) = r.comment.as_deref().filter(|c| !c.is_empty()) {
            op.insert("summary".into(), json!(comment));
        }
        op.insert("operationId".into(), json!(r.method_name));
        op.insert("produces".into(), json!([JSON_MEDIA_TYPE]));
        if !r.params.is_empty() && matches!(r.http_method.as_str(), "POST" | "PUT") {
            op.insert("consumes".into(), json!([JSON_MEDIA_TYPE]));
        }

        let mut params = Vec::new();
        for param in &r.params {
            let input = resource.inputs.iter().find(|i| i.name == param.schema_name);
            match self.parameter(param, input.map(|i| (&i.default, &i.annotations)))? {
                Some(value) => params.push(value),
                None => debug!(
                    method = %r.method_name,
                    param = %param.name,
                    "unbound input left out of the api doc"
                ),
            }
        }
        if !params.is_empty() {
            op.insert("parameters".into(), Value::Array(params));
        }
        op.insert("responses".into(), Value::Object(self.responses(r)?));
        Ok(Value::Object(op))
    }

    fn parameter(
        &self,
        param: &ResolvedParam,
        input: Option<(&Option<Value>, &Annotations)>,
    ) -> AppResult<Option<Value>> {
        let location = match param.binding {
            ParamBinding::Path => "path",
            ParamBinding::Query => "query",
            ParamBinding::Header => "header",
            ParamBinding::Body => "body",
            ParamBinding::Unbound => return Ok(None),
        };
        let name = match param.binding {
            ParamBinding::Body => param.schema_name.clone(),
            _ => param
                .wire_name
                .clone()
                .unwrap_or_else(|| param.schema_name.clone()),
        };

        let mut value = Map::new();
        value.insert("name".into(), json!(name));
        value.insert("in".into(), json!(location));
        if let Some(comment) = param.comment.as_deref().filter(|c| !c.is_empty()) {
            value.insert("description".into(), json!(comment));
        }
        value.insert(
            "required".into(),
            json!(param.binding == ParamBinding::Path || !param.optional),
        );

        let schema = self.param_schema(&param.param_type.type_ref, param.binding)?;
        match schema {
            Value::Object(fields)
                if param.binding != ParamBinding::Body && !fields.contains_key("$ref") =>
            {
                value.extend(fields);
            }
            other => {
                value.insert("schema".into(), other);
            }
        }

        if let Some((default, annotations)) = input {
            match (default, annotations.get(EXAMPLE_ANNOTATION)) {
                (Some(d), _) => {
                    value.insert("default".into(), d.clone());
                }
                (None, Some(example)) if !example.is_empty() => {
                    value.insert("default".into(), json!(example));
                }
                _ => {}
            }
        }
        Ok(Some(Value::Object(value)))
    }

    /// Non-body enum parameters list their symbols inline.
    fn param_schema(&self, type_ref: &str, binding: ParamBinding) -> AppResult<Value> {
        if binding != ParamBinding::Body {
            let context = ErrorContext::type_name(type_ref);
            if let Some(def) = self.registry.enum_def(type_ref, &context)? {
                let symbols: Vec<&str> = def.elements.iter().map(|e| e.symbol.as_str()).collect();
                return Ok(json!({"type": "string", "enum": symbols}));
            }
        }
        self.type_schema(type_ref)
    }

    fn responses(&self, r: &ResolvedResource) -> AppResult<Map<String, Value>> {
        let mut responses = Map::new();
        for status in r.expectations.all() {
            let mut response = Map::new();
            response.insert(
                "description".into(),
                json!(status_message(&status.symbol).unwrap_or_default()),
            );
            if status.symbol != "NO_CONTENT" {
                response.insert(
                    "schema".into(),
                    self.type_schema(&r.return_type.type_ref)?,
                );
            }
            responses.insert(status.code.to_string(), Value::Object(response));
        }
        for branch in &r.exceptions.branches {
            let mut description = status_message(&branch.status.symbol).unwrap_or_default();
            if let Some(comment) = branch.comment.as_deref().filter(|c| !c.is_empty()) {
                description = format!("{} - {}", description, comment);
            }
            responses.insert(
                branch.status.code.to_string(),
                json!({
                    "description": description,
                    "schema": self.type_schema(&branch.error_type.type_ref)?,
                }),
            );
        }
        Ok(responses)
    }

    fn definitions(&self, schema: &Schema, vendor_errors: bool) -> AppResult<Map<String, Value>> {
        let mut defs = Map::new();
        for def in &schema.types {
            if let Some(value) = self.definition(def)? {
                defs.insert(def.name().to_string(), value);
            }
        }
        defs.insert(
            FALLBACK_ERROR_CLASS.into(),
            json!({
                "type": "object",
                "required": ["code", "message"],
                "properties": {
                    "code": {"type": "integer", "format": "int32"},
                    "message": {"type": "string"},
                },
            }),
        );
        if vendor_errors {
            let [resource_error, body, detail] = VENDOR_ARTIFACTS;
            defs.insert(
                resource_error.into(),
                json!({
                    "type": "object",
                    "required": ["error"],
                    "properties": {"error": definition_ref(body)},
                }),
            );
            defs.insert(
                body.into(),
                json!({
                    "type": "object",
                    "required": ["message"],
                    "properties": {
                        "code": {"type": "integer", "format": "int32"},
                        "message": {"type": "string"},
                        "detail": {"type": "array", "items": definition_ref(detail)},
                    },
                }),
            );
            defs.insert(
                detail.into(),
                json!({
                    "type": "object",
                    "required": ["message"],
                    "properties": {
                        "message": {"type": "string"},
                        "invalidValue": {"type": "string"},
                    },
                }),
            );
        }
        Ok(defs)
    }

    fn definition(&self, def: &TypeDef) -> AppResult<Option<Value>> {
        let mut value = match def {
            TypeDef::Struct(s) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in self.registry.flattened_fields(s)? {
                    if !field.optional {
                        required.push(field.name.clone());
                    }
                    properties.insert(field.name.clone(), self.field_schema(field)?);
                }
                let mut out = Map::new();
                out.insert("type".into(), json!("object"));
                if !required.is_empty() {
                    out.insert("required".into(), json!(required));
                }
                out.insert("properties".into(), Value::Object(properties));
                out
            }
            TypeDef::Enum(e) => {
                let symbols: Vec<&str> = e.elements.iter().map(|el| el.symbol.as_str()).collect();
                let mut out = Map::new();
                out.insert("type".into(), json!("string"));
                out.insert("enum".into(), json!(symbols));
                out
            }
            TypeDef::Array(a) => {
                let mut out = Map::new();
                out.insert("type".into(), json!("array"));
                if let Some(items) = a.items.as_deref().filter(|i| *i != "Any") {
                    out.insert("items".into(), self.type_schema(items)?);
                }
                out
            }
            TypeDef::Map(m) => {
                let mut out = Map::new();
                out.insert("type".into(), json!("object"));
                if let Some(items) = m.items.as_deref().filter(|i| *i != "Any") {
                    out.insert("additionalProperties".into(), self.type_schema(items)?);
                }
                out
            }
            TypeDef::Union(u) => {
                info!(type_name = %u.name, "unions have no api doc definition");
                return Ok(None);
            }
            TypeDef::Alias(_) => return Ok(None),
        };
        if let Some(comment) = def.comment().filter(|c| !c.is_empty()) {
            value.insert("description".into(), json!(comment));
        }
        Ok(Some(Value::Object(value)))
    }

    fn field_schema(&self, field: &StructFieldDef) -> AppResult<Value> {
        let context = ErrorContext::type_name(&field.type_ref);
        let base = self.registry.base_type(&field.type_ref, &context)?;
        let example = field.annotations.get(EXAMPLE_ANNOTATION).map(String::as_str);
        let mut schema = match (base, field.items.as_deref()) {
            (BaseType::Array, Some(items)) => {
                let item_schema = with_example(self.type_schema(items)?, example);
                json!({"type": "array", "items": item_schema})
            }
            (BaseType::Map, Some(items)) => {
                let item_schema = with_example(self.type_schema(items)?, example);
                json!({"type": "object", "additionalProperties": item_schema})
            }
            _ => with_example(self.type_schema(&field.type_ref)?, example),
        };
        if let (Some(comment), Value::Object(fields)) = (field.comment.as_deref(), &mut schema) {
            if !comment.is_empty() && !fields.contains_key("$ref") {
                fields.insert("description".into(), json!(comment));
            }
        }
        Ok(schema)
    }
}

fn definition_ref(name: &str) -> Value {
    json!({"$ref": format!("#/definitions/{}", name)})
}

/// Attaches an example to a scalar schema, typed after the schema's type.
/// Examples that do not parse as that type are dropped.
fn with_example(mut schema: Value, example: Option<&str>) -> Value {
    let Some(example) = example.filter(|e| !e.is_empty()) else {
        return schema;
    };
    let typed = match schema.get("type").and_then(Value::as_str) {
        Some("string") => Some(json!(example)),
        Some("integer") => example.parse::<i64>().ok().map(|v| json!(v)),
        Some("number") => example.parse::<f64>().ok().map(|v| json!(v)),
        Some("boolean") => example.parse::<bool>().ok().map(|v| json!(v)),
        _ => None,
    };
    if let (Some(value), Value::Object(fields)) = (typed, &mut schema) {
        fields.insert("example".into(), value);
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use pretty_assertions::assert_eq;

    fn sample() -> Schema {
        serde_json::from_value(json!({
            "name": "pets",
            "comment": "Pet store",
            "types": [
                {"kind": "enum", "name": "Kind", "elements": [{"symbol": "CAT"}, {"symbol": "DOG"}]},
                {"kind": "struct", "name": "Pet", "comment": "A pet", "fields": [
                    {"name": "id", "type": "Int64"},
                    {"name": "name", "type": "String", "annotations": {"x_example": "Rex"}},
                    {"name": "age", "type": "Int32", "optional": true, "annotations": {"x_example": "3"}},
                    {"name": "kind", "type": "Kind"},
                    {"name": "tags", "type": "Array", "items": "String", "optional": true},
                    {"name": "scores", "type": "Map", "items": "Float64", "optional": true}
                ]},
                {"kind": "array", "name": "Pets", "items": "Pet"},
                {"kind": "struct", "name": "Problem", "fields": [{"name": "reason", "type": "String"}]},
                {"kind": "union", "name": "Handle", "variants": ["String", "Int32"]},
                {"kind": "alias", "name": "Name", "type": "String"}
            ],
            "resources": [
                {"method": "GET", "path": "/pets?kind={kind}&limit={limit}", "type": "Pets",
                 "comment": "List pets",
                 "annotations": {"x_tag_pets": "", "x_tag_public": ""},
                 "inputs": [
                     {"name": "kind", "type": "Kind", "queryParam": "kind", "optional": true},
                     {"name": "limit", "type": "Int32", "queryParam": "limit", "default": 20}
                 ]},
                {"method": "POST", "path": "/pets", "type": "Pet",
                 "inputs": [
                     {"name": "pet", "type": "Pet"},
                     {"name": "trace", "type": "String", "header": "X-Trace", "optional": true,
                      "annotations": {"x_example": "abc"}}
                 ],
                 "expected": "CREATED", "alternatives": ["ACCEPTED"],
                 "exceptions": {"CONFLICT": {"type": "Problem", "comment": "already exists"}}},
                {"method": "DELETE", "path": "/pets/{id}", "type": "Pet", "expected": "NO_CONTENT"}
            ]
        }))
        .unwrap()
    }

    fn doc(config: &GeneratorConfig, options: &ApiDocOptions) -> Value {
        generate_api_doc(&sample(), config, options).unwrap()
    }

    #[test]
    fn test_header_and_base_path() {
        let config = GeneratorConfig {
            final_name: "store".into(),
            ..GeneratorConfig::default()
        };
        let options = ApiDocOptions {
            scheme: Some("https".into()),
            host: Some("api.example.com".into()),
        };
        let d = doc(&config, &options);
        assert_eq!(d["swagger"], "2.0");
        assert_eq!(d["info"], json!({"title": "The pets API", "version": "1", "description": "Pet store"}));
        assert_eq!(d["host"], "api.example.com");
        assert_eq!(d["basePath"], "/store/pets/v1");
        assert_eq!(d["schemes"], json!(["https"]));

        let plain = doc(&GeneratorConfig::default(), &ApiDocOptions {
            scheme: Some("ftp".into()),
            host: None,
        });
        assert_eq!(plain["basePath"], "/pets/v1");
        assert_eq!(plain["schemes"], json!([]));
        assert!(plain.get("host").is_none());
    }

    #[test]
    fn test_parameters_by_location() {
        let d = doc(&GeneratorConfig::default(), &ApiDocOptions::default());
        let list = &d["paths"]["/pets"]["get"];
        assert_eq!(list["tags"], json!(["pets", "public"]));
        assert_eq!(list["summary"], "List pets");
        assert!(list.get("consumes").is_none());
        assert_eq!(
            list["parameters"],
            json!([
                {"name": "kind", "in": "query", "required": false, "type": "string", "enum": ["CAT", "DOG"]},
                {"name": "limit", "in": "query", "required": true, "type": "integer", "format": "int32", "default": 20}
            ])
        );

        let create = &d["paths"]["/pets"]["post"];
        assert_eq!(create["tags"], json!(["Pet"]));
        assert_eq!(create["consumes"], json!(["application/json"]));
        assert_eq!(
            create["parameters"],
            json!([
                {"name": "pet", "in": "body", "required": true, "schema": {"$ref": "#/definitions/Pet"}},
                {"name": "X-Trace", "in": "header", "required": false, "type": "string", "default": "abc"}
            ])
        );

        let delete = &d["paths"]["/pets/{id}"]["delete"];
        assert_eq!(
            delete["parameters"],
            json!([{"name": "id", "in": "path", "required": true, "type": "string"}])
        );
    }

    #[test]
    fn test_responses_cover_success_and_exceptions() {
        let d = doc(&GeneratorConfig::default(), &ApiDocOptions::default());
        assert_eq!(
            d["paths"]["/pets"]["post"]["responses"],
            json!({
                "201": {"description": "Created", "schema": {"$ref": "#/definitions/Pet"}},
                "202": {"description": "Accepted", "schema": {"$ref": "#/definitions/Pet"}},
                "409": {"description": "Conflict - already exists", "schema": {"$ref": "#/definitions/Problem"}}
            })
        );
        assert_eq!(
            d["paths"]["/pets/{id}"]["delete"]["responses"],
            json!({"204": {"description": "No Content"}})
        );
        assert_eq!(
            d["paths"]["/pets"]["get"]["responses"]["200"]["schema"],
            json!({"$ref": "#/definitions/Pets"})
        );
    }

    #[test]
    fn test_definitions() {
        let d = doc(&GeneratorConfig::default(), &ApiDocOptions::default());
        let defs = d["definitions"].as_object().unwrap();
        let names: Vec<&str> = defs.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Kind", "Pet", "Pets", "Problem", "ResourceError"]);

        let pet = &defs["Pet"];
        assert_eq!(pet["description"], "A pet");
        assert_eq!(pet["required"], json!(["id", "name", "kind"]));
        assert_eq!(pet["properties"]["name"], json!({"type": "string", "example": "Rex"}));
        assert_eq!(
            pet["properties"]["age"],
            json!({"type": "integer", "format": "int32", "example": 3})
        );
        assert_eq!(pet["properties"]["kind"], json!({"$ref": "#/definitions/Kind"}));
        assert_eq!(
            pet["properties"]["tags"],
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(
            pet["properties"]["scores"],
            json!({"type": "object", "additionalProperties": {"type": "number", "format": "double"}})
        );
        assert_eq!(defs["Kind"], json!({"type": "string", "enum": ["CAT", "DOG"]}));
        assert_eq!(
            defs["Pets"],
            json!({"type": "array", "items": {"$ref": "#/definitions/Pet"}})
        );
        assert_eq!(defs["ResourceError"]["required"], json!(["code", "message"]));
    }

    #[test]
    fn test_vendor_error_definitions() {
        let config = GeneratorConfig {
            generate_vendor_errors: true,
            ..GeneratorConfig::default()
        };
        let d = doc(&config, &ApiDocOptions::default());
        let defs = &d["definitions"];
        assert_eq!(
            defs["VendorResourceError"]["properties"]["error"],
            json!({"$ref": "#/definitions/VendorErrorBody"})
        );
        assert_eq!(
            defs["VendorErrorBody"]["properties"]["detail"]["items"],
            json!({"$ref": "#/definitions/VendorErrorDetail"})
        );
        assert_eq!(defs["VendorErrorDetail"]["required"], json!(["message"]));
    }

    #[test]
    fn test_examples_must_match_type() {
        assert_eq!(
            with_example(json!({"type": "integer"}), Some("many")),
            json!({"type": "integer"})
        );
        assert_eq!(
            with_example(json!({"type": "boolean"}), Some("true")),
            json!({"type": "boolean", "example": true})
        );
        assert_eq!(
            with_example(json!({"$ref": "#/definitions/Pet"}), Some("x")),
            json!({"$ref": "#/definitions/Pet"})
        );
    }

    #[test]
    fn test_resolution_errors_propagate() {
        let mut s = sample();
        s.resources[0].type_ref = "Missing".into();
        let err = generate_api_doc(&s, &GeneratorConfig::default(), &ApiDocOptions::default())
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownType { .. }));
    }
}
