#![deny(missing_docs)]

//! # Schema Generator
//!
//! Runs one full resolution pass over a schema and collects everything a
//! renderer needs: models, union codecs, resources, route patterns, the
//! validation group set and the support classes.
//!
//! Generated names share one namespace per kind. Two resources deriving the
//! same method name, or two classes landing on the same name, abort the run
//! with `NamingCollision`. Classes cover types, union tag enums, result
//! wrappers, handler interfaces, the validation groups holder and support
//! classes.

use crate::annotations::{ValidationGroups, VALIDATION_GROUPS_CLASS};
use crate::config::GeneratorConfig;
use crate::error::{AppError, AppResult};
use crate::model_generator::{EnumModel, ModelGenerator, StructModel};
use crate::resolver::naming::class_name;
use crate::resolver::TypeResolver;
use crate::resource::{ResolvedResource, ResourceAnalyzer};
use crate::route_generator::{generate_routes, root_path, RoutePattern};
use crate::schema::{Schema, TypeDef, TypeRegistry};
use crate::union_generator::UnionCodec;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Suffix appended to the namespace for generated sources.
pub const GENERATED_PACKAGE_SUFFIX: &str = "generated";

/// Support classes emitted for every service.
pub const SUPPORT_ARTIFACTS: [&str; 3] = ["ResourceContext", "ResourceException", "ResourceError"];

/// Additional support classes emitted when vendor errors are enabled.
pub const VENDOR_ARTIFACTS: [&str; 3] =
    ["VendorResourceError", "VendorErrorBody", "VendorErrorDetail"];

/// The handler implementation skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerImpl {
    /// Implementation class name.
    pub class_name: String,
    /// The handler interface it implements.
    pub interface: String,
    /// Package of the implementation (the origin namespace).
    pub package: String,
    /// Fully qualified imports, sorted.
    pub imports: Vec<String>,
}

/// The result of one generation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSchema {
    /// Schema name.
    pub name: String,
    /// Service class name.
    pub class_name: String,
    /// Package of generated sources.
    pub package: String,
    /// Namespace the schema belongs to.
    pub origin_package: String,
    /// Service root path.
    pub root_path: String,
    /// Struct models in declaration order.
    pub structs: Vec<StructModel>,
    /// Enum models in declaration order.
    pub enums: Vec<EnumModel>,
    /// Union codecs in declaration order.
    pub unions: Vec<UnionCodec>,
    /// Resources in declaration order.
    pub resources: Vec<ResolvedResource>,
    /// One route pattern per resource.
    pub routes: Vec<RoutePattern>,
    /// Every validation group referenced by any directive, sorted.
    pub validation_groups: Vec<String>,
    /// Support classes to emit.
    pub support_artifacts: Vec<String>,
    /// Handler implementation skeleton, when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_impl: Option<HandlerImpl>,
}

impl ResolvedSchema {
    /// Looks up a resource by method name.
    pub fn resource(&self, method_name: &str) -> Option<&ResolvedResource> {
        self.resources.iter().find(|r| r.method_name == method_name)
    }

    /// Looks up a struct model by schema type name.
    pub fn struct_model(&self, type_name: &str) -> Option<&StructModel> {
        self.structs.iter().find(|s| s.type_name == type_name)
    }
}

/// Tracks which owner claimed each generated name.
#[derive(Debug, Default)]
struct NameClaims {
    owners: HashMap<String, String>,
}

impl NameClaims {
    fn claim(&mut self, name: &str, owner: impl Into<String>) -> AppResult<()> {
        let owner = owner.into();
        match self.owners.get(name) {
            Some(first) => Err(AppError::NamingCollision {
                name: name.to_string(),
                first: first.clone(),
                second: owner,
            }),
            None => {
                self.owners.insert(name.to_string(), owner);
                Ok(())
            }
        }
    }
}

/// Resolves the whole schema.
pub fn generate(schema: &Schema, config: &GeneratorConfig) -> AppResult<ResolvedSchema> {
    info!(schema = %schema.name, version = schema.version(), "resolving schema");
    let registry = TypeRegistry::new(schema)?;
    let resolver = TypeResolver::new(&registry, config);
    let models = ModelGenerator::new(resolver, config);
    let analyzer = ResourceAnalyzer::new(resolver, config);
    let mut groups = ValidationGroups::new();

    let service_class = class_name(&schema.name, schema.version(), "");
    let origin_package = config
        .namespace
        .clone()
        .or_else(|| schema.namespace.clone())
        .unwrap_or_default();
    let package = if origin_package.is_empty() {
        GENERATED_PACKAGE_SUFFIX.to_string()
    } else {
        format!("{}.{}", origin_package, GENERATED_PACKAGE_SUFFIX)
    };

    let mut classes = NameClaims::default();
    let mut support_artifacts: Vec<String> =
        SUPPORT_ARTIFACTS.iter().map(|s| s.to_string()).collect();
    if config.generate_vendor_errors {
        support_artifacts.extend(VENDOR_ARTIFACTS.iter().map(|s| s.to_string()));
    }
    for artifact in &support_artifacts {
        classes.claim(artifact, format!("support class {}", artifact))?;
    }
    let handler_interface = format!("{}Handler", service_class);
    classes.claim(&handler_interface, "handler interface")?;
    if config.generate_handler_impl {
        classes.claim(&format!("{}Impl", handler_interface), "handler implementation")?;
    }

    let mut structs = Vec::new();
    let mut enums = Vec::new();
    let mut unions = Vec::new();
    for def in &schema.types {
        match def {
            TypeDef::Struct(s) => {
                debug!(type_name = %s.name, "resolving struct");
                let model = models.struct_model(s, &mut groups)?;
                classes.claim(&model.class_name, format!("type {}", s.name))?;
                structs.push(model);
            }
            TypeDef::Enum(e) => {
                let model = models.enum_model(e);
                classes.claim(&model.class_name, format!("type {}", e.name))?;
                enums.push(model);
            }
            TypeDef::Union(u) => {
                debug!(type_name = %u.name, "resolving union");
                let codec = UnionCodec::generate(u, &resolver)?;
                classes.claim(&codec.class_name, format!("type {}", u.name))?;
                classes.claim(&codec.tag_enum, format!("variant tag of {}", u.name))?;
                unions.push(codec);
            }
            TypeDef::Array(_) | TypeDef::Map(_) | TypeDef::Alias(_) => {}
        }
    }

    let mut methods = NameClaims::default();
    let mut resources = Vec::with_capacity(schema.resources.len());
    for resource in &schema.resources {
        let resolved = analyzer.analyze(resource, &mut groups)?;
        methods.claim(&resolved.method_name, format!("resource {}", resource))?;
        if let Some(wrapper) = &resolved.result_wrapper {
            classes.claim(&wrapper.class_name, format!("result of {}", resource))?;
        }
        resources.push(resolved);
    }
    if !groups.is_empty() {
        classes.claim(VALIDATION_GROUPS_CLASS, "validation groups")?;
    }

    let routes = generate_routes(schema, &config.final_name)?;

    let handler_impl = config.generate_handler_impl.then(|| {
        let mut imports = BTreeSet::new();
        for class in structs
            .iter()
            .map(|s| &s.class_name)
            .chain(enums.iter().map(|e| &e.class_name))
        {
            imports.insert(format!("{}.{}", package, class));
        }
        imports.insert(format!("{}.ResourceContext", package));
        imports.insert(format!("{}.{}", package, handler_interface));
        HandlerImpl {
            class_name: format!("{}Impl", handler_interface),
            interface: handler_interface.clone(),
            package: origin_package.clone(),
            imports: imports.into_iter().collect(),
        }
    });

    let validation_groups = groups.into_sorted();
    info!(
        structs = structs.len(),
        unions = unions.len(),
        resources = resources.len(),
        groups = validation_groups.len(),
        "schema resolved"
    );

    Ok(ResolvedSchema {
        name: schema.name.clone(),
        class_name: service_class,
        package,
        origin_package,
        root_path: root_path(schema),
        structs,
        enums,
        unions,
        resources,
        routes,
        validation_groups,
        support_artifacts,
        handler_impl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> Schema {
        schema(json!({
            "name": "sample",
            "namespace": "com.example",
            "types": [
                {"kind": "enum", "name": "Color", "elements": [{"symbol": "RED"}]},
                {"kind": "struct", "name": "User", "fields": [
                    {"name": "id", "type": "Int64", "annotations": {"x_min": "1,groups=update"}},
                    {"name": "color", "type": "Color", "optional": true}
                ]},
                {"kind": "union", "name": "Shape", "variants": ["String", "Int32"]}
            ],
            "resources": [
                {"method": "GET", "path": "/users/{id}", "type": "User",
                 "inputs": [{"name": "id", "type": "Int64", "pathParam": true}],
                 "outputs": [{"name": "etag", "type": "String", "header": "ETag"}]},
                {"method": "POST", "path": "/users", "type": "User",
                 "inputs": [{"name": "user", "type": "User",
                             "annotations": {"x_must_validate": "create"}}],
                 "expected": "CREATED"}
            ]
        }))
    }

    #[test]
    fn test_generate_sample() {
        let resolved = generate(&sample(), &GeneratorConfig::default()).unwrap();
        assert_eq!(resolved.class_name, "Sample");
        assert_eq!(resolved.package, "com.example.generated");
        assert_eq!(resolved.origin_package, "com.example");
        assert_eq!(resolved.root_path, "/sample/v1");
        assert_eq!(resolved.structs.len(), 1);
        assert_eq!(resolved.enums.len(), 1);
        assert_eq!(resolved.unions.len(), 1);
        assert_eq!(resolved.routes.len(), 2);
        assert_eq!(resolved.validation_groups, vec!["Create", "Update"]);
        assert_eq!(
            resolved.support_artifacts,
            vec!["ResourceContext", "ResourceException", "ResourceError"]
        );
        assert!(resolved.handler_impl.is_none());
        assert!(resolved.resource("getUser").is_some());
        assert!(resolved.resource("postUser").is_some());
    }

    #[test]
    fn test_namespace_override_and_vendor_artifacts() {
        let config = GeneratorConfig {
            namespace: Some("org.acme".into()),
            generate_vendor_errors: true,
            generate_handler_impl: true,
            ..GeneratorConfig::default()
        };
        let resolved = generate(&sample(), &config).unwrap();
        assert_eq!(resolved.package, "org.acme.generated");
        assert_eq!(resolved.support_artifacts.len(), 6);
        let handler = resolved.handler_impl.unwrap();
        assert_eq!(handler.class_name, "SampleHandlerImpl");
        assert_eq!(handler.package, "org.acme");
        assert_eq!(
            handler.imports,
            vec![
                "org.acme.generated.Color",
                "org.acme.generated.ResourceContext",
                "org.acme.generated.SampleHandler",
                "org.acme.generated.User",
            ]
        );
    }

    #[test]
    fn test_method_name_collision() {
        let s = schema(json!({
            "name": "sample",
            "types": [{"kind": "struct", "name": "User", "fields": []}],
            "resources": [
                {"method": "GET", "path": "/users", "type": "User"},
                {"method": "GET", "path": "/people", "type": "User"}
            ]
        }));
        let err = generate(&s, &GeneratorConfig::default()).unwrap_err();
        match err {
            AppError::NamingCollision { name, .. } => assert_eq!(name, "getUser"),
            other => panic!("expected collision, got {}", other),
        }
        let by_path = GeneratorConfig {
            use_path_naming: true,
            ..GeneratorConfig::default()
        };
        assert!(generate(&s, &by_path).is_ok());
    }

    #[test]
    fn test_type_class_collides_with_support_class() {
        let s = schema(json!({
            "name": "sample",
            "types": [{"kind": "struct", "name": "resourceError", "fields": []}]
        }));
        let err = generate(&s, &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::NamingCollision { .. }));
    }

    #[test]
    fn test_wrapper_collides_with_type() {
        let s = schema(json!({
            "name": "sample",
            "types": [
                {"kind": "struct", "name": "User", "fields": []},
                {"kind": "struct", "name": "GetUserResult", "fields": []}
            ],
            "resources": [
                {"method": "GET", "path": "/users", "type": "User",
                 "outputs": [{"name": "etag", "type": "String", "header": "ETag"}]}
            ]
        }));
        let err = generate(&s, &GeneratorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("GetUserResult"));
    }

    #[test]
    fn test_versioned_class_name() {
        let mut s = sample();
        s.version = Some(2);
        let resolved = generate(&s, &GeneratorConfig::default()).unwrap();
        assert_eq!(resolved.class_name, "SampleV2");
        assert_eq!(resolved.structs[0].class_name, "UserV2");
    }

    fn collision(s: &Schema, config: &GeneratorConfig) -> (String, String) {
        match generate(s, config).unwrap_err() {
            AppError::NamingCollision { name, second, .. } => (name, second),
            other => panic!("expected collision, got {}", other),
        }
    }

    #[test]
    fn test_union_tag_enum_collides_with_type() {
        let s = schema(json!({
            "name": "sample",
            "types": [
                {"kind": "struct", "name": "ShapeVariantTag", "fields": []},
                {"kind": "union", "name": "Shape", "variants": ["String", "Int32"]}
            ]
        }));
        let (name, second) = collision(&s, &GeneratorConfig::default());
        assert_eq!(name, "ShapeVariantTag");
        assert_eq!(second, "variant tag of Shape");
    }

    #[test]
    fn test_handler_names_collide_with_types() {
        let s = schema(json!({
            "name": "sample",
            "types": [{"kind": "struct", "name": "SampleHandler", "fields": []}]
        }));
        let (name, _) = collision(&s, &GeneratorConfig::default());
        assert_eq!(name, "SampleHandler");

        let s = schema(json!({
            "name": "sample",
            "types": [{"kind": "struct", "name": "SampleHandlerImpl", "fields": []}]
        }));
        assert!(generate(&s, &GeneratorConfig::default()).is_ok());
        let with_impl = GeneratorConfig {
            generate_handler_impl: true,
            ..GeneratorConfig::default()
        };
        let (name, _) = collision(&s, &with_impl);
        assert_eq!(name, "SampleHandlerImpl");
    }

    #[test]
    fn test_groups_holder_collides_only_when_groups_are_used() {
        let plain = schema(json!({
            "name": "sample",
            "types": [{"kind": "struct", "name": "ValidationGroups", "fields": []}]
        }));
        assert!(generate(&plain, &GeneratorConfig::default()).is_ok());

        let grouped = schema(json!({
            "name": "sample",
            "types": [
                {"kind": "struct", "name": "ValidationGroups", "fields": []},
                {"kind": "struct", "name": "User", "fields": [
                    {"name": "id", "type": "Int64", "annotations": {"x_min": "1,groups=update"}}
                ]}
            ]
        }));
        let (name, second) = collision(&grouped, &GeneratorConfig::default());
        assert_eq!(name, "ValidationGroups");
        assert_eq!(second, "validation groups");
    }
}
