#![deny(missing_docs)]

//! # Union Codec Generation
//!
//! Derives the discriminated marshal / unmarshal dispatch of a union type.
//!
//! - A tag enumeration `{Union}VariantTag` lists `{Union}Variant{Type}` in
//!   declaration order.
//! - Marshal selects purely by tag.
//! - Unmarshal decodes to a dynamic JSON value, classifies it by runtime
//!   kind and walks that kind's candidates in declaration order. The first
//!   candidate whose probe accepts the value wins.
//!
//! Probes: struct variants require all of their required field names to be
//! present; enum variants accept only their symbols; numeric variants accept
//! values their width can represent. Variants sharing a non-object kind
//! cannot be told apart by payload, so the first declared one always wins.
//! [`UnionCodec::unmarshal`] runs the same table the renderer receives.

use crate::error::{AppError, AppResult, ErrorContext};
use crate::resolver::naming::capitalize;
use crate::resolver::{ResolvedType, TypeResolver};
use crate::schema::{BaseType, TypeDef, UnionTypeDef};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Runtime JSON kind a variant is decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonKind {
    /// JSON object.
    Object,
    /// JSON array.
    Array,
    /// JSON string.
    String,
    /// JSON boolean.
    Bool,
    /// JSON number.
    Number,
    /// Any kind; used for shapes without a typed mapping.
    Dynamic,
}

impl JsonKind {
    /// Classifies a decoded value. `null` has no kind.
    pub fn of(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(_) => Some(JsonKind::Object),
            JsonValue::Array(_) => Some(JsonKind::Array),
            JsonValue::String(_) => Some(JsonKind::String),
            JsonValue::Bool(_) => Some(JsonKind::Bool),
            JsonValue::Number(_) => Some(JsonKind::Number),
            JsonValue::Null => None,
        }
    }

    const DISPATCH_ORDER: [JsonKind; 5] = [
        JsonKind::Object,
        JsonKind::Array,
        JsonKind::String,
        JsonKind::Bool,
        JsonKind::Number,
    ];
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JsonKind::Object => "object",
            JsonKind::Array => "array",
            JsonKind::String => "string",
            JsonKind::Bool => "boolean",
            JsonKind::Number => "number",
            JsonKind::Dynamic => "dynamic",
        };
        f.write_str(s)
    }
}

/// How a candidate checks a decoded value of its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Probe {
    /// Object must contain all of these keys.
    Fields(Vec<String>),
    /// String must be one of these symbols.
    Symbols(Vec<String>),
    /// Number must fit this width.
    Width(BaseType),
    /// Accepts every value of the kind.
    Any,
}

impl Probe {
    fn accepts(&self, value: &JsonValue) -> bool {
        match self {
            Probe::Fields(names) => value
                .as_object()
                .is_some_and(|obj| names.iter().all(|n| obj.contains_key(n))),
            Probe::Symbols(symbols) => value
                .as_str()
                .is_some_and(|s| symbols.iter().any(|sym| sym == s)),
            Probe::Width(width) => fits_width(value, *width),
            Probe::Any => true,
        }
    }
}

fn fits_width(value: &JsonValue, width: BaseType) -> bool {
    let int = value.as_i64();
    match width {
        BaseType::Int8 => int.is_some_and(|v| i8::try_from(v).is_ok()),
        BaseType::Int16 => int.is_some_and(|v| i16::try_from(v).is_ok()),
        BaseType::Int32 => int.is_some_and(|v| i32::try_from(v).is_ok()),
        BaseType::Int64 => int.is_some(),
        BaseType::Float32 => value
            .as_f64()
            .is_some_and(|v| v.abs() <= f64::from(f32::MAX)),
        BaseType::Float64 => value.is_number(),
        _ => false,
    }
}

/// One variant of a union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionVariant {
    /// Capitalized variant name, e.g. `User`.
    pub name: String,
    /// Tag constant, e.g. `ContactVariantUser`.
    pub tag: String,
    /// Schema reference of the variant type.
    pub type_ref: String,
    /// Resolved variant type.
    pub variant_type: ResolvedType,
    /// JSON kind the variant decodes from.
    pub kind: JsonKind,
    /// Payload check within that kind.
    pub probe: Probe,
}

/// Candidates for one JSON kind, in the order they are tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindDispatch {
    /// The runtime kind.
    pub kind: JsonKind,
    /// Variant names in declaration order.
    pub candidates: Vec<String>,
}

/// The complete codec descriptor of a union type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionCodec {
    /// Generated union class name.
    pub class_name: String,
    /// Tag enumeration name.
    pub tag_enum: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Variants in declaration order.
    pub variants: Vec<UnionVariant>,
    /// Unmarshal dispatch, one entry per kind that has candidates.
    pub dispatch: Vec<KindDispatch>,
    /// Kinds whose candidates cannot be told apart by payload.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ambiguous: Vec<KindDispatch>,
}

/// A union value at runtime: the active variant and its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionValue {
    /// Active variant name.
    pub variant: String,
    /// Variant payload.
    pub value: JsonValue,
}

impl UnionValue {
    /// Pairs a variant name with its payload.
    pub fn new(variant: impl Into<String>, value: JsonValue) -> Self {
        Self {
            variant: variant.into(),
            value,
        }
    }
}

impl UnionCodec {
    /// Derives the codec of `def`.
    pub fn generate(def: &UnionTypeDef, resolver: &TypeResolver<'_>) -> AppResult<Self> {
        let class_name = resolver.class_name(&def.name);
        let context = ErrorContext::type_name(&def.name);
        let registry = resolver.registry();
        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(def.variants.len());

        for type_ref in &def.variants {
            let name = capitalize(type_ref);
            if !seen.insert(name.clone()) {
                return Err(AppError::invalid(
                    context.clone(),
                    format!("variant '{}' is declared twice", type_ref),
                ));
            }
            let variant_ctx = context.with_field(type_ref);
            let chain = registry.chain(type_ref, &variant_ctx)?;
            let (kind, probe) = match chain.base {
                BaseType::Struct => match chain.named() {
                    Some(TypeDef::Struct(s)) => {
                        let required = registry
                            .flattened_fields(s)?
                            .into_iter()
                            .filter(|f| !f.optional)
                            .map(|f| f.name.clone())
                            .collect();
                        (JsonKind::Object, Probe::Fields(required))
                    }
                    _ => dynamic(&class_name, type_ref),
                },
                BaseType::Map => (JsonKind::Object, Probe::Fields(Vec::new())),
                BaseType::Array => (JsonKind::Array, Probe::Any),
                BaseType::Enum => match registry.enum_def(type_ref, &variant_ctx)? {
                    Some(e) => (
                        JsonKind::String,
                        Probe::Symbols(e.elements.iter().map(|el| el.symbol.clone()).collect()),
                    ),
                    None => dynamic(&class_name, type_ref),
                },
                BaseType::String
                | BaseType::Symbol
                | BaseType::Timestamp
                | BaseType::Uuid
                | BaseType::Bytes => (JsonKind::String, Probe::Any),
                BaseType::Bool => (JsonKind::Bool, Probe::Any),
                width @ (BaseType::Int8
                | BaseType::Int16
                | BaseType::Int32
                | BaseType::Int64
                | BaseType::Float32
                | BaseType::Float64) => (JsonKind::Number, Probe::Width(width)),
                BaseType::Union | BaseType::Any => dynamic(&class_name, type_ref),
            };
            variants.push(UnionVariant {
                tag: format!("{}Variant{}", class_name, name),
                variant_type: resolver.resolve_in(type_ref, true, None, None, &variant_ctx)?,
                type_ref: type_ref.clone(),
                name,
                kind,
                probe,
            });
        }

        let dispatch: Vec<KindDispatch> = JsonKind::DISPATCH_ORDER
            .iter()
            .map(|&kind| KindDispatch {
                kind,
                candidates: variants
                    .iter()
                    .filter(|v| v.kind == kind || v.kind == JsonKind::Dynamic)
                    .map(|v| v.name.clone())
                    .collect(),
            })
            .filter(|d| !d.candidates.is_empty())
            .collect();

        let ambiguous: Vec<KindDispatch> = JsonKind::DISPATCH_ORDER
            .iter()
            .filter(|&&kind| kind != JsonKind::Object)
            .map(|&kind| KindDispatch {
                kind,
                candidates: variants
                    .iter()
                    .filter(|v| v.kind == kind && !matches!(v.probe, Probe::Symbols(_)))
                    .map(|v| v.name.clone())
                    .collect(),
            })
            .filter(|d| d.candidates.len() > 1)
            .collect();
        for group in &ambiguous {
            warn!(
                union = %class_name,
                kind = %group.kind,
                first = %group.candidates[0],
                "variants share a JSON kind; the first declared always wins on decode"
            );
        }

        Ok(Self {
            tag_enum: format!("{}VariantTag", class_name),
            comment: def.comment.clone(),
            class_name,
            variants,
            dispatch,
            ambiguous,
        })
    }

    /// Looks up a variant by name.
    pub fn variant(&self, name: &str) -> Option<&UnionVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Encodes a union value by its tag alone.
    pub fn marshal(&self, value: &UnionValue) -> AppResult<JsonValue> {
        match self.variant(&value.variant) {
            Some(_) => Ok(value.value.clone()),
            None => Err(self.codec_error(format!(
                "cannot marshal uninitialized or unknown variant '{}'",
                value.variant
            ))),
        }
    }

    /// Decodes a JSON value using the kind dispatch table.
    pub fn unmarshal(&self, json: &JsonValue) -> AppResult<UnionValue> {
        let kind = JsonKind::of(json)
            .ok_or_else(|| self.codec_error("null does not match any variant"))?;
        let candidates = self
            .dispatch
            .iter()
            .find(|d| d.kind == kind)
            .map(|d| d.candidates.as_slice())
            .unwrap_or_default();
        candidates
            .iter()
            .filter_map(|name| self.variant(name))
            .find(|v| v.kind == JsonKind::Dynamic || v.probe.accepts(json))
            .map(|v| UnionValue::new(v.name.clone(), json.clone()))
            .ok_or_else(|| self.codec_error(format!("no variant accepts this {} value", kind)))
    }

    fn codec_error(&self, message: impl Into<String>) -> AppError {
        AppError::UnionCodec {
            union: self.class_name.clone(),
            message: message.into(),
        }
    }
}

fn dynamic(union: &str, type_ref: &str) -> (JsonKind, Probe) {
    warn!(union, variant = type_ref, "variant has no typed JSON mapping, decoding dynamically");
    (JsonKind::Dynamic, Probe::Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::schema::{Schema, TypeRegistry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn codec(schema: &Schema, union: &str) -> AppResult<UnionCodec> {
        let reg = TypeRegistry::new(schema)?;
        let resolver = TypeResolver::new(&reg, &GeneratorConfig::default());
        let def = reg.union_def(union).unwrap();
        UnionCodec::generate(def, &resolver)
    }

    fn contact_schema() -> Schema {
        serde_json::from_value(json!({"name": "s", "types": [
            {"kind": "struct", "name": "Email", "fields": [
                {"name": "address", "type": "String"},
                {"name": "label", "type": "String", "optional": true}
            ]},
            {"kind": "struct", "name": "Phone", "fields": [{"name": "number", "type": "String"}]},
            {"kind": "enum", "name": "Channel", "elements": [{"symbol": "SMS"}, {"symbol": "MAIL"}]},
            {"kind": "union", "name": "Contact",
             "variants": ["Email", "Phone", "Channel", "String", "Int32", "Bool", "Array"]}
        ]}))
        .unwrap()
    }

    #[test]
    fn test_tags_in_declaration_order() {
        let c = codec(&contact_schema(), "Contact").unwrap();
        assert_eq!(c.tag_enum, "ContactVariantTag");
        let tags: Vec<&str> = c.variants.iter().map(|v| v.tag.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "ContactVariantEmail",
                "ContactVariantPhone",
                "ContactVariantChannel",
                "ContactVariantString",
                "ContactVariantInt32",
                "ContactVariantBool",
                "ContactVariantArray"
            ]
        );
        assert_eq!(c.variants[0].probe, Probe::Fields(vec!["address".into()]));
        assert!(c.ambiguous.is_empty());
    }

    #[test]
    fn test_struct_probing() {
        let c = codec(&contact_schema(), "Contact").unwrap();
        let phone = c.unmarshal(&json!({"number": "555"})).unwrap();
        assert_eq!(phone.variant, "Phone");
        let email = c.unmarshal(&json!({"address": "a@b", "number": "1"})).unwrap();
        assert_eq!(email.variant, "Email");
        assert!(matches!(
            c.unmarshal(&json!({"other": 1})),
            Err(AppError::UnionCodec { .. })
        ));
    }

    #[test]
    fn test_round_trip_for_unique_kinds() {
        let c = codec(&contact_schema(), "Contact").unwrap();
        let values = vec![
            UnionValue::new("Email", json!({"address": "a@b"})),
            UnionValue::new("Phone", json!({"number": "555"})),
            UnionValue::new("Int32", json!(42)),
            UnionValue::new("Bool", json!(true)),
            UnionValue::new("Array", json!([1, "x"])),
        ];
        for original in values {
            let encoded = c.marshal(&original).unwrap();
            let decoded = c.unmarshal(&encoded).unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn test_enum_symbols_before_plain_strings() {
        let c = codec(&contact_schema(), "Contact").unwrap();
        assert_eq!(c.unmarshal(&json!("SMS")).unwrap().variant, "Channel");
        assert_eq!(c.unmarshal(&json!("hello")).unwrap().variant, "String");
    }

    #[test]
    fn test_ambiguous_strings_decode_to_first() {
        let schema: Schema = serde_json::from_value(json!({"name": "s", "types": [
            {"kind": "alias", "name": "Nickname", "type": "String"},
            {"kind": "union", "name": "Label", "variants": ["Nickname", "String"]}
        ]}))
        .unwrap();
        let c = codec(&schema, "Label").unwrap();
        assert_eq!(c.ambiguous.len(), 1);
        assert_eq!(c.ambiguous[0].candidates, vec!["Nickname", "String"]);
        let original = UnionValue::new("String", json!("bob"));
        for _ in 0..10 {
            let decoded = c.unmarshal(&c.marshal(&original).unwrap()).unwrap();
            assert_eq!(decoded.variant, "Nickname");
            assert_eq!(decoded.value, json!("bob"));
        }
    }

    #[test]
    fn test_numeric_width_selection() {
        let schema: Schema = serde_json::from_value(json!({"name": "s", "types": [
            {"kind": "union", "name": "Num", "variants": ["Int8", "Int64", "Float64"]}
        ]}))
        .unwrap();
        let c = codec(&schema, "Num").unwrap();
        assert_eq!(c.unmarshal(&json!(5)).unwrap().variant, "Int8");
        assert_eq!(c.unmarshal(&json!(5000)).unwrap().variant, "Int64");
        assert_eq!(c.unmarshal(&json!(1.5)).unwrap().variant, "Float64");
        assert_eq!(c.ambiguous[0].kind, JsonKind::Number);
    }

    #[test]
    fn test_marshal_unknown_variant_fails() {
        let c = codec(&contact_schema(), "Contact").unwrap();
        let err = c.marshal(&UnionValue::new("Fax", json!(1))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Union 'Contact': cannot marshal uninitialized or unknown variant 'Fax'"
        );
        assert!(c.unmarshal(&JsonValue::Null).is_err());
    }

    #[test]
    fn test_any_variant_is_dynamic() {
        let schema: Schema = serde_json::from_value(json!({"name": "s", "types": [
            {"kind": "union", "name": "Loose", "variants": ["Bool", "Any"]}
        ]}))
        .unwrap();
        let c = codec(&schema, "Loose").unwrap();
        assert_eq!(c.variants[1].kind, JsonKind::Dynamic);
        assert_eq!(c.unmarshal(&json!(true)).unwrap().variant, "Bool");
        assert_eq!(c.unmarshal(&json!({"x": 1})).unwrap().variant, "Any");
    }

    #[test]
    fn test_duplicate_variant_rejected() {
        let schema: Schema = serde_json::from_value(json!({"name": "s", "types": [
            {"kind": "union", "name": "Dup", "variants": ["String", "String"]}
        ]}))
        .unwrap();
        assert!(matches!(codec(&schema, "Dup"), Err(AppError::InvalidSchema { .. })));
    }
}
