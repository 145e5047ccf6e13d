//! # Default Values
//!
//! Declared defaults checked against the base kind of their field or input.

use crate::error::{AppError, AppResult, ErrorContext};
use crate::resolver::types::ResolvedType;
use crate::schema::{BaseType, EnumTypeDef};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt::Write;

/// Quotes `s` as a Java string literal.
///
/// Control characters without a short escape become `\uXXXX`.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A default value typed per base kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// String or Symbol.
    String(String),
    /// Timestamp in its textual form.
    Timestamp(String),
    /// UUID in its textual form.
    Uuid(String),
    /// 8-bit integer.
    Int8(i8),
    /// 16-bit integer.
    Int16(i16),
    /// 32-bit integer.
    Int32(i32),
    /// 64-bit integer.
    Int64(i64),
    /// 32-bit float.
    Float32(f32),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// A declared enum symbol.
    Enum {
        /// Generated enum class.
        class_name: String,
        /// The symbol.
        symbol: String,
    },
}

impl DefaultValue {
    /// Checks `value` against the resolved type and converts it.
    ///
    /// `enum_def` must be given when `resolved` is an enum.
    pub fn from_json(
        value: &JsonValue,
        resolved: &ResolvedType,
        enum_def: Option<&EnumTypeDef>,
        context: &ErrorContext,
    ) -> AppResult<Self> {
        let mismatch = || {
            AppError::invalid(
                context.clone(),
                format!("default {} does not match type {}", value, resolved.type_ref),
            )
        };
        let int = || value.as_i64().ok_or_else(mismatch);
        let out = match resolved.kind {
            BaseType::String | BaseType::Symbol => {
                DefaultValue::String(value.as_str().ok_or_else(mismatch)?.to_string())
            }
            BaseType::Timestamp => {
                DefaultValue::Timestamp(value.as_str().ok_or_else(mismatch)?.to_string())
            }
            BaseType::Uuid => DefaultValue::Uuid(value.as_str().ok_or_else(mismatch)?.to_string()),
            BaseType::Int8 => DefaultValue::Int8(i8::try_from(int()?).map_err(|_| mismatch())?),
            BaseType::Int16 => DefaultValue::Int16(i16::try_from(int()?).map_err(|_| mismatch())?),
            BaseType::Int32 => DefaultValue::Int32(i32::try_from(int()?).map_err(|_| mismatch())?),
            BaseType::Int64 => DefaultValue::Int64(int()?),
            BaseType::Float32 => {
                let v = value.as_f64().ok_or_else(mismatch)?;
                if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                    return Err(mismatch());
                }
                DefaultValue::Float32(v as f32)
            }
            BaseType::Float64 => DefaultValue::Float64(value.as_f64().ok_or_else(mismatch)?),
            BaseType::Bool => DefaultValue::Bool(value.as_bool().ok_or_else(mismatch)?),
            BaseType::Enum => {
                let symbol = value.as_str().ok_or_else(mismatch)?;
                let declared = enum_def
                    .map(|e| e.elements.iter().any(|el| el.symbol == symbol))
                    .unwrap_or(false);
                if !declared {
                    return Err(AppError::invalid(
                        context.clone(),
                        format!("'{}' is not a symbol of {}", symbol, resolved.type_ref),
                    ));
                }
                DefaultValue::Enum {
                    class_name: resolved.name.clone(),
                    symbol: symbol.to_string(),
                }
            }
            other => {
                return Err(AppError::invalid(
                    context.clone(),
                    format!("default values are not supported for {} types", other),
                ))
            }
        };
        Ok(out)
    }

    /// True for the empty string, zero and `false`.
    pub fn is_zero(&self) -> bool {
        match self {
            DefaultValue::String(s) | DefaultValue::Timestamp(s) | DefaultValue::Uuid(s) => {
                s.is_empty()
            }
            DefaultValue::Int8(v) => *v == 0,
            DefaultValue::Int16(v) => *v == 0,
            DefaultValue::Int32(v) => *v == 0,
            DefaultValue::Int64(v) => *v == 0,
            DefaultValue::Float32(v) => *v == 0.0,
            DefaultValue::Float64(v) => *v == 0.0,
            DefaultValue::Bool(v) => !*v,
            DefaultValue::Enum { .. } => false,
        }
    }

    /// The value as a target-language literal, e.g. `"x"`, `5L`, `1.5f`.
    pub fn literal(&self) -> String {
        match self {
            DefaultValue::String(s) => string_literal(s),
            DefaultValue::Timestamp(s) => format!("OffsetDateTime.parse({})", string_literal(s)),
            DefaultValue::Uuid(s) => format!("UUID.fromString({})", string_literal(s)),
            DefaultValue::Int8(v) => format!("(byte) {}", v),
            DefaultValue::Int16(v) => format!("(short) {}", v),
            DefaultValue::Int32(v) => v.to_string(),
            DefaultValue::Int64(v) => format!("{}L", v),
            DefaultValue::Float32(v) => format!("{}f", v),
            DefaultValue::Float64(v) => format!("{:?}", v),
            DefaultValue::Bool(v) => v.to_string(),
            DefaultValue::Enum { class_name, symbol } => format!("{}.{}", class_name, symbol),
        }
    }

    /// The value as plain text, as carried by a query parameter default.
    pub fn text(&self) -> String {
        match self {
            DefaultValue::String(s) | DefaultValue::Timestamp(s) | DefaultValue::Uuid(s) => {
                s.clone()
            }
            DefaultValue::Int8(v) => v.to_string(),
            DefaultValue::Int16(v) => v.to_string(),
            DefaultValue::Int32(v) => v.to_string(),
            DefaultValue::Int64(v) => v.to_string(),
            DefaultValue::Float32(v) => v.to_string(),
            DefaultValue::Float64(v) => v.to_string(),
            DefaultValue::Bool(v) => v.to_string(),
            DefaultValue::Enum { symbol, .. } => symbol.clone(),
        }
    }
}
