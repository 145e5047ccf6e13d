#![deny(missing_docs)]

//! # Annotation Mapping
//!
//! Translates extended schema annotations (`x_min`, `x_pattern`, ...) into
//! validation and documentation directives.
//!
//! Two dialects exist. Struct fields ([`AnnotationSite::Field`]) use bean
//! validation plus XML binding directives. Handler parameters
//! ([`AnnotationSite::Parameter`]) use bean validation plus injection and
//! group conversion. Keys a dialect does not know are skipped.

pub mod groups;

pub use groups::{has_groups, parse_group_value, split_top_level, ValidationGroups};

use crate::resolver::defaults::string_literal;
use crate::resolver::naming::capitalize;
use crate::schema::Annotations;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Prefix carried by every extended annotation key.
pub const ANNOTATION_PREFIX: &str = "x_";

/// Class holding the generated validation group marker interfaces.
pub const VALIDATION_GROUPS_CLASS: &str = "ValidationGroups";

const CONSTRAINTS: &str = "javax.validation.constraints";
const VALIDATION: &str = "javax.validation";
const INJECT: &str = "javax.inject";
const HIBERNATE_CONSTRAINTS: &str = "org.hibernate.validator.constraints";
const VENDOR_CONSTRAINTS: &str = "io.rdlgen.constraint.validators";
const XML_BIND: &str = "javax.xml.bind.annotation";
const JAX_RS: &str = "javax.ws.rs";

/// Where the annotated element ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationSite {
    /// A data model field.
    Field,
    /// A handler method parameter.
    Parameter,
}

/// One argument inside a directive's parentheses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveArg {
    /// Passed through verbatim.
    Raw(String),
    /// `key = value`.
    Pair {
        /// Argument name.
        key: String,
        /// Argument value, verbatim.
        value: String,
    },
    /// References to validation group identifiers, in encounter order.
    Groups(Vec<String>),
    /// Conversion from the default group to the named group.
    ConvertGroup {
        /// Target group identifier.
        to: String,
    },
}

impl fmt::Display for DirectiveArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveArg::Raw(v) => f.write_str(v),
            DirectiveArg::Pair { key, value } => write!(f, "{} = {}", key, value),
            DirectiveArg::Groups(names) => {
                let refs: Vec<String> = names
                    .iter()
                    .map(|n| format!("{}.{}.class", VALIDATION_GROUPS_CLASS, n))
                    .collect();
                write!(f, "{} = {{{}}}", groups::GROUPS_KEY, refs.join(", "))
            }
            DirectiveArg::ConvertGroup { to } => write!(
                f,
                "from = Default.class, to = {}.{}.class",
                VALIDATION_GROUPS_CLASS, to
            ),
        }
    }
}

/// A validation or documentation directive attached to a field or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Directive name without the `@`.
    pub name: String,
    /// Arguments in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<DirectiveArg>,
    /// Fully qualified imports the directive requires.
    pub imports: Vec<String>,
}

impl Directive {
    fn new(name: &str, args: Vec<DirectiveArg>, imports: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            args,
            imports,
        }
    }

    /// The default-value directive of a query parameter.
    pub fn default_value(literal: &str) -> Self {
        Self::new(
            "DefaultValue",
            vec![DirectiveArg::Raw(string_literal(literal))],
            vec![format!("{}.DefaultValue", JAX_RS)],
        )
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            write!(f, "({})", args.join(", "))?;
        }
        Ok(())
    }
}

/// The annotations that apply to an element: its own, or else those of its
/// user-defined type.
pub fn effective_annotations<'a>(
    own: &'a Annotations,
    inherited: Option<&'a Annotations>,
) -> Option<&'a Annotations> {
    if own.is_empty() {
        inherited
    } else {
        Some(own)
    }
}

/// Maps annotation tables to directives in one dialect.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationMapper {
    site: AnnotationSite,
    enabled: bool,
}

impl AnnotationMapper {
    /// A mapper for `site`. A disabled mapper yields no directives.
    pub fn new(site: AnnotationSite, enabled: bool) -> Self {
        Self { site, enabled }
    }

    /// Maps every recognized entry in declaration order.
    pub fn map(&self, annotations: &Annotations, groups: &mut ValidationGroups) -> Vec<Directive> {
        if !self.enabled {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (key, value) in annotations {
            out.extend(self.map_one(key, value, groups));
        }
        out
    }

    /// Maps a single entry. Unknown keys yield nothing.
    pub fn map_one(&self, key: &str, value: &str, groups: &mut ValidationGroups) -> Vec<Directive> {
        let key = key.strip_prefix(ANNOTATION_PREFIX).unwrap_or(key);
        let valued = |name: &str, package: &str, groups: &mut ValidationGroups| {
            Directive::new(name, value_args(value, groups), import(package, name))
        };
        let bare = |name: &str, package: &str| Directive::new(name, Vec::new(), import(package, name));

        let directive = match (self.site, key) {
            (_, "min") => valued("Min", CONSTRAINTS, groups),
            (_, "max") => valued("Max", CONSTRAINTS, groups),
            (_, "size") => valued("Size", CONSTRAINTS, groups),
            (_, "pattern") => valued("Pattern", CONSTRAINTS, groups),
            (_, "digits") => valued("Digits", CONSTRAINTS, groups),
            (_, "not_null") => valued("NotNull", CONSTRAINTS, groups),
            (_, "null") => valued("Null", CONSTRAINTS, groups),
            (AnnotationSite::Field, "not_blank") => valued("NotBlank", HIBERNATE_CONSTRAINTS, groups),
            (AnnotationSite::Field, "not_empty") => valued("NotEmpty", HIBERNATE_CONSTRAINTS, groups),
            (AnnotationSite::Parameter, "not_blank") => valued("NotBlank", CONSTRAINTS, groups),
            (AnnotationSite::Parameter, "not_empty") => valued("NotEmpty", CONSTRAINTS, groups),
            (AnnotationSite::Field, "must_validate") => bare("Valid", VALIDATION),
            (AnnotationSite::Parameter, "must_validate") => {
                return self.must_validate(value, groups)
            }
            (AnnotationSite::Field, "name") => Directive::new(
                "XmlElement",
                vec![DirectiveArg::Raw(format!("name=\"{}\"", value))],
                import(XML_BIND, "XmlElement"),
            ),
            (AnnotationSite::Field, "adapter") => Directive::new(
                "XmlJavaTypeAdapter",
                value_args(value, groups),
                import(&format!("{}.adapters", XML_BIND), "XmlJavaTypeAdapter"),
            ),
            (AnnotationSite::Field, "country_code") => bare("CountryCode", VENDOR_CONSTRAINTS),
            (AnnotationSite::Field, "currency") => bare("ValidCurrency", VENDOR_CONSTRAINTS),
            (AnnotationSite::Field, "language_tag") => bare("LanguageTag", VENDOR_CONSTRAINTS),
            (AnnotationSite::Field, "date_time") => bare("DateTime", VENDOR_CONSTRAINTS),
            (AnnotationSite::Field, "timezone") => bare("ValidTimeZone", VENDOR_CONSTRAINTS),
            (AnnotationSite::Parameter, "country_code") => valued("CountryCode", VENDOR_CONSTRAINTS, groups),
            (AnnotationSite::Parameter, "currency") => valued("ValidCurrency", VENDOR_CONSTRAINTS, groups),
            (AnnotationSite::Parameter, "language_tag") => valued("LanguageTag", VENDOR_CONSTRAINTS, groups),
            (AnnotationSite::Parameter, "date_time") => valued("DateTime", VENDOR_CONSTRAINTS, groups),
            (AnnotationSite::Parameter, "timezone") => valued("ValidTimeZone", VENDOR_CONSTRAINTS, groups),
            (AnnotationSite::Parameter, "named") => Directive::new(
                "Named",
                vec![DirectiveArg::Raw(format!("\"{}\"", value))],
                import(INJECT, "Named"),
            ),
            (site, _) => {
                debug!(key, ?site, "ignoring unrecognized annotation");
                return Vec::new();
            }
        };
        vec![directive]
    }

    fn must_validate(&self, value: &str, groups: &mut ValidationGroups) -> Vec<Directive> {
        let mut out = vec![Directive::new("Valid", Vec::new(), import(VALIDATION, "Valid"))];
        let group = value.trim();
        if !group.is_empty() {
            let group = capitalize(group);
            groups.record(group.clone());
            out.push(Directive::new(
                "ConvertGroup",
                vec![DirectiveArg::ConvertGroup { to: group }],
                vec![
                    format!("{}.groups.Default", VALIDATION),
                    format!("{}.groups.ConvertGroup", VALIDATION),
                ],
            ));
        }
        out
    }
}

fn import(package: &str, name: &str) -> Vec<String> {
    vec![format!("{}.{}", package, name)]
}

fn value_args(value: &str, groups: &mut ValidationGroups) -> Vec<DirectiveArg> {
    if value.is_empty() {
        Vec::new()
    } else if has_groups(value) {
        parse_group_value(value, groups)
    } else {
        vec![DirectiveArg::Raw(value.to_string())]
    }
}
