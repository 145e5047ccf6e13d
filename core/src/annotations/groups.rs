#![deny(missing_docs)]

//! # Validation Groups
//!
//! Parsing of the `groups=<a>|<b>` sub-grammar embedded in annotation values,
//! and the run-scoped accumulator of every group seen.
//!
//! ```text
//! "groups=create|update"          -> groups = {Create, Update}
//! "5, groups = create"            -> value = 5, groups = {Create}
//! "regexp=\"[a-z]+\",groups=read" -> regexp="[a-z]+", groups = {Read}
//! ```

use crate::annotations::DirectiveArg;
use crate::resolver::naming::capitalize;
use indexmap::IndexSet;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// The annotation value key introducing a group list.
pub const GROUPS_KEY: &str = "groups";

/// Groups referenced during one generation run, in first-seen order.
///
/// Created fresh for each run and threaded through the annotation mapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationGroups {
    names: IndexSet<String>,
}

impl ValidationGroups {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a group identifier (already capitalized).
    pub fn record(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// True when the group has been recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Recorded groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of distinct groups.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Folds another accumulator into this one, keeping first-seen order.
    pub fn merge(&mut self, other: ValidationGroups) {
        self.names.extend(other.names);
    }

    /// Consumes the accumulator into a sorted list for declaration output.
    pub fn into_sorted(self) -> Vec<String> {
        let mut names: Vec<String> = self.names.into_iter().collect();
        names.sort();
        names
    }
}

/// True when an annotation value embeds a `groups=` list.
pub fn has_groups(value: &str) -> bool {
    static GROUPS_RE: OnceLock<Regex> = OnceLock::new();
    let re = GROUPS_RE.get_or_init(|| Regex::new(r"(^|[ ,])groups\s?=").expect("Invalid regex"));
    re.is_match(value)
}

/// Splits `value` on `sep` occurrences that are outside quotes and brackets.
pub fn split_top_level(value: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (idx, c) in value.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if c == sep && depth <= 0 => {
                parts.push(&value[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Parses an annotation value containing a group list.
///
/// Pieces are kept in declaration order. Every group is capitalized and
/// recorded into `groups`; a piece without `=` becomes `value = <piece>`.
pub fn parse_group_value(value: &str, groups: &mut ValidationGroups) -> Vec<DirectiveArg> {
    let mut args = Vec::new();
    for piece in split_top_level(value, ',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let kv = split_top_level(piece, '=');
        let key = kv[0].trim();
        if key == GROUPS_KEY {
            if kv.len() != 2 {
                continue;
            }
            let payload: String = kv[1].chars().filter(|c| !c.is_whitespace()).collect();
            let names: Vec<String> = payload
                .split('|')
                .filter(|g| !g.is_empty())
                .map(capitalize)
                .collect();
            for name in &names {
                groups.record(name.clone());
            }
            args.push(DirectiveArg::Groups(names));
        } else if kv.len() == 1 {
            args.push(DirectiveArg::Pair {
                key: "value".into(),
                value: piece.to_string(),
            });
        } else {
            args.push(DirectiveArg::Raw(piece.to_string()));
        }
    }
    args
}
