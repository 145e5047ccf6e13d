#![deny(missing_docs)]

//! # Response Resolution
//!
//! Success expectations, handler return contract, result wrapper and the
//! exception dispatch table of a resource.

use crate::config::UndeclaredPolicy;
use crate::error::{AppError, AppResult, ErrorContext};
use crate::resolver::{require_status_code, status_code, ResolvedType, TypeResolver};
use crate::schema::Resource;
use serde::Serialize;
use tracing::warn;

/// Class used by the generic dispatch branch for undeclared statuses.
pub const FALLBACK_ERROR_CLASS: &str = "ResourceError";

/// A status symbol with its numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCode {
    /// Schema symbol, e.g. `NOT_FOUND`.
    pub symbol: String,
    /// HTTP code, e.g. `404`.
    pub code: u16,
}

impl StatusCode {
    /// Looks up `symbol`, failing for unknown symbols.
    pub fn from_symbol(symbol: &str, context: &ErrorContext) -> AppResult<Self> {
        Ok(Self {
            symbol: symbol.to_string(),
            code: require_status_code(symbol, context)?,
        })
    }
}

/// Success statuses a client should accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expectations {
    /// The default success status.
    pub expected: StatusCode,
    /// Additional success statuses sharing the return type.
    pub alternatives: Vec<StatusCode>,
    /// True when the client must check the status explicitly.
    pub needs_expectation: bool,
}

impl Expectations {
    /// Builds the expectation set of `resource`.
    pub fn of(resource: &Resource, context: &ErrorContext) -> AppResult<Self> {
        let expected = StatusCode::from_symbol(&resource.expected, context)?;
        let alternatives = resource
            .alternatives
            .iter()
            .map(|s| StatusCode::from_symbol(s, context))
            .collect::<AppResult<Vec<_>>>()?;
        let needs_expectation = expected.symbol != "OK" || !alternatives.is_empty();
        Ok(Self {
            expected,
            alternatives,
            needs_expectation,
        })
    }

    /// Expected followed by alternatives.
    pub fn all(&self) -> impl Iterator<Item = &StatusCode> {
        std::iter::once(&self.expected).chain(self.alternatives.iter())
    }
}

/// What the generated handler method hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerReturn {
    /// Nothing is returned; a result object is passed in and completed later.
    ResultWrapper {
        /// The wrapper class name.
        class_name: String,
    },
    /// An empty success response.
    NoContent,
    /// The value is returned directly.
    Value {
        /// The returned type.
        value_type: ResolvedType,
    },
}

/// A response header set through the result wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrapperHeader {
    /// Setter / variable name.
    pub name: String,
    /// Header name on the wire.
    pub header: String,
    /// Header value type.
    pub header_type: ResolvedType,
    /// Whether the header may be absent.
    pub optional: bool,
}

/// The deferred-completion object of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultWrapper {
    /// Generated class name, `Capitalize(methodName) + "Result"`.
    pub class_name: String,
    /// Value type delivered on completion.
    pub value_type: ResolvedType,
    /// Completion is asynchronous.
    pub is_async: bool,
    /// Extra response headers.
    pub headers: Vec<WrapperHeader>,
    /// For async resources, the path parameters identifying a waiter.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub waiter_keys: Vec<String>,
}

/// True when outputs or asynchronous completion force a result wrapper.
pub fn needs_result_wrapper(resource: &Resource) -> bool {
    !resource.outputs.is_empty() || resource.is_async()
}

/// Builds the result wrapper descriptor.
pub fn result_wrapper(
    resource: &Resource,
    class_name: String,
    value_type: ResolvedType,
    waiter_keys: Vec<String>,
    resolver: &TypeResolver<'_>,
    context: &ErrorContext,
) -> AppResult<ResultWrapper> {
    let headers = resource
        .outputs
        .iter()
        .map(|out| {
            Ok(WrapperHeader {
                name: out.name.clone(),
                header: out.header.clone(),
                header_type: resolver.resolve_in(
                    &out.type_ref,
                    true,
                    None,
                    None,
                    &context.with_field(&out.name),
                )?,
                optional: out.optional,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    let is_async = resource.is_async();
    Ok(ResultWrapper {
        class_name,
        value_type,
        is_async,
        headers,
        waiter_keys: if is_async { waiter_keys } else { Vec::new() },
    })
}

/// Decides the handler return contract.
pub fn handler_return(
    resource: &Resource,
    wrapper: Option<&ResultWrapper>,
    value_type: &ResolvedType,
) -> HandlerReturn {
    if let Some(w) = wrapper {
        return HandlerReturn::ResultWrapper {
            class_name: w.class_name.clone(),
        };
    }
    if resource.expected == "NO_CONTENT" && resource.alternatives.is_empty() {
        HandlerReturn::NoContent
    } else {
        HandlerReturn::Value {
            value_type: value_type.clone(),
        }
    }
}

/// One typed branch of the exception dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionBranch {
    /// The error status.
    pub status: StatusCode,
    /// The declared error payload type.
    pub error_type: ResolvedType,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The branch selected for a runtime status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dispatch {
    /// The status is one of the success statuses and carries the return type.
    Success {
        /// The success status.
        status: StatusCode,
        /// The resource return type.
        value_type: ResolvedType,
    },
    /// A declared exception type handles the status.
    Declared(ExceptionBranch),
    /// The generic fallback branch handles the status.
    Fallback {
        /// The numeric status.
        code: u16,
        /// The generic error class.
        class_name: String,
    },
}

/// Status to exception type dispatch, in declaration order.
///
/// The policy is applied when a response status is dispatched, after the
/// success statuses and the declared branches have been tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionDispatch {
    /// The owning resource method name.
    pub resource: String,
    /// Expected and alternative statuses.
    pub success: Vec<StatusCode>,
    /// Payload type shared by every success status.
    pub success_type: ResolvedType,
    /// Typed branches.
    pub branches: Vec<ExceptionBranch>,
    /// Behaviour for statuses without a branch.
    pub policy: UndeclaredPolicy,
}

impl ExceptionDispatch {
    /// Builds the table from the resource's exception map.
    pub fn of(
        resource: &Resource,
        method_name: &str,
        expectations: &Expectations,
        success_type: &ResolvedType,
        policy: UndeclaredPolicy,
        resolver: &TypeResolver<'_>,
        context: &ErrorContext,
    ) -> AppResult<Self> {
        let branches = resource
            .exceptions
            .iter()
            .map(|(symbol, def)| {
                let ctx = context.with_field(symbol);
                Ok(ExceptionBranch {
                    status: StatusCode::from_symbol(symbol, &ctx)?,
                    error_type: resolver.resolve_in(&def.type_ref, true, None, None, &ctx)?,
                    comment: def.comment.clone(),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self {
            resource: method_name.to_string(),
            success: expectations.all().cloned().collect(),
            success_type: success_type.clone(),
            branches,
            policy,
        })
    }

    /// Picks the branch for a status given as a symbol or a numeric code.
    pub fn branch_for(&self, status: &str) -> AppResult<Dispatch> {
        let code = status.parse::<u16>().ok().or_else(|| status_code(status));
        let same = |s: &StatusCode| s.symbol == status || Some(s.code) == code;
        if let Some(branch) = self.branches.iter().find(|b| same(&b.status)) {
            return Ok(Dispatch::Declared(branch.clone()));
        }
        if let Some(ok) = self.success.iter().find(|s| same(s)) {
            return Ok(Dispatch::Success {
                status: ok.clone(),
                value_type: self.success_type.clone(),
            });
        }
        match self.policy {
            UndeclaredPolicy::Strict => Err(AppError::UndeclaredException {
                resource: self.resource.clone(),
                status: status.to_string(),
            }),
            UndeclaredPolicy::Tolerant => {
                warn!(resource = %self.resource, status, "undeclared exception, using generic error");
                Ok(Dispatch::Fallback {
                    code: code.unwrap_or(500),
                    class_name: FALLBACK_ERROR_CLASS.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::schema::{Schema, TypeRegistry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(resource: serde_json::Value) -> Schema {
        serde_json::from_value(json!({
            "name": "sample",
            "types": [
                {"kind": "struct", "name": "User", "fields": []},
                {"kind": "struct", "name": "Problem", "fields": []}
            ],
            "resources": [resource]
        }))
        .unwrap()
    }

    fn dispatch(r: &Resource, policy: UndeclaredPolicy, resolver: &TypeResolver<'_>) -> ExceptionDispatch {
        let exp = Expectations::of(r, &ErrorContext::none()).unwrap();
        let value_type = resolver.resolve(&r.type_ref, true, None, None).unwrap();
        ExceptionDispatch::of(r, "getUser", &exp, &value_type, policy, resolver, &ErrorContext::none())
            .unwrap()
    }

    #[test]
    fn test_expectations() {
        let s = schema(json!({"method": "POST", "path": "/u", "type": "User",
            "expected": "CREATED", "alternatives": ["ACCEPTED"]}));
        let exp = Expectations::of(&s.resources[0], &ErrorContext::none()).unwrap();
        assert!(exp.needs_expectation);
        assert_eq!(exp.all().map(|s| s.code).collect::<Vec<_>>(), vec![201, 202]);

        let plain = schema(json!({"method": "GET", "path": "/u", "type": "User"}));
        let exp = Expectations::of(&plain.resources[0], &ErrorContext::none()).unwrap();
        assert!(!exp.needs_expectation);
    }

    #[test]
    fn test_handler_return_variants() {
        let s = schema(json!({"method": "DELETE", "path": "/u", "type": "User", "expected": "NO_CONTENT"}));
        let reg = TypeRegistry::new(&s).unwrap();
        let resolver = TypeResolver::new(&reg, &GeneratorConfig::default());
        let user = resolver.resolve("User", true, None, None).unwrap();
        assert_eq!(handler_return(&s.resources[0], None, &user), HandlerReturn::NoContent);

        let mut with_alt = s.resources[0].clone();
        with_alt.alternatives.push("OK".into());
        assert_eq!(
            handler_return(&with_alt, None, &user),
            HandlerReturn::Value { value_type: user.clone() }
        );
    }

    #[test]
    fn test_wrapper_for_async() {
        let s = schema(json!({"method": "GET", "path": "/u/{id}", "type": "User", "async": true,
            "outputs": [{"name": "etag", "header": "ETag"}]}));
        let reg = TypeRegistry::new(&s).unwrap();
        let resolver = TypeResolver::new(&reg, &GeneratorConfig::default());
        let r = &s.resources[0];
        assert!(needs_result_wrapper(r));
        let user = resolver.resolve("User", true, None, None).unwrap();
        let wrapper = result_wrapper(
            r,
            "GetUserResult".into(),
            user.clone(),
            vec!["id".into()],
            &resolver,
            &ErrorContext::none(),
        )
        .unwrap();
        assert!(wrapper.is_async);
        assert_eq!(wrapper.headers[0].header_type.name, "String");
        assert_eq!(wrapper.waiter_keys, vec!["id"]);
        assert_eq!(
            handler_return(r, Some(&wrapper), &user),
            HandlerReturn::ResultWrapper { class_name: "GetUserResult".into() }
        );
    }

    #[test]
    fn test_dispatch_policies() {
        let s = schema(json!({"method": "GET", "path": "/u", "type": "User",
            "exceptions": {"NOT_FOUND": {"type": "Problem"}, "BAD_REQUEST": {"type": "Problem"}}}));
        let reg = TypeRegistry::new(&s).unwrap();
        let resolver = TypeResolver::new(&reg, &GeneratorConfig::default());
        let r = &s.resources[0];

        let tolerant = dispatch(r, UndeclaredPolicy::Tolerant, &resolver);
        assert_eq!(tolerant.branches[0].status.code, 404);
        assert!(matches!(tolerant.branch_for("404"), Ok(Dispatch::Declared(_))));
        assert_eq!(
            tolerant.branch_for("CONFLICT").unwrap(),
            Dispatch::Fallback { code: 409, class_name: "ResourceError".into() }
        );

        let strict = dispatch(r, UndeclaredPolicy::Strict, &resolver);
        assert!(matches!(strict.branch_for("BAD_REQUEST"), Ok(Dispatch::Declared(_))));
        assert!(matches!(
            strict.branch_for("CONFLICT"),
            Err(AppError::UndeclaredException { .. })
        ));
    }

    #[test]
    fn test_unknown_exception_type_is_fatal() {
        let s = schema(json!({"method": "GET", "path": "/u", "type": "User",
            "exceptions": {"NOT_FOUND": {"type": "Nope"}}}));
        let reg = TypeRegistry::new(&s).unwrap();
        let resolver = TypeResolver::new(&reg, &GeneratorConfig::default());
        let r = &s.resources[0];
        let exp = Expectations::of(r, &ErrorContext::none()).unwrap();
        let user = resolver.resolve("User", true, None, None).unwrap();
        let err = ExceptionDispatch::of(
            r,
            "getUser",
            &exp,
            &user,
            UndeclaredPolicy::Tolerant,
            &resolver,
            &ErrorContext::resource("getUser"),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::UnknownType { .. }));
    }

    #[test]
    fn test_alternative_status_dispatches_to_success_type() {
        let s = schema(json!({"method": "POST", "path": "/users", "type": "User",
            "expected": "CREATED", "alternatives": ["ACCEPTED"],
            "exceptions": {"BAD_REQUEST": {"type": "Problem"}}}));
        let reg = TypeRegistry::new(&s).unwrap();
        let resolver = TypeResolver::new(&reg, &GeneratorConfig::default());
        let r = &s.resources[0];

        for policy in [UndeclaredPolicy::Strict, UndeclaredPolicy::Tolerant] {
            let table = dispatch(r, policy, &resolver);
            for status in ["ACCEPTED", "202", "CREATED"] {
                match table.branch_for(status).unwrap() {
                    Dispatch::Success { status, value_type } => {
                        assert!(status.code == 201 || status.code == 202);
                        assert_eq!(value_type.name, "User");
                    }
                    other => panic!("expected success branch, got {:?}", other),
                }
            }
            assert!(matches!(table.branch_for("BAD_REQUEST"), Ok(Dispatch::Declared(_))));
        }
        let strict = dispatch(r, UndeclaredPolicy::Strict, &resolver);
        assert!(strict.branch_for("OK").is_err());
    }
}
