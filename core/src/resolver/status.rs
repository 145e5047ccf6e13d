//! # Status Symbols
//!
//! Maps schema status symbols (`OK`, `NOT_FOUND`, ...) to HTTP codes.

use crate::error::{AppError, AppResult, ErrorContext};

const STATUS_CODES: &[(&str, u16)] = &[
    ("CONTINUE", 100),
    ("SWITCHING_PROTOCOLS", 101),
    ("OK", 200),
    ("CREATED", 201),
    ("ACCEPTED", 202),
    ("NON_AUTHORITATIVE_INFORMATION", 203),
    ("NO_CONTENT", 204),
    ("RESET_CONTENT", 205),
    ("PARTIAL_CONTENT", 206),
    ("MULTI_STATUS", 207),
    ("MULTIPLE_CHOICES", 300),
    ("MOVED_PERMANENTLY", 301),
    ("FOUND", 302),
    ("SEE_OTHER", 303),
    ("NOT_MODIFIED", 304),
    ("USE_PROXY", 305),
    ("TEMPORARY_REDIRECT", 307),
    ("PERMANENT_REDIRECT", 308),
    ("BAD_REQUEST", 400),
    ("UNAUTHORIZED", 401),
    ("PAYMENT_REQUIRED", 402),
    ("FORBIDDEN", 403),
    ("NOT_FOUND", 404),
    ("METHOD_NOT_ALLOWED", 405),
    ("NOT_ACCEPTABLE", 406),
    ("PROXY_AUTHENTICATION_REQUIRED", 407),
    ("REQUEST_TIMEOUT", 408),
    ("CONFLICT", 409),
    ("GONE", 410),
    ("LENGTH_REQUIRED", 411),
    ("PRECONDITION_FAILED", 412),
    ("REQUEST_ENTITY_TOO_LARGE", 413),
    ("REQUEST_URI_TOO_LONG", 414),
    ("UNSUPPORTED_MEDIA_TYPE", 415),
    ("REQUESTED_RANGE_NOT_SATISFIABLE", 416),
    ("EXPECTATION_FAILED", 417),
    ("UNPROCESSABLE_ENTITY", 422),
    ("LOCKED", 423),
    ("FAILED_DEPENDENCY", 424),
    ("UPGRADE_REQUIRED", 426),
    ("PRECONDITION_REQUIRED", 428),
    ("TOO_MANY_REQUESTS", 429),
    ("REQUEST_HEADER_FIELDS_TOO_LARGE", 431),
    ("INTERNAL_SERVER_ERROR", 500),
    ("NOT_IMPLEMENTED", 501),
    ("BAD_GATEWAY", 502),
    ("SERVICE_UNAVAILABLE", 503),
    ("GATEWAY_TIMEOUT", 504),
    ("HTTP_VERSION_NOT_SUPPORTED", 505),
    ("INSUFFICIENT_STORAGE", 507),
    ("NETWORK_AUTHENTICATION_REQUIRED", 511),
];

/// Looks up the numeric code of a status symbol.
pub fn status_code(symbol: &str) -> Option<u16> {
    STATUS_CODES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, code)| *code)
}

/// The reason phrase of a status symbol, e.g. `NOT_FOUND` -> `Not Found`.
pub fn status_message(symbol: &str) -> Option<String> {
    status_code(symbol)?;
    let message = match symbol {
        "OK" => "OK".to_string(),
        "NON_AUTHORITATIVE_INFORMATION" => "Non-Authoritative Information".to_string(),
        "MULTI_STATUS" => "Multi-Status".to_string(),
        "REQUEST_URI_TOO_LONG" => "Request-URI Too Long".to_string(),
        "HTTP_VERSION_NOT_SUPPORTED" => "HTTP Version Not Supported".to_string(),
        _ => symbol
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    };
    Some(message)
}

/// Like [`status_code`], failing with `InvalidSchema` for unknown symbols.
pub fn require_status_code(symbol: &str, context: &ErrorContext) -> AppResult<u16> {
    status_code(symbol).ok_or_else(|| {
        AppError::invalid(context.clone(), format!("unknown status symbol '{}'", symbol))
    })
}
