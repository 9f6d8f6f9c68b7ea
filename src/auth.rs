use axum::http::HeaderMap;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Exact, case-sensitive comparison. No trimming.
pub fn validate(provided: &str, expected: &str) -> bool {
    provided == expected
}

/// Secret header value; a missing or non-UTF-8 header reads as empty.
pub fn provided_secret(headers: &HeaderMap) -> &str {
    headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
