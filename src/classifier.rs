//! Mapping from API error payloads to typed errors

use crate::error::{ApiError, ErrorKind};
use crate::types::ApiErrorPayload;

/// Map a service error code to its kind.
///
/// Codes the client does not know yet fall through to [`ErrorKind::Unclassified`]
/// so newly added server codes still surface with their code intact.
pub fn kind_for_code(code: &str) -> ErrorKind {
    match code {
        "authentication_error" => ErrorKind::Authentication,
        "permission_denied" => ErrorKind::Permission,
        "payment_required" => ErrorKind::PaymentRequired,
        "rate_limit_exceeded" => ErrorKind::RateLimit,
        "validation_error" | "missing_image" | "image_too_large" => ErrorKind::Validation,
        "upstream_error" | "internal_server_error" => ErrorKind::Server,
        _ => ErrorKind::Unclassified,
    }
}

/// Build the typed error for a failing response with a parsed error body
pub fn classify(payload: &ApiErrorPayload, status: u16) -> ApiError {
    ApiError {
        kind: kind_for_code(&payload.code),
        message: payload.message.clone(),
        code: payload.code.clone(),
        status: Some(status),
        request_id: payload.request_id.clone(),
        details: payload.details.clone(),
    }
}

/// Build the typed error for a failing response with raw body bytes.
///
/// Bodies that do not deserialize into [`ApiErrorPayload`] produce the
/// generic `unknown_error` carrying the status line.
pub fn classify_body(body: &[u8], status: u16, status_text: &str) -> ApiError {
    match serde_json::from_slice::<ApiErrorPayload>(body) {
        Ok(payload) => classify(&payload, status),
        Err(e) => {
            tracing::debug!(status, error = %e, "Error body is not a JSON error payload");
            ApiError::unparseable(status, status_text)
        },
    }
}
