//! OpenAPI schemas for domain types.
//!
//! The domain does not derive `ToSchema`; these mirrors register the shapes
//! under the domain type names instead.

use utoipa::ToSchema;

/// Machine-readable error category.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Submitted data failed validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The referenced resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// Unexpected failure.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error response body.
///
/// Invalid forms put `{"fields": {...}, "values": {...}}` in `details`.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(dead_code, reason = "only used to generate the OpenAPI schema")]
pub struct ErrorSchema {
    /// Error category.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "submitted form is invalid")]
    message: String,
    /// Correlation identifier, echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Structured details.
    details: Option<serde_json::Value>,
}
