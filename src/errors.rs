use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Body value of `error` on 500 responses when diagnostics are hidden.
pub const TERSE_SERVER_ERROR: &str = "서버 오류";

/// Inquiry payload problems. Always the caller's fault, always HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank after trimming.
    MissingField(&'static str),
    /// The body is not a JSON object of the expected shape.
    MalformedBody(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Missing required field: {}", field),
            ValidationError::MalformedBody(detail) => write!(f, "Malformed request body: {}", detail),
        }
    }
}

/// Failures reported by the external document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalStoreError {
    /// The credential was rejected or lacks access.
    Authentication(String),
    /// The target database does not exist or is not shared with the integration.
    TargetNotFound(String),
    /// The store refused the properties (schema mismatch, bad request).
    Rejected(String),
    /// Transport failures, unexpected statuses, unreadable responses.
    Unknown(String),
}

impl fmt::Display for ExternalStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalStoreError::Authentication(msg) => write!(f, "authentication failed: {}", msg),
            ExternalStoreError::TargetNotFound(msg) => write!(f, "target not found: {}", msg),
            ExternalStoreError::Rejected(msg) => write!(f, "request rejected: {}", msg),
            ExternalStoreError::Unknown(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl std::error::Error for ExternalStoreError {}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for ExternalStoreError {
    /// Converts a `reqwest::Error` into an `ExternalStoreError`.
    fn from(err: reqwest::Error) -> Self {
        ExternalStoreError::Unknown(format!("request failed: {}", err))
    }
}

/// Application-specific error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Bad inquiry payload.
    Validation(ValidationError),
    /// Store credential or target id missing.
    Configuration(String),
    /// The external create-record call failed.
    ExternalStore(ExternalStoreError),
    /// Any verb other than POST/OPTIONS on an inquiry route.
    MethodNotAllowed,
    /// Request body over the size limit.
    PayloadTooLarge,
    /// Per-client request rate exceeded.
    RateLimited,
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "Validation error: {}", e),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ExternalStore(e) => write!(f, "External store error: {}", e),
            AppError::MethodNotAllowed => write!(f, "Method not allowed"),
            AppError::PayloadTooLarge => write!(f, "Payload too large"),
            AppError::RateLimited => write!(f, "Too many requests"),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Configuration(_) | AppError::ExternalStore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(ValidationError::MissingField(_)) => "missing_field",
            AppError::Validation(ValidationError::MalformedBody(_)) => "malformed_body",
            AppError::Configuration(_) => "configuration_error",
            AppError::ExternalStore(ExternalStoreError::Authentication(_)) => {
                "external_store_unauthorized"
            }
            AppError::ExternalStore(ExternalStoreError::TargetNotFound(_)) => {
                "external_store_not_found"
            }
            AppError::ExternalStore(ExternalStoreError::Rejected(_)) => "external_store_rejected",
            AppError::ExternalStore(ExternalStoreError::Unknown(_)) => "external_store_error",
            AppError::MethodNotAllowed => "method_not_allowed",
            AppError::PayloadTooLarge => "payload_too_large",
            AppError::RateLimited => "rate_limited",
        }
    }

    /// Human-readable message shown to the caller.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(ValidationError::MissingField("complexName")) => {
                "단지명이 필요합니다.".to_string()
            }
            AppError::Validation(ValidationError::MissingField(field)) => {
                format!("필수 항목이 누락되었습니다: {}", field)
            }
            AppError::Validation(ValidationError::MalformedBody(_)) => {
                "요청 본문이 올바른 JSON 객체가 아닙니다.".to_string()
            }
            AppError::Configuration(_) => {
                "서버 설정 오류: Notion 연동 정보가 구성되지 않았습니다.".to_string()
            }
            AppError::ExternalStore(ExternalStoreError::Authentication(_)) => {
                "Notion 인증에 실패했습니다. API 키를 확인하세요.".to_string()
            }
            AppError::ExternalStore(ExternalStoreError::TargetNotFound(_)) => {
                "Notion 데이터베이스를 찾을 수 없습니다. 데이터베이스 ID와 공유 설정을 확인하세요."
                    .to_string()
            }
            AppError::ExternalStore(ExternalStoreError::Rejected(_)) => {
                "Notion 데이터베이스 속성이 요청과 일치하지 않습니다.".to_string()
            }
            AppError::ExternalStore(ExternalStoreError::Unknown(_)) => {
                "저장 중 오류가 발생했습니다.".to_string()
            }
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::PayloadTooLarge => "요청 본문이 너무 큽니다.".to_string(),
            AppError::RateLimited => {
                "요청이 너무 많습니다. 잠시 후 다시 시도하세요.".to_string()
            }
        }
    }

    /// Renders the JSON error body.
    ///
    /// 500 bodies carry an `error` field: the full diagnostic when `expose_details`
    /// is set, [`TERSE_SERVER_ERROR`] otherwise.
    pub fn to_response(&self, expose_details: bool) -> Response {
        let status = self.status();
        let mut body = json!({
            "success": false,
            "message": self.user_message(),
            "code": self.code(),
        });

        if status.is_server_error() {
            body["error"] = if expose_details {
                json!(self.to_string())
            } else {
                json!(TERSE_SERVER_ERROR)
            };
        }

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response without diagnostic detail.
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<ExternalStoreError> for AppError {
    fn from(err: ExternalStoreError) -> Self {
        AppError::ExternalStore(err)
    }
}
