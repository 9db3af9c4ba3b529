use crate::application::error::ErrorReport;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const INVALID_JSON: &str = "invalid_json";
    pub const INVALID_ID: &str = "invalid_id";
    pub const NOT_FOUND: &str = "not_found";
    pub const NOTIFICATION_FAILED: &str = "notification_failed";
    pub const REPO: &str = "repo_error";
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    report: Option<ErrorReport>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            report: None,
        }
    }

    /// Log `report` instead of the client-facing hint.
    pub fn with_report(mut self, report: ErrorReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn invalid_json(hint: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_JSON,
            "Request body is not valid JSON",
            Some(hint.into()),
        )
    }

    pub fn invalid_id(hint: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_ID,
            "Post id must be an integer",
            Some(hint.into()),
        )
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report = self.report.unwrap_or_else(|| {
            ErrorReport::from_message(
                "infra::http::api",
                self.status,
                format!(
                    "{}: {}",
                    self.code,
                    self.hint.as_deref().unwrap_or(self.message)
                ),
            )
        });
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        report.attach(&mut response);
        response
    }
}
