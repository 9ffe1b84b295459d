//! Error handling for the HTTP layer: every failure becomes an RFC 7807
//! problem-details body.

use axum::{
    body::Body,
    extract::rejection::{JsonRejection, PathRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use courselib_db::StoreError;
use courselib_kernel::validation::FieldErrors;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

pub const PROBLEM_JSON: &str = "application/problem+json";
pub const VALIDATION_PROBLEM_TYPE: &str = "https://courselibrary.com/modelvalidationproblem";
pub const SUPPORT_MESSAGE: &str = "An error occurred, please contact application support.";

/// Problem-details response body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
    pub trace_id: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {} invalid field(s)", errors.len())]
    Validation {
        errors: FieldErrors,
        instance: Option<String>,
    },

    #[error("bad request: {message}")]
    BadRequest {
        message: String,
        errors: FieldErrors,
        instance: Option<String>,
    },

    #[error("not found: {message}")]
    NotFound {
        message: String,
        instance: Option<String>,
    },

    #[error("conflict: {message}")]
    Conflict {
        message: String,
        instance: Option<String>,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error (422)
    pub fn validation(errors: impl Into<FieldErrors>) -> Self {
        Self::Validation {
            errors: errors.into(),
            instance: None,
        }
    }

    /// Create an input error (400) with no field breakdown
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            errors: FieldErrors::new(),
            instance: None,
        }
    }

    /// Create an input error (400) keyed by the offending input
    pub fn bad_input(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = FieldErrors::new();
        errors.insert(field, message.clone());
        Self::BadRequest {
            message,
            errors,
            instance: None,
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            instance: None,
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            instance: None,
        }
    }

    /// Attach the request path reported as the problem `instance`
    pub fn at(mut self, path: impl Into<String>) -> Self {
        match &mut self {
            AppError::Validation { instance, .. }
            | AppError::BadRequest { instance, .. }
            | AppError::NotFound { instance, .. }
            | AppError::Conflict { instance, .. } => *instance = Some(path.into()),
            AppError::Internal(_) => {}
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_problem(self, trace_id: String) -> ProblemDetails {
        let status = self.status();
        let (kind, title, detail, instance, errors) = match self {
            AppError::Validation { errors, instance } => (
                VALIDATION_PROBLEM_TYPE,
                "One or more validation errors occurred.",
                "See the errors field for details.".to_string(),
                instance,
                errors,
            ),
            AppError::BadRequest {
                message,
                errors,
                instance,
            } => (
                "https://tools.ietf.org/html/rfc7231#section-6.5.1",
                "One or more input errors occurred.",
                message,
                instance,
                errors,
            ),
            AppError::NotFound { message, instance } => (
                "https://tools.ietf.org/html/rfc7231#section-6.5.4",
                "Not Found",
                message,
                instance,
                FieldErrors::new(),
            ),
            AppError::Conflict { message, instance } => (
                "https://tools.ietf.org/html/rfc7231#section-6.5.8",
                "Conflict",
                message,
                instance,
                FieldErrors::new(),
            ),
            AppError::Internal(_) => (
                "https://tools.ietf.org/html/rfc7231#section-6.6.1",
                "Internal Server Error",
                SUPPORT_MESSAGE.to_string(),
                None,
                FieldErrors::new(),
            ),
        };

        ProblemDetails {
            kind: kind.to_string(),
            title: title.to_string(),
            status: status.as_u16(),
            detail,
            instance,
            errors,
            trace_id,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let trace_id = Uuid::now_v7().to_string();
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                trace_id = %trace_id,
                status_code = %status.as_u16(),
                error = %format!("{self:#}"),
                "request failed"
            );
        } else {
            tracing::warn!(
                trace_id = %trace_id,
                status_code = %status.as_u16(),
                error = %self,
                "request rejected"
            );
        }

        let internal_detail = match &self {
            AppError::Internal(e) => Some(format!("{e:#}")),
            _ => None,
        };

        let problem = self.into_problem(trace_id);
        let mut response = (
            status,
            [(header::CONTENT_TYPE, PROBLEM_JSON)],
            Json(problem.clone()),
        )
            .into_response();

        if let Some(detail) = internal_detail {
            response
                .extensions_mut()
                .insert(InternalDetail(ProblemDetails { detail, ..problem }));
        }
        response
    }
}

/// Unredacted problem for a 500, carried on the response extensions.
///
/// The body always holds [`SUPPORT_MESSAGE`]; only [`disclose_internal_details`]
/// with `expose` set swaps the underlying error text in.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub ProblemDetails);

/// Strip the unredacted problem from a response, writing it into the body
/// when `expose` is set (local development only).
pub fn disclose_internal_details(mut response: Response, expose: bool) -> Response {
    let Some(InternalDetail(problem)) = response.extensions_mut().remove::<InternalDetail>() else {
        return response;
    };
    if !expose {
        return response;
    }

    match serde_json::to_vec(&problem) {
        Ok(bytes) => {
            response.headers_mut().remove(header::CONTENT_LENGTH);
            *response.body_mut() = Body::from(bytes);
        }
        Err(e) => tracing::warn!(error = %e, "failed to encode internal error detail"),
    }
    response
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::validation(errors)
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateKey { .. } => AppError::conflict(error.to_string()),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_input("$", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_input("path", rejection.body_text())
    }
}
