use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// HTTP-facing error type returned by handlers.
#[derive(Debug)]
pub enum AppError {
    /// Remote store failure.
    DatabaseError(String),
    /// Resource not found error.
    NotFound(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Scoring configuration rejected before any candidate was scored.
    Validation(ValidationError),
    /// Error interacting with an external API.
    ExternalApiError(String),
    /// A collaborator required by the route is not configured.
    ServiceUnavailable(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Validation(e) => write!(f, "Invalid requirements: {}", e),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each variant to a status code and a JSON `{"error": ...}` body.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.clone().into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::DatabaseError(msg) => AppError::DatabaseError(msg.clone()),
            AppError::NotFound(msg) => AppError::NotFound(msg.clone()),
            AppError::BadRequest(msg) => AppError::BadRequest(msg.clone()),
            AppError::Validation(e) => AppError::Validation(e.clone()),
            AppError::ExternalApiError(msg) => AppError::ExternalApiError(msg.clone()),
            AppError::ServiceUnavailable(msg) => AppError::ServiceUnavailable(msg.clone()),
            AppError::InternalError(msg) => AppError::InternalError(msg.clone()),
            AppError::WithContext { source, context } => AppError::WithContext {
                source: source.clone(),
                context: context.clone(),
            },
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApiError(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::ConfigurationMissing(what) => AppError::ServiceUnavailable(format!(
                "{} is not configured",
                what
            )),
            other => AppError::ExternalApiError(other.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => AppError::NotFound(format!("candidate {}", id)),
            RepositoryError::Database(e) => AppError::DatabaseError(e.to_string()),
            RepositoryError::CircuitOpen => {
                AppError::ServiceUnavailable("remote store circuit is open".to_string())
            }
            other => AppError::InternalError(other.to_string()),
        }
    }
}

/// Failure of a single enrichment source.
///
/// Never leaves the orchestrator: every variant is turned into an absent field.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No credential or endpoint configured; the source is skipped on purpose.
    #[error("{0} is not configured")]
    ConfigurationMissing(&'static str),

    #[error("{source_name} unavailable: {reason}")]
    Unavailable {
        source_name: &'static str,
        reason: String,
    },

    #[error("{0} timed out after {1:?}")]
    Timeout(&'static str, Duration),

    #[error("{0} was cancelled")]
    Cancelled(&'static str),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SourceError {
    pub fn unavailable(source_name: &'static str, reason: impl fmt::Display) -> Self {
        SourceError::Unavailable {
            source_name,
            reason: reason.to_string(),
        }
    }
}

/// Vendor payload could not be normalized into a typed record.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Malformed or impossible scoring configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("skill `{skill}` has invalid weight {weight}")]
    InvalidWeight { skill: String, weight: f64 },

    #[error("skill name at position {0} is empty")]
    EmptySkillName(usize),

    #[error("skill `{0}` is listed more than once")]
    DuplicateSkill(String),

    #[error("hard requirement `{kind}` has invalid value `{value}`")]
    InvalidHardRequirement { kind: String, value: String },

    #[error("scoring constant `{0}` must be between 0 and 100")]
    InvalidScoringConstant(&'static str),
}

/// Persistence failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("candidate {0} not found")]
    NotFound(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("remote store rejected the call: circuit open")]
    CircuitOpen,

    #[error("local entry for {0} failed integrity check")]
    Corrupted(String),
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    #[allow(dead_code)]
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_and_keeps_status() {
        let result: Result<(), RepositoryError> = Err(RepositoryError::NotFound("c-1".into()));
        let err = result.context("loading candidate").unwrap_err();
        assert_eq!(err.to_string(), "loading candidate: Not found: candidate c-1");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_maps_to_unprocessable() {
        let err: AppError = ValidationError::EmptySkillName(2).into();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_missing_configuration_maps_to_unavailable() {
        let err: AppError = SourceError::ConfigurationMissing("GITHUB_TOKEN").into();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
