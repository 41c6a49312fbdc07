use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

/// The one error type crossing layer boundaries. Each variant is a kind
/// tag; lower-layer causes ride along as sources instead of being
/// re-wrapped per layer.
#[derive(Debug, Error, Diagnostic)]
pub enum BackhaulError {
    #[error("Validation failed: {0}")]
    #[diagnostic(code(backhaul::validation))]
    Validation(String),

    #[error("Not found: {0}")]
    #[diagnostic(code(backhaul::not_found))]
    NotFound(String),

    #[error("Transaction failed while {context}: {source}")]
    #[diagnostic(code(backhaul::transaction))]
    Transaction {
        context: String,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Data processing failed: {0}")]
    #[diagnostic(code(backhaul::data_processing))]
    DataProcessing(String),

    #[error("Database error: {0}")]
    #[diagnostic(code(backhaul::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("Config error: {0}")]
    #[diagnostic(code(backhaul::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(backhaul::serde))]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    #[diagnostic(code(backhaul::io))]
    Io(#[from] std::io::Error),
}

impl BackhaulError {
    /// Stable kind tag surfaced in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            BackhaulError::Validation(_) => "validation",
            BackhaulError::NotFound(_) => "not_found",
            BackhaulError::Transaction { .. } => "transactional",
            _ => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            BackhaulError::Validation(_) => StatusCode::BAD_REQUEST,
            BackhaulError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BackhaulError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "error_description": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            BackhaulError::Validation("bad partition".into()).kind(),
            "validation"
        );
        assert_eq!(BackhaulError::NotFound("server".into()).kind(), "not_found");
        assert_eq!(
            BackhaulError::DataProcessing("boom".into()).kind(),
            "internal"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BackhaulError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackhaulError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BackhaulError::DataProcessing("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
