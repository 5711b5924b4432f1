use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::catalog::CatalogError;
use crate::map::MapError;

/// Error text fragments that point at the managed host's TLS proxy
const TLS_SYMPTOMS: &[&str] = &["ssl", "tls", "certificate", "handshake"];

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or missing CSRF token")]
    CsrfRejected,

    #[error("{0}")]
    BadRequest(String),

    #[error("Request entity too large")]
    PayloadTooLarge,

    #[error(transparent)]
    MapUnavailable(#[from] MapError),

    /// Error carrying its own status code
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Attached to error responses so outer middleware can tell what went wrong
#[derive(Debug, Clone, Copy)]
pub struct ErrorMarker {
    pub tls_symptom: bool,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::CsrfRejected => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MapUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Status { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_tls_symptom(&self) -> bool {
        let text = match self {
            Self::Internal(error) => format!("{error:#}"),
            Self::MapUnavailable(error) => error.to_string(),
            _ => return false,
        }
        .to_lowercase();
        TLS_SYMPTOMS.iter().any(|symptom| text.contains(symptom))
    }
}

impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::UnknownLocation(id) => Self::NotFound(format!("Location {id}")),
            CatalogError::InvalidScore(_) | CatalogError::InvalidHours(_) => Self::BadRequest(error.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(error) => {
                error!("Internal error: {error:#}");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        response.extensions_mut().insert(ErrorMarker {
            tls_symptom: self.is_tls_symptom(),
        });
        response
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn status_ok() {
        assert_eq!(AppError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            AppError::Status {
                status: StatusCode::CONFLICT,
                message: "taken".to_string(),
            }
            .status(),
            StatusCode::CONFLICT,
        );
        assert_eq!(AppError::from(anyhow!("boom")).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::from(CatalogError::InvalidHours(0)).status(),
            StatusCode::BAD_REQUEST,
        );
    }

    #[test]
    fn tls_symptom_ok() {
        let error = anyhow!("routines:ssl3_get_record:wrong version number").context("upstream call failed");
        assert!(AppError::from(error).is_tls_symptom());
        assert!(!AppError::from(anyhow!("connection refused")).is_tls_symptom());
        assert!(!AppError::BadRequest("bad tls".to_string()).is_tls_symptom());
    }
}
