//! Errors raised at the edges of the engine.
//!
//! The pricing functions themselves are infallible.  Errors only arise
//! when validating caller input, looking up plan catalogs, or reading
//! rate files and catalogs from disk.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown plan catalog: {0}")]
    UnknownCatalog(String),

    #[error("invalid rate configuration: {0}")]
    InvalidConfig(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PricingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PricingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PricingError::UnknownCatalog(_) => StatusCode::NOT_FOUND,
            PricingError::InvalidConfig(_)
            | PricingError::Internal(_)
            | PricingError::Io(_)
            | PricingError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({"error": self.to_string()}));
        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PricingError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PricingError::UnknownCatalog("gold".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PricingError::InvalidConfig("tiers.growth".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PricingError::Internal("join".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let err = serde_json::from_str::<u8>("nope").unwrap_err();
        assert_eq!(
            PricingError::from(err).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
