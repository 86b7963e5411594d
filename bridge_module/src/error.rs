use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failures surfaced to the webhook caller. Ignored events are not errors
/// and travel as [`crate::channel::Translation::Ignored`] instead.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid payload: {0}")]
    Validation(String),
    #[error("recipient phone number is required")]
    MissingRecipient,
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("authenticity check failed: {0}")]
    Authenticity(&'static str),
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("{target} delivery failed (status {status:?}): {detail}")]
    Delivery {
        target: &'static str,
        status: Option<u16>,
        detail: String,
    },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BridgeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BridgeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BridgeError::MissingRecipient | BridgeError::MissingRequiredField(_) => {
                StatusCode::BAD_REQUEST
            }
            BridgeError::Authenticity(_) => StatusCode::UNAUTHORIZED,
            BridgeError::MissingCredential(_)
            | BridgeError::Delivery { .. }
            | BridgeError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BridgeError::Validation(_) => "validation_error",
            BridgeError::MissingRecipient | BridgeError::MissingRequiredField(_) => {
                "missing_field"
            }
            BridgeError::Authenticity(_) => "unauthorized",
            BridgeError::MissingCredential(_)
            | BridgeError::Delivery { .. }
            | BridgeError::Http(_) => "delivery_failed",
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "code": self.error_code(),
            "message": self.to_string(),
        }));
        (self.status_code(), body).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
