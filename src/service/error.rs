use axum::http::StatusCode;
use thiserror::Error;

use crate::{
    db::db::StoreError,
    error::{ErrorMessage, HttpError},
    models::tokenizationmodel::TransitionError,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Empty document provided")]
    EmptyDocument,

    #[error("Insufficient balance. Need: {need} wei, Have: {have} wei")]
    InsufficientBalance { need: u128, have: u128 },

    #[error("Storage backend is not configured: {0}")]
    StorageNotConfigured(String),

    #[error("Storage gateway error: {0}")]
    Gateway(String),

    #[error("Storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Deployment manifest not found at {0}")]
    ManifestNotFound(String),

    #[error("Failed to read deployment manifest: {0}")]
    ManifestIo(#[from] std::io::Error),

    #[error("Tokenization request {0} not found")]
    TokenizationNotFound(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => ServiceError::TokenizationNotFound(id),
            StoreError::Transition(transition) => ServiceError::Transition(transition),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::EmptyDocument
            | ServiceError::Transition(_)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,

            ServiceError::ManifestNotFound(_)
            | ServiceError::TokenizationNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::StorageNotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,

            ServiceError::Gateway(_) | ServiceError::Http(_) => StatusCode::BAD_GATEWAY,

            ServiceError::Serialization(_)
            | ServiceError::ManifestIo(_)
            | ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        if status.is_server_error() {
            tracing::error!("Service failure ({}): {}", status, error);
        }

        match error {
            ServiceError::TokenizationNotFound(_) => {
                HttpError::not_found(ErrorMessage::TokenizationNotFound.to_string())
            }
            ServiceError::ManifestNotFound(_) => {
                HttpError::not_found(ErrorMessage::DeploymentNotFound.to_string())
            }
            ServiceError::Store(_) | ServiceError::Serialization(_) | ServiceError::ManifestIo(_) => {
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
            ServiceError::InsufficientBalance { .. } => HttpError::payment_required(error.to_string()),
            ServiceError::Gateway(_) | ServiceError::Http(_) => {
                HttpError::bad_gateway(ErrorMessage::StorageGatewayError.to_string())
            }
            ServiceError::StorageNotConfigured(_) => {
                HttpError::new(ErrorMessage::StorageUnavailable.to_string(), status)
            }
            other => HttpError::new(other.to_string(), status),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(error: StoreError) -> Self {
        ServiceError::from(error).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tokenizationmodel::TokenizationStatus;

    #[test]
    fn test_store_errors_map_to_http_status() {
        let missing: HttpError = StoreError::NotFound("token-1".to_string()).into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.message, "Property not found");

        let skipped: HttpError = StoreError::Transition(TransitionError {
            from: TokenizationStatus::PendingDocuments,
            to: TokenizationStatus::ContractDeployed,
        })
        .into();
        assert_eq!(skipped.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_insufficient_balance_is_payment_required() {
        let err: HttpError = ServiceError::InsufficientBalance { need: 10, have: 3 }.into();
        assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(err.message, "Insufficient balance. Need: 10 wei, Have: 3 wei");
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/etc/secret");
        let err: HttpError = ServiceError::ManifestIo(io).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("secret"));
    }

    #[test]
    fn test_storage_failures_use_fixed_messages() {
        let relay: HttpError = ServiceError::Gateway(
            "Upload relay returned 500 Internal Server Error: stack trace at http://10.0.0.7/upload"
                .to_string(),
        )
        .into();
        assert_eq!(relay.status, StatusCode::BAD_GATEWAY);
        assert_eq!(relay.message, ErrorMessage::StorageGatewayError.to_string());
        assert!(!relay.message.contains("10.0.0.7"));

        let unset: HttpError =
            ServiceError::StorageNotConfigured("IRYS_WALLET_ADDRESS must be set".to_string()).into();
        assert_eq!(unset.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unset.message, "Document storage is not available");
        assert!(!unset.message.contains("IRYS"));
    }
}
