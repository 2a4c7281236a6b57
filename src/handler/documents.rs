use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Query,
    },
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dtos::{
        documentdtos::{
            BalanceQueryDto, FundAccountDto, GenerateMetadataDto, UploadBundleDto,
            UploadDocumentDto,
        },
        propertydtos::DataResponseDto,
    },
    error::{ErrorMessage, HttpError},
    AppState,
};

/// Default size used for balance checks, 1 MiB.
const DEFAULT_ESTIMATED_SIZE: u64 = 1024 * 1024;

/// Base64 inflates payloads by a third, so bodies get more room than the
/// largest document.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub fn documents_handler() -> Router {
    Router::new()
        .route("/", post(upload_document))
        .route("/bundle", post(upload_bundle))
        .route("/metadata", post(generate_metadata))
        .route("/balance", get(check_balance))
        .route("/fund", post(fund_account))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    body.map(|Json(body)| body).map_err(|e| {
        tracing::debug!("Rejected document request: {}", e.body_text());
        HttpError::bad_request(ErrorMessage::InvalidRequestBody.to_string())
    })
}

pub async fn upload_document(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<UploadDocumentDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let data = body.decode().map_err(HttpError::bad_request)?;

    let result = app_state
        .uploader
        .upload_document(data, &body.filename, &body.metadata)
        .await?;

    Ok(Json(DataResponseDto::new(result)))
}

pub async fn upload_bundle(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<UploadBundleDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (documents, metadata) = body.into_documents().map_err(HttpError::bad_request)?;

    let result = app_state.uploader.upload_bundle(documents, &metadata).await?;

    Ok(Json(DataResponseDto::new(result)))
}

pub async fn generate_metadata(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<GenerateMetadataDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;

    if body.property.registry_number.trim().is_empty() {
        return Err(HttpError::bad_request(
            ErrorMessage::MissingRequiredFields.to_string(),
        ));
    }

    let result = app_state
        .uploader
        .generate_property_metadata(&body.property, &body.documents)
        .await?;

    Ok(Json(DataResponseDto::new(result)))
}

pub async fn check_balance(
    Extension(app_state): Extension<Arc<AppState>>,
    query: Result<Query<BalanceQueryDto>, QueryRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Query(query_params) = query.map_err(|e| HttpError::bad_request(e.body_text()))?;
    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let info = app_state
        .uploader
        .check_balance(query_params.size.unwrap_or(DEFAULT_ESTIMATED_SIZE))
        .await?;

    Ok(Json(DataResponseDto::new(info)))
}

pub async fn fund_account(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<FundAccountDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    let amount = body.amount().map_err(HttpError::bad_request)?;

    let transaction_id = app_state.uploader.fund_account(amount).await?;

    Ok(Json(DataResponseDto::new(json!({
        "transactionId": transaction_id,
        "amount": amount.to_string(),
    }))))
}
