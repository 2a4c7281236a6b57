use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use rand::Rng;
use validator::Validate;

use crate::{
    db::tokenizationdb::TokenizationExt,
    dtos::{
        propertydtos::{DataResponseDto, MessageResponseDto},
        tokenizationdtos::{ContractDeploymentDto, CreateTokenizationDto, UpdateDocumentsDto},
    },
    error::{ErrorMessage, HttpError},
    models::tokenizationmodel::{TokenizationRequest, TokenizationUpdate},
    utils::wallet::normalize_wallet_address,
    AppState,
};

pub fn tokenization_handler() -> Router {
    Router::new()
        .route("/", post(create_tokenization))
        // A bare segment is a wallet address, request ids only appear in
        // front of a sub-resource.
        .route("/:id", get(get_tokenizations_by_wallet))
        .route("/:id/documents", post(update_documents))
        .route("/:id/notary-verification", post(record_notary_verification))
        .route("/:id/deployment", post(record_contract_deployment))
}

/// `token-<unix millis>-<6 hex digits>`
fn generate_tokenization_id() -> String {
    let suffix: u32 = rand::rng().random_range(0..0x100_0000);
    format!("token-{}-{:06x}", Utc::now().timestamp_millis(), suffix)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    body.map(|Json(body)| body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e.body_text());
        HttpError::bad_request(ErrorMessage::InvalidRequestBody.to_string())
    })
}

pub async fn create_tokenization(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<CreateTokenizationDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;

    let wallet_address = body.wallet_address.as_deref().map(str::trim).unwrap_or_default();
    let property_address = body.property_address.as_deref().map(str::trim).unwrap_or_default();
    let estimated_value = match body.estimated_value {
        Some(value) if !wallet_address.is_empty() && !property_address.is_empty() => value,
        _ => {
            return Err(HttpError::bad_request(
                ErrorMessage::MissingRequiredFields.to_string(),
            ))
        }
    };

    let wallet_address = normalize_wallet_address(wallet_address)
        .map_err(|_| HttpError::bad_request(ErrorMessage::InvalidWalletAddress.to_string()))?;

    if !estimated_value.is_finite() || estimated_value <= 0.0 {
        return Err(HttpError::bad_request(
            ErrorMessage::InvalidEstimatedValue.to_string(),
        ));
    }

    let request = TokenizationRequest::new(
        generate_tokenization_id(),
        wallet_address,
        property_address.to_string(),
        estimated_value,
        body.tokenization_type.unwrap_or_default(),
    );

    app_state.db_client.create_tokenization(&request).await?;

    tracing::info!(
        "Tokenization request {} created for {}",
        request.id,
        request.wallet_address
    );

    Ok(Json(DataResponseDto::new(request)))
}

pub async fn get_tokenizations_by_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(wallet_address): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let wallet_address = normalize_wallet_address(&wallet_address)
        .map_err(|_| HttpError::bad_request(ErrorMessage::InvalidWalletAddress.to_string()))?;

    let requests = app_state
        .db_client
        .get_tokenizations_by_wallet(&wallet_address)
        .await?;

    Ok(Json(DataResponseDto::new(requests)))
}

pub async fn update_documents(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateDocumentsDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;

    let updated = app_state
        .db_client
        .update_tokenization(
            &id,
            TokenizationUpdate::Documents {
                links: body.arweave_links,
                documents_uploaded: body.documents_uploaded,
                status: body.status,
            },
        )
        .await?;

    tracing::info!("Documents attached to {} ({:?})", updated.id, updated.status);

    Ok(Json(MessageResponseDto {
        success: true,
        message: "Documents updated successfully".to_string(),
    }))
}

pub async fn record_notary_verification(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let updated = app_state
        .db_client
        .update_tokenization(&id, TokenizationUpdate::NotaryVerified)
        .await?;

    tracing::info!("Notary verification recorded for {}", updated.id);

    Ok(Json(DataResponseDto::new(updated)))
}

pub async fn record_contract_deployment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ContractDeploymentDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let updated = app_state
        .db_client
        .update_tokenization(
            &id,
            TokenizationUpdate::ContractDeployed {
                property_token_id: body.property_token_id,
                contract_address: body.contract_address,
            },
        )
        .await?;

    tracing::info!(
        "Contract deployment recorded for {} (token #{:?})",
        updated.id,
        updated.property_token_id
    );

    Ok(Json(DataResponseDto::new(updated)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use super::generate_tokenization_id;
    use crate::test_utils::{get, post, TestApp};

    const WALLET: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    async fn create(app: &TestApp, address: &str) -> Value {
        let (status, body) = post(
            &app.router,
            "/api/tokenize",
            json!({
                "walletAddress": WALLET,
                "propertyAddress": address,
                "estimatedValue": 150000,
                "tokenizationType": "fractional"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["data"].clone()
    }

    #[test]
    fn test_generated_id_shape() {
        let id = generate_tokenization_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "token");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_create_tokenization_request() {
        let app = TestApp::new().await;
        let data = create(&app, "5a Avenida 10-20, Zona 10").await;

        assert_eq!(data["walletAddress"], WALLET.to_lowercase());
        assert_eq!(data["status"], "pending_documents");
        assert_eq!(data["tokenizationType"], "fractional");
        assert_eq!(data["documentsUploaded"], false);
        assert!(data["id"].as_str().unwrap().starts_with("token-"));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_and_bad_fields() {
        let app = TestApp::new().await;

        let (status, body) = post(
            &app.router,
            "/api/tokenize",
            json!({ "walletAddress": WALLET, "propertyAddress": "", "estimatedValue": 10 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");

        let (status, body) = post(
            &app.router,
            "/api/tokenize",
            json!({ "walletAddress": "0x123", "propertyAddress": "Zona 1", "estimatedValue": 10 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid wallet address");

        let (status, _) = post(
            &app.router,
            "/api/tokenize",
            json!({ "walletAddress": WALLET, "propertyAddress": "Zona 1", "estimatedValue": -5 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post(&app.router, "/api/tokenize", json!("not an object")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_list_by_wallet_ignores_case() {
        let app = TestApp::new().await;
        let first = create(&app, "Zona 14").await;
        let second = create(&app, "Antigua").await;

        let shouted = format!("0x{}", WALLET[2..].to_uppercase());
        let (status, body) = get(&app.router, &format!("/api/tokenize/{}", shouted)).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&Value> = body["data"].as_array().unwrap().iter().map(|r| &r["id"]).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&&first["id"]));
        assert!(ids.contains(&&second["id"]));

        let (_, body) = get(
            &app.router,
            "/api/tokenize/0x0000000000000000000000000000000000000001",
        )
        .await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let app = TestApp::new().await;
        let id = create(&app, "Zona 15").await["id"].as_str().unwrap().to_string();

        // Notary cannot verify before documents exist.
        let (status, _) = post(
            &app.router,
            &format!("/api/tokenize/{}/notary-verification", id),
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post(
            &app.router,
            &format!("/api/tokenize/{}/documents", id),
            json!({
                "arweaveLinks": {
                    "propertyTitle": "ar://title",
                    "rgpCertification": "ar://rgp",
                    "photos": ["ar://p1"]
                },
                "documentsUploaded": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Documents updated successfully");

        let (status, body) = post(
            &app.router,
            &format!("/api/tokenize/{}/notary-verification", id),
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "notary_verified");
        assert_eq!(body["data"]["notaryVerified"], true);
        assert_eq!(body["data"]["arweaveLinks"]["photos"], json!(["ar://p1"]));

        let (status, body) = post(
            &app.router,
            &format!("/api/tokenize/{}/deployment", id),
            json!({ "propertyTokenId": 7, "contractAddress": "CCREGISTRY" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "contract_deployed");
        assert_eq!(body["data"]["contractDeployed"], true);
        assert_eq!(body["data"]["propertyTokenId"], 7);
    }

    #[tokio::test]
    async fn test_documents_route_cannot_advance_past_notary_stage() {
        let app = TestApp::new().await;
        let id = create(&app, "Zona 4").await["id"].as_str().unwrap().to_string();
        let uri = format!("/api/tokenize/{}/documents", id);

        for status in ["pending_notary_verification", "notary_verified", "contract_deployed"] {
            let (code, body) = post(
                &app.router,
                &uri,
                json!({ "arweaveLinks": {}, "documentsUploaded": false, "status": status }),
            )
            .await;
            assert_eq!(code, StatusCode::BAD_REQUEST, "status {}", status);
            assert_eq!(body["success"], false);
        }

        let (_, body) = get(&app.router, &format!("/api/tokenize/{}", WALLET)).await;
        let stored = &body["data"][0];
        assert_eq!(stored["status"], "pending_documents");
        assert_eq!(stored["documentsUploaded"], false);
        assert_eq!(stored["propertyTokenId"], Value::Null);

        // Uploaded documents still cannot jump to a verified stage.
        let (code, _) = post(
            &app.router,
            &uri,
            json!({ "arweaveLinks": {}, "documentsUploaded": true, "status": "contract_deployed" }),
        )
        .await;
        assert_eq!(code, StatusCode::BAD_REQUEST);

        let (code, _) = post(&app.router, &uri, json!({ "documentsUploaded": true })).await;
        assert_eq!(code, StatusCode::OK);
        post(&app.router, &format!("/api/tokenize/{}/notary-verification", id), json!({})).await;

        let (code, _) = post(&app.router, &uri, json!({ "documentsUploaded": true })).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_request_is_not_found() {
        let app = TestApp::new().await;
        let (status, body) = post(
            &app.router,
            "/api/tokenize/token-0-000000/documents",
            json!({ "arweaveLinks": {}, "documentsUploaded": true }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Property not found");
    }
}
