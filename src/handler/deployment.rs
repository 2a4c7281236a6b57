use std::sync::Arc;

use axum::{response::IntoResponse, Extension, Json};

use crate::{
    dtos::propertydtos::DataResponseDto, error::HttpError,
    service::deployment::DeploymentManifest, AppState,
};

pub async fn get_deployment(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let manifest = DeploymentManifest::load(&app_state.env.deployment_manifest).await?;
    Ok(Json(DataResponseDto::new(manifest)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_utils::{get, TestApp};

    #[tokio::test]
    async fn test_missing_manifest_is_not_found() {
        let app = TestApp::new().await;
        let (status, body) = get(&app.router, "/api/deployment").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No deployment manifest found");
    }

    #[tokio::test]
    async fn test_manifest_is_served() {
        let path = std::env::temp_dir().join(format!("propius-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(
            &path,
            r#"{
                "network": "testnet",
                "chainId": "84532",
                "deployer": "GDEPLOYER",
                "timestamp": "2025-01-01T00:00:00.000Z",
                "contracts": {
                    "PropertyRegistry": "CREGISTRY",
                    "FractionalProperty": "CFRACTIONAL"
                },
                "configuration": { "feeRecipient": "GFEES", "usdcAddress": "CUSDC" }
            }"#,
        )
        .await
        .unwrap();

        let app = TestApp::with_manifest(path.to_string_lossy().as_ref()).await;
        let (status, body) = get(&app.router, "/api/deployment").await;
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["contracts"]["PropertyRegistry"], "CREGISTRY");
        assert_eq!(body["data"]["configuration"]["feeRecipient"], "GFEES");
    }
}
