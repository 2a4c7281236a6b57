// service/deployment.rs
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::service::error::ServiceError;

/// Contract addresses written by the deployment tooling. The API only reads
/// this file; it never talks to the contracts itself.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentManifest {
    pub network: String,
    pub chain_id: String,
    pub deployer: String,
    pub timestamp: String,
    pub contracts: DeployedContracts,
    pub configuration: DeploymentConfiguration,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeployedContracts {
    #[serde(rename = "PropertyRegistry")]
    pub property_registry: String,
    #[serde(rename = "FractionalProperty")]
    pub fractional_property: String,
    #[serde(rename = "PropertyEscrow", default, skip_serializing_if = "Option::is_none")]
    pub property_escrow: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfiguration {
    pub fee_recipient: String,
    pub usdc_address: String,
}

impl DeploymentManifest {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ServiceError::ManifestNotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let manifest: DeploymentManifest = serde_json::from_str(&raw)?;
        tracing::debug!(
            "Loaded deployment manifest for {} (chain {})",
            manifest.network,
            manifest.chain_id
        );
        Ok(manifest)
    }
}
