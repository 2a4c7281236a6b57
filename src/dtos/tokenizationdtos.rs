use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::tokenizationmodel::{DocumentLinks, TokenizationStatus, TokenizationType};

/// Fields are optional so a missing value is reported as a uniform
/// "Missing required fields" error rather than a body rejection.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenizationDto {
    pub wallet_address: Option<String>,
    pub property_address: Option<String>,
    pub estimated_value: Option<f64>,
    pub tokenization_type: Option<TokenizationType>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentsDto {
    #[serde(default)]
    pub arweave_links: DocumentLinks,
    #[serde(default)]
    pub documents_uploaded: bool,
    pub status: Option<TokenizationStatus>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContractDeploymentDto {
    #[validate(range(min = 1, message = "Token id must be positive"))]
    pub property_token_id: i64,
    #[validate(length(min = 1, max = 128, message = "Contract address is required"))]
    pub contract_address: String,
}
