use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A name/value tag attached to an uploaded data item.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Tag {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Optional property details copied onto every upload as tags.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub document_type: Option<String>,
    pub registry_number: Option<String>,
    pub property_type: Option<String>,
    pub municipality: Option<String>,
    pub zone: Option<String>,
    pub owner_address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub id: String,
    pub url: String,
    pub gateway_url: String,
    pub ar_url: String,
    pub document_hash: String,
    pub size: u64,
    pub content_type: String,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundledUpload {
    #[serde(rename = "type")]
    pub document_type: String,
    pub filename: String,
    #[serde(flatten)]
    pub result: UploadResult,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BundleResult {
    pub bundle_id: String,
    pub documents: Vec<BundledUpload>,
    pub total_size: u64,
    pub uploaded_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceInfo {
    pub balance: String,
    pub estimated_cost: String,
    pub has_sufficient_funds: bool,
}

/// Registry facts used to build the NFT metadata document.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegistryPropertyData {
    pub registry_number: String,
    pub municipality: String,
    pub zone: String,
    pub area_sq_meters: u64,
    pub construction_sq_meters: u64,
    pub property_type: u32,
    #[serde(rename = "valuationUSD")]
    pub valuation_usd: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MetadataDocument {
    #[serde(rename = "type")]
    pub document_type: String,
    pub filename: String,
    pub url: String,
    pub hash: String,
    pub size: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataVerification {
    pub verified: bool,
    pub verified_at: String,
    pub platform: String,
}

/// ERC-721 style token metadata for a registered property.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PropertyNftMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub external_url: String,
    pub attributes: Vec<MetadataAttribute>,
    pub documents: Vec<MetadataDocument>,
    pub verification: MetadataVerification,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResult {
    pub metadata: PropertyNftMetadata,
    pub metadata_uri: String,
    pub metadata_hash: String,
}
