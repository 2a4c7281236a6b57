// service/uploader.rs
use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    models::documentmodel::{
        BalanceInfo, BundleResult, BundledUpload, DocumentMetadata, MetadataAttribute,
        MetadataDocument, MetadataResult, MetadataVerification, PropertyNftMetadata,
        RegistryPropertyData, Tag, UploadResult,
    },
    service::{error::ServiceError, storage_backend::StorageBackend},
};

const PLATFORM: &str = "Propius";
const COUNTRY: &str = "Guatemala";
const DEFAULT_DOCUMENT_TYPE: &str = "property-document";
const BUNDLE_UPLOAD_PAUSE: Duration = Duration::from_secs(1);

/// A file handed to [`DocumentUploader::upload_bundle`].
#[derive(Debug, Clone)]
pub struct BundleDocument {
    pub data: Vec<u8>,
    pub filename: String,
    pub document_type: Option<String>,
}

pub struct DocumentUploader {
    backend: Arc<dyn StorageBackend>,
    node_url: String,
    gateway_url: String,
    bundle_pause: Duration,
}

impl DocumentUploader {
    pub fn new(backend: Arc<dyn StorageBackend>, node_url: &str, gateway_url: &str) -> Self {
        Self {
            backend,
            node_url: node_url.trim_end_matches('/').to_string(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            bundle_pause: BUNDLE_UPLOAD_PAUSE,
        }
    }

    pub fn with_bundle_pause(mut self, pause: Duration) -> Self {
        self.bundle_pause = pause;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Hashes, prices and uploads a single document with the platform tags.
    pub async fn upload_document(
        &self,
        data: Vec<u8>,
        filename: &str,
        metadata: &DocumentMetadata,
    ) -> Result<UploadResult, ServiceError> {
        if data.is_empty() {
            return Err(ServiceError::EmptyDocument);
        }

        let size = data.len() as u64;
        tracing::info!(
            "📄 Uploading property document: {} ({} bytes, {:.2} MB)",
            filename,
            size,
            size as f64 / 1024.0 / 1024.0
        );

        let document_hash = sha256_hex(&data);
        tracing::debug!("Document SHA256: {}", document_hash);

        let price = self.backend.price(size).await?;
        let balance = self.backend.balance().await?;
        tracing::debug!("Upload cost: {} wei, Balance: {} wei", price, balance);

        if balance < price {
            return Err(ServiceError::InsufficientBalance { need: price, have: balance });
        }

        let content_type = content_type_for(filename);
        let tags = build_tags(filename, &document_hash, size, content_type, metadata);

        let id = self.backend.upload(data, &tags).await?;

        let result = UploadResult {
            url: format!("{}/{}", self.node_url, id),
            gateway_url: format!("{}/{}", self.gateway_url, id),
            ar_url: format!("ar://{}", id),
            id,
            document_hash,
            size,
            content_type: content_type.to_string(),
            tags: tags
                .into_iter()
                .map(|tag| (tag.name, tag.value))
                .collect::<BTreeMap<_, _>>(),
        };

        tracing::info!("✅ Document uploaded: {} -> {}", filename, result.gateway_url);
        Ok(result)
    }

    /// Uploads the documents one after another. The first failure aborts
    /// the bundle.
    pub async fn upload_bundle(
        &self,
        documents: Vec<BundleDocument>,
        metadata: &DocumentMetadata,
    ) -> Result<BundleResult, ServiceError> {
        tracing::info!("📦 Uploading document bundle ({} files)", documents.len());

        let count = documents.len();
        let mut results = Vec::with_capacity(count);

        for (index, doc) in documents.into_iter().enumerate() {
            let document_type = doc
                .document_type
                .unwrap_or_else(|| DEFAULT_DOCUMENT_TYPE.to_string());
            let doc_metadata = DocumentMetadata {
                document_type: Some(document_type.clone()),
                ..metadata.clone()
            };

            let result = self.upload_document(doc.data, &doc.filename, &doc_metadata).await?;
            results.push(BundledUpload {
                document_type,
                filename: doc.filename,
                result,
            });

            if index + 1 < count && !self.bundle_pause.is_zero() {
                tokio::time::sleep(self.bundle_pause).await;
            }
        }

        let total_size = results.iter().map(|doc| doc.result.size).sum();
        tracing::info!("✅ Bundle upload complete! {} documents uploaded", results.len());

        Ok(BundleResult {
            bundle_id: Uuid::new_v4().to_string(),
            documents: results,
            total_size,
            uploaded_at: iso_now(),
        })
    }

    /// Builds the token metadata for a registered property and stores it
    /// next to its documents.
    pub async fn generate_property_metadata(
        &self,
        property: &RegistryPropertyData,
        documents: &[BundledUpload],
    ) -> Result<MetadataResult, ServiceError> {
        let metadata = build_nft_metadata(property, documents);

        let bytes = serde_json::to_vec_pretty(&metadata)?;
        let filename = format!("{}-metadata.json", property.registry_number);
        let upload = self
            .upload_document(
                bytes,
                &filename,
                &DocumentMetadata {
                    document_type: Some("nft-metadata".to_string()),
                    registry_number: Some(property.registry_number.clone()),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!("📋 Property metadata uploaded: {}", upload.gateway_url);

        Ok(MetadataResult {
            metadata,
            metadata_uri: upload.gateway_url,
            metadata_hash: upload.document_hash,
        })
    }

    pub async fn fund_account(&self, amount: u128) -> Result<String, ServiceError> {
        if amount == 0 {
            return Err(ServiceError::Validation("Funding amount must be positive".to_string()));
        }

        tracing::info!("💰 Funding {} account with {} wei", self.backend.name(), amount);
        let tx = self.backend.fund(amount).await?;
        tracing::info!("✅ Account funded: {}", tx);
        Ok(tx)
    }

    pub async fn check_balance(&self, estimated_size: u64) -> Result<BalanceInfo, ServiceError> {
        let price = self.backend.price(estimated_size).await?;
        let balance = self.backend.balance().await?;

        Ok(BalanceInfo {
            balance: balance.to_string(),
            estimated_cost: price.to_string(),
            has_sufficient_funds: balance >= price,
        })
    }
}

fn build_tags(
    filename: &str,
    document_hash: &str,
    size: u64,
    content_type: &str,
    metadata: &DocumentMetadata,
) -> Vec<Tag> {
    let mut tags = vec![
        Tag::new("Content-Type", content_type),
        Tag::new("Filename", filename),
        Tag::new("Document-Hash", document_hash),
        Tag::new("File-Size", size.to_string()),
        Tag::new("Upload-Timestamp", iso_now()),
        Tag::new("Platform", PLATFORM),
        Tag::new(
            "Document-Type",
            metadata.document_type.as_deref().unwrap_or(DEFAULT_DOCUMENT_TYPE),
        ),
        Tag::new("Country", COUNTRY),
    ];

    let optional = [
        ("Registry-Number", &metadata.registry_number),
        ("Property-Type", &metadata.property_type),
        ("Municipality", &metadata.municipality),
        ("Zone", &metadata.zone),
        ("Owner-Address", &metadata.owner_address),
    ];
    for (name, value) in optional {
        if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
            tags.push(Tag::new(name, value.clone()));
        }
    }

    tags
}

fn build_nft_metadata(
    property: &RegistryPropertyData,
    documents: &[BundledUpload],
) -> PropertyNftMetadata {
    let attribute = |trait_type: &str, value: serde_json::Value, numeric: bool| MetadataAttribute {
        trait_type: trait_type.to_string(),
        value,
        display_type: numeric.then(|| "number".to_string()),
    };

    PropertyNftMetadata {
        name: format!("Property {}", property.registry_number),
        description: format!(
            "Guatemala Property Token for {}, Zone {}",
            property.municipality, property.zone
        ),
        image: documents
            .iter()
            .find(|doc| doc.document_type == "property-image")
            .map(|doc| doc.result.gateway_url.clone())
            .unwrap_or_default(),
        external_url: format!("https://propius.gt/property/{}", property.registry_number),
        attributes: vec![
            attribute("Registry Number", property.registry_number.clone().into(), false),
            attribute("Municipality", property.municipality.clone().into(), false),
            attribute("Zone", property.zone.clone().into(), false),
            attribute("Area (m²)", property.area_sq_meters.into(), true),
            attribute("Construction (m²)", property.construction_sq_meters.into(), true),
            attribute("Property Type", property_type_name(property.property_type).into(), false),
            attribute("Valuation (USD)", property.valuation_usd.into(), true),
            attribute("Country", COUNTRY.into(), false),
        ],
        documents: documents
            .iter()
            .map(|doc| MetadataDocument {
                document_type: doc.document_type.clone(),
                filename: doc.filename.clone(),
                url: doc.result.gateway_url.clone(),
                hash: doc.result.document_hash.clone(),
                size: doc.result.size,
            })
            .collect(),
        verification: MetadataVerification {
            verified: true,
            verified_at: iso_now(),
            platform: PLATFORM.to_string(),
        },
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tiff" => "image/tiff",
        // Documents
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Names for the on-chain property type codes.
pub fn property_type_name(code: u32) -> &'static str {
    match code {
        0 => "Residential",
        1 => "Commercial",
        2 => "Industrial",
        3 => "Agricultural",
        4 => "Mixed",
        _ => "Unknown",
    }
}

fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
