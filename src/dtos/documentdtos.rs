use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::documentmodel::{BundledUpload, DocumentMetadata, RegistryPropertyData},
    service::uploader::BundleDocument,
};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentDto {
    #[validate(length(min = 1, max = 255, message = "Filename is required"))]
    pub filename: String,
    /// Base64 file contents.
    pub content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl UploadDocumentDto {
    pub fn decode(&self) -> Result<Vec<u8>, String> {
        decode_content(&self.filename, &self.content)
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BundleFileDto {
    #[validate(length(min = 1, max = 255, message = "Filename is required"))]
    pub filename: String,
    pub content: String,
    #[serde(rename = "type")]
    pub document_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UploadBundleDto {
    #[validate(length(min = 1, max = 20, message = "A bundle holds between 1 and 20 documents"))]
    #[validate]
    pub documents: Vec<BundleFileDto>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl UploadBundleDto {
    pub fn into_documents(self) -> Result<(Vec<BundleDocument>, DocumentMetadata), String> {
        let documents = self
            .documents
            .into_iter()
            .map(|doc| {
                Ok(BundleDocument {
                    data: decode_content(&doc.filename, &doc.content)?,
                    filename: doc.filename,
                    document_type: doc.document_type,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok((documents, self.metadata))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMetadataDto {
    pub property: RegistryPropertyData,
    #[serde(default)]
    pub documents: Vec<BundledUpload>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BalanceQueryDto {
    #[validate(range(min = 1, message = "Size must be at least one byte"))]
    pub size: Option<u64>,
}

/// Amounts above `u64::MAX` wei are common, so the amount travels as a
/// decimal string.
#[derive(Debug, Serialize, Deserialize)]
pub struct FundAccountDto {
    pub amount: String,
}

impl FundAccountDto {
    pub fn amount(&self) -> Result<u128, String> {
        self.amount
            .trim()
            .parse::<u128>()
            .ok()
            .filter(|amount| *amount > 0)
            .ok_or_else(|| "Amount must be a positive integer".to_string())
    }
}

fn decode_content(filename: &str, content: &str) -> Result<Vec<u8>, String> {
    STANDARD
        .decode(content.trim())
        .map_err(|e| format!("Invalid base64 content for {}: {}", filename, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_content() {
        let dto = UploadDocumentDto {
            filename: "deed.pdf".to_string(),
            content: STANDARD.encode(b"%PDF-1.4"),
            metadata: DocumentMetadata::default(),
        };
        assert_eq!(dto.decode().unwrap(), b"%PDF-1.4".to_vec());
    }

    #[test]
    fn test_bad_base64_names_the_file() {
        let dto = UploadBundleDto {
            documents: vec![BundleFileDto {
                filename: "photo.jpg".to_string(),
                content: "not base64!!".to_string(),
                document_type: None,
            }],
            metadata: DocumentMetadata::default(),
        };
        let err = dto.into_documents().unwrap_err();
        assert!(err.contains("photo.jpg"));
    }

    #[test]
    fn test_empty_bundle_fails_validation() {
        let dto = UploadBundleDto {
            documents: Vec::new(),
            metadata: DocumentMetadata::default(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_fund_amount_parsing() {
        let dto = FundAccountDto { amount: "1000000000000000000000".to_string() };
        assert_eq!(dto.amount().unwrap(), 1_000_000_000_000_000_000_000);
        assert!(FundAccountDto { amount: "0".to_string() }.amount().is_err());
        assert!(FundAccountDto { amount: "0.5".to_string() }.amount().is_err());
    }
}
