// service/storage_backend.rs
use std::collections::HashMap;

use async_trait::async_trait;
use base64::{engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD}, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::{
    config::Config,
    models::documentmodel::Tag,
    service::error::ServiceError,
};

/// Pay-per-byte permanent storage. Amounts are in the funding token's
/// smallest unit (wei for the ethereum token).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn price(&self, bytes: u64) -> Result<u128, ServiceError>;

    async fn balance(&self) -> Result<u128, ServiceError>;

    /// Stores `data` with `tags` and returns the transaction id.
    async fn upload(&self, data: Vec<u8>, tags: &[Tag]) -> Result<String, ServiceError>;

    /// Tops up the upload account and returns the funding transaction id.
    async fn fund(&self, amount: u128) -> Result<String, ServiceError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: String,
}

#[derive(Debug, Serialize)]
struct RelayUploadRequest<'a> {
    data: String,
    tags: &'a [Tag],
}

#[derive(Debug, Deserialize)]
struct RelayReceipt {
    id: String,
}

#[derive(Debug, Serialize)]
struct RelayFundRequest<'a> {
    amount: String,
    token: &'a str,
}

/// Talks to an Irys node for pricing and balance. Data items must be signed
/// before the node accepts them, so uploads go through a signing relay.
pub struct IrysHttpBackend {
    client: reqwest::Client,
    node_url: String,
    token: String,
    wallet_address: Option<String>,
    relay_url: Option<String>,
}

impl IrysHttpBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            node_url: config.irys_node_url.trim_end_matches('/').to_string(),
            token: config.irys_token.clone(),
            wallet_address: config.irys_wallet_address.clone(),
            relay_url: config
                .irys_upload_relay_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    fn relay(&self) -> Result<&str, ServiceError> {
        self.relay_url.as_deref().ok_or_else(|| {
            ServiceError::StorageNotConfigured("IRYS_UPLOAD_RELAY_URL must be set".to_string())
        })
    }

    async fn post_to_relay<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<RelayReceipt, ServiceError> {
        let response = self
            .client
            .post(format!("{}/{}", self.relay()?, path))
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Gateway(format!(
                "Upload relay returned {}: {}",
                status, message
            )));
        }

        Ok(response.json().await?)
    }

    fn parse_amount(raw: &str) -> Result<u128, ServiceError> {
        raw.trim()
            .trim_matches('"')
            .parse::<u128>()
            .map_err(|_| ServiceError::Gateway(format!("Unexpected amount from node: {}", raw)))
    }
}

#[async_trait]
impl StorageBackend for IrysHttpBackend {
    async fn price(&self, bytes: u64) -> Result<u128, ServiceError> {
        let url = format!("{}/price/{}/{}", self.node_url, self.token, bytes);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ServiceError::Gateway(format!(
                "Price lookup failed with status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        Self::parse_amount(&body)
    }

    async fn balance(&self) -> Result<u128, ServiceError> {
        let address = self.wallet_address.as_ref().ok_or_else(|| {
            ServiceError::StorageNotConfigured("IRYS_WALLET_ADDRESS must be set".to_string())
        })?;

        let url = format!("{}/account/balance/{}", self.node_url, self.token);
        let response = self
            .client
            .get(&url)
            .query(&[("address", address)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Gateway(format!(
                "Balance lookup failed with status {}",
                response.status()
            )));
        }

        let body: BalanceResponse = response.json().await?;
        Self::parse_amount(&body.balance)
    }

    async fn upload(&self, data: Vec<u8>, tags: &[Tag]) -> Result<String, ServiceError> {
        let payload = RelayUploadRequest {
            data: STANDARD.encode(&data),
            tags,
        };

        let receipt = self.post_to_relay("upload", &payload).await?;
        Ok(receipt.id)
    }

    async fn fund(&self, amount: u128) -> Result<String, ServiceError> {
        let payload = RelayFundRequest {
            amount: amount.to_string(),
            token: &self.token,
        };

        let receipt = self.post_to_relay("fund", &payload).await?;
        Ok(receipt.id)
    }

    fn name(&self) -> &'static str {
        "irys"
    }
}

/// In-process storage with a fixed per-byte price. Used when no upload relay
/// is configured and by the tests.
pub struct MemoryBackend {
    price_per_byte: u128,
    balance: RwLock<u128>,
    items: RwLock<HashMap<String, (Vec<u8>, Vec<Tag>)>>,
}

impl MemoryBackend {
    pub fn new(balance: u128, price_per_byte: u128) -> Self {
        Self {
            price_per_byte,
            balance: RwLock::new(balance),
            items: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub async fn get(&self, id: &str) -> Option<(Vec<u8>, Vec<Tag>)> {
        self.items.read().await.get(id).cloned()
    }

    /// Transaction ids are the unpadded base64url SHA-256 of the payload and
    /// its tags, 43 characters like an Arweave id.
    fn transaction_id(data: &[u8], tags: &[Tag]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        for tag in tags {
            hasher.update(tag.name.as_bytes());
            hasher.update(tag.value.as_bytes());
        }
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn price(&self, bytes: u64) -> Result<u128, ServiceError> {
        Ok(bytes as u128 * self.price_per_byte)
    }

    async fn balance(&self) -> Result<u128, ServiceError> {
        Ok(*self.balance.read().await)
    }

    async fn upload(&self, data: Vec<u8>, tags: &[Tag]) -> Result<String, ServiceError> {
        let cost = self.price(data.len() as u64).await?;
        {
            let mut balance = self.balance.write().await;
            if *balance < cost {
                return Err(ServiceError::InsufficientBalance { need: cost, have: *balance });
            }
            *balance -= cost;
        }

        let id = Self::transaction_id(&data, tags);
        self.items.write().await.insert(id.clone(), (data, tags.to_vec()));
        Ok(id)
    }

    async fn fund(&self, amount: u128) -> Result<String, ServiceError> {
        let mut balance = self.balance.write().await;
        *balance = balance.saturating_add(amount);
        Ok(format!("fund-{}", uuid::Uuid::new_v4()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_charges_per_byte() {
        let backend = MemoryBackend::new(1_000, 2);
        assert_eq!(backend.price(100).await.unwrap(), 200);

        let id = backend.upload(vec![1u8; 100], &[Tag::new("Platform", "Propius")]).await.unwrap();
        assert_eq!(id.len(), 43);
        assert_eq!(backend.balance().await.unwrap(), 800);

        let (data, tags) = backend.get(&id).await.unwrap();
        assert_eq!(data.len(), 100);
        assert_eq!(tags[0].value, "Propius");
    }

    #[tokio::test]
    async fn test_memory_backend_refuses_underfunded_upload() {
        let backend = MemoryBackend::new(10, 1);
        let err = backend.upload(vec![0u8; 11], &[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientBalance { need: 11, have: 10 }));
        assert_eq!(backend.balance().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_memory_backend_funding_raises_balance() {
        let backend = MemoryBackend::new(10, 1);
        let tx = backend.fund(90).await.unwrap();
        assert!(tx.starts_with("fund-"));
        assert_eq!(backend.balance().await.unwrap(), 100);
    }

    #[test]
    fn test_parse_amount_accepts_quoted_numbers() {
        assert_eq!(IrysHttpBackend::parse_amount("\"12345\"\n").unwrap(), 12345);
        assert!(IrysHttpBackend::parse_amount("twelve").is_err());
    }
}
