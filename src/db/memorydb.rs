// db/memorydb.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    db::{
        db::StoreError,
        propertydb::{round_one_decimal, PropertyExt, PropertySearchFilters},
        tokenizationdb::TokenizationExt,
    },
    models::{
        propertymodel::{CatalogStats, Property, PropertyStatus},
        tokenizationmodel::{TokenizationRequest, TokenizationUpdate},
    },
};

/// Process-local store used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryDB {
    properties: RwLock<HashMap<String, Property>>,
    tokenizations: RwLock<HashMap<String, TokenizationRequest>>,
}

impl MemoryDB {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyExt for MemoryDB {
    async fn get_properties(
        &self,
        filters: &PropertySearchFilters,
        limit: i64,
    ) -> Result<Vec<Property>, StoreError> {
        let properties = self.properties.read().await;

        let mut matched: Vec<Property> = properties
            .values()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        matched.truncate(limit.max(0) as usize);

        Ok(matched)
    }

    async fn get_property_by_id(&self, property_id: &str) -> Result<Option<Property>, StoreError> {
        Ok(self.properties.read().await.get(property_id).cloned())
    }

    async fn get_catalog_stats(&self) -> Result<CatalogStats, StoreError> {
        let properties = self.properties.read().await;

        let total_properties = properties.len() as i64;
        let total_value = properties.values().map(|p| p.total_value).sum();
        let funded_properties = properties
            .values()
            .filter(|p| p.status == PropertyStatus::Funded)
            .count() as i64;
        let average_return = if properties.is_empty() {
            0.0
        } else {
            properties.values().map(|p| p.est_return).sum::<f64>() / properties.len() as f64
        };

        Ok(CatalogStats {
            total_properties,
            total_value,
            funded_properties,
            average_return: round_one_decimal(average_return),
        })
    }

    async fn count_properties(&self) -> Result<i64, StoreError> {
        Ok(self.properties.read().await.len() as i64)
    }

    async fn insert_properties(&self, new_properties: Vec<Property>) -> Result<(), StoreError> {
        let mut properties = self.properties.write().await;

        if let Some(existing) = new_properties.iter().find(|p| properties.contains_key(&p.id)) {
            return Err(StoreError::Duplicate(existing.id.clone()));
        }
        for property in new_properties {
            properties.insert(property.id.clone(), property);
        }

        Ok(())
    }
}

#[async_trait]
impl TokenizationExt for MemoryDB {
    async fn create_tokenization(&self, request: &TokenizationRequest) -> Result<(), StoreError> {
        let mut tokenizations = self.tokenizations.write().await;
        if tokenizations.contains_key(&request.id) {
            return Err(StoreError::Duplicate(request.id.clone()));
        }
        tokenizations.insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn get_tokenizations_by_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<TokenizationRequest>, StoreError> {
        let tokenizations = self.tokenizations.read().await;

        let mut requests: Vec<TokenizationRequest> = tokenizations
            .values()
            .filter(|r| r.wallet_address == wallet_address)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(requests)
    }

    async fn update_tokenization(
        &self,
        id: &str,
        update: TokenizationUpdate,
    ) -> Result<TokenizationRequest, StoreError> {
        let mut tokenizations = self.tokenizations.write().await;

        let stored = tokenizations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        stored.apply(update)?;
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::seed::seed_catalog,
        models::{
            propertymodel::PropertyType,
            tokenizationmodel::{TokenizationStatus, TokenizationType},
        },
    };

    fn request(id: &str) -> TokenizationRequest {
        TokenizationRequest::new(
            id.to_string(),
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string(),
            "Zona 14, Guatemala".to_string(),
            180_000.0,
            TokenizationType::Whole,
        )
    }

    #[tokio::test]
    async fn test_filters_and_limit() {
        let db = MemoryDB::new();
        seed_catalog(&db).await.unwrap();

        let filters = PropertySearchFilters {
            property_type: Some(PropertyType::Commercial),
            status: None,
        };
        let commercial = db.get_properties(&filters, 20).await.unwrap();
        assert_eq!(commercial.len(), 2);
        assert!(commercial.iter().all(|p| p.property_type == PropertyType::Commercial));

        let limited = db.get_properties(&PropertySearchFilters::default(), 2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert!(limited[0].updated_at >= limited[1].updated_at);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let db = MemoryDB::new();
        db.create_tokenization(&request("token-1")).await.unwrap();

        let err = db.create_tokenization(&request("token-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id == "token-1"));
    }

    #[tokio::test]
    async fn test_failed_transition_leaves_record_untouched() {
        let db = MemoryDB::new();
        db.create_tokenization(&request("token-1")).await.unwrap();

        let err = db
            .update_tokenization("token-1", TokenizationUpdate::NotaryVerified)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transition(_)));

        let stored = db
            .get_tokenizations_by_wallet("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
            .await
            .unwrap()
            .remove(0);
        assert_eq!(stored.status, TokenizationStatus::PendingDocuments);
        assert!(!stored.notary_verified);

        let missing = db
            .update_tokenization("token-404", TokenizationUpdate::NotaryVerified)
            .await
            .unwrap_err();
        assert!(matches!(missing, StoreError::NotFound(_)));
    }
}
