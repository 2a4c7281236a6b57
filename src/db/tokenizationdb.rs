use async_trait::async_trait;

use crate::{
    db::db::{map_insert_error, DBClient, StoreError},
    models::tokenizationmodel::{TokenizationRequest, TokenizationUpdate},
};

const TOKENIZATION_COLUMNS: &str = r#"
    id, wallet_address, property_address, estimated_value, tokenization_type, status,
    documents_uploaded, notary_verified, contract_deployed, arweave_links,
    property_token_id, contract_address, created_at, updated_at
"#;

#[async_trait]
pub trait TokenizationExt {
    async fn create_tokenization(&self, request: &TokenizationRequest) -> Result<(), StoreError>;

    /// Newest first. `wallet_address` must already be normalized.
    async fn get_tokenizations_by_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<TokenizationRequest>, StoreError>;

    /// Loads, transitions and saves the request as one unit. Fails with
    /// `NotFound` or `Transition` without touching the stored row.
    async fn update_tokenization(
        &self,
        id: &str,
        update: TokenizationUpdate,
    ) -> Result<TokenizationRequest, StoreError>;
}

#[async_trait]
impl TokenizationExt for DBClient {
    async fn create_tokenization(&self, request: &TokenizationRequest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tokenizations (
                id, wallet_address, property_address, estimated_value, tokenization_type, status,
                documents_uploaded, notary_verified, contract_deployed, arweave_links,
                property_token_id, contract_address, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&request.id)
        .bind(&request.wallet_address)
        .bind(&request.property_address)
        .bind(request.estimated_value)
        .bind(request.tokenization_type)
        .bind(request.status)
        .bind(request.documents_uploaded)
        .bind(request.notary_verified)
        .bind(request.contract_deployed)
        .bind(&request.arweave_links)
        .bind(request.property_token_id)
        .bind(&request.contract_address)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &request.id))?;

        Ok(())
    }

    async fn get_tokenizations_by_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<TokenizationRequest>, StoreError> {
        let query = format!(
            "SELECT {} FROM tokenizations WHERE wallet_address = $1 ORDER BY created_at DESC",
            TOKENIZATION_COLUMNS
        );

        let requests = sqlx::query_as::<_, TokenizationRequest>(&query)
            .bind(wallet_address)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    async fn update_tokenization(
        &self,
        id: &str,
        update: TokenizationUpdate,
    ) -> Result<TokenizationRequest, StoreError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "SELECT {} FROM tokenizations WHERE id = $1 FOR UPDATE",
            TOKENIZATION_COLUMNS
        );
        let mut request = sqlx::query_as::<_, TokenizationRequest>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        request.apply(update)?;

        sqlx::query(
            r#"
            UPDATE tokenizations
            SET status = $2,
                documents_uploaded = $3,
                notary_verified = $4,
                contract_deployed = $5,
                arweave_links = $6,
                property_token_id = $7,
                contract_address = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(&request.id)
        .bind(request.status)
        .bind(request.documents_uploaded)
        .bind(request.notary_verified)
        .bind(request.contract_deployed)
        .bind(&request.arweave_links)
        .bind(request.property_token_id)
        .bind(&request.contract_address)
        .bind(request.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(request)
    }
}
