use async_trait::async_trait;

use crate::{
    db::db::{map_insert_error, DBClient, StoreError},
    models::propertymodel::{CatalogStats, Property, PropertyStatus, PropertyType},
};

const PROPERTY_COLUMNS: &str = r#"
    id, title, property_type, location, total_value, share_price, min_investment,
    est_return, shares_sold, total_shares, status, funding_progress, image,
    description, documents, verified, launch_date, created_at, updated_at
"#;

#[derive(Debug, Default, Clone)]
pub struct PropertySearchFilters {
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
}

impl PropertySearchFilters {
    pub fn matches(&self, property: &Property) -> bool {
        self.property_type.map_or(true, |t| property.property_type == t)
            && self.status.map_or(true, |s| property.status == s)
    }
}

#[async_trait]
pub trait PropertyExt {
    /// Most recently updated first.
    async fn get_properties(
        &self,
        filters: &PropertySearchFilters,
        limit: i64,
    ) -> Result<Vec<Property>, StoreError>;

    async fn get_property_by_id(&self, property_id: &str) -> Result<Option<Property>, StoreError>;

    async fn get_catalog_stats(&self) -> Result<CatalogStats, StoreError>;

    async fn count_properties(&self) -> Result<i64, StoreError>;

    async fn insert_properties(&self, properties: Vec<Property>) -> Result<(), StoreError>;
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn get_properties(
        &self,
        filters: &PropertySearchFilters,
        limit: i64,
    ) -> Result<Vec<Property>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM properties
            WHERE ($1::property_type IS NULL OR property_type = $1)
              AND ($2::property_status IS NULL OR status = $2)
            ORDER BY updated_at DESC
            LIMIT $3
            "#,
            PROPERTY_COLUMNS
        );

        let properties = sqlx::query_as::<_, Property>(&query)
            .bind(filters.property_type)
            .bind(filters.status)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    async fn get_property_by_id(&self, property_id: &str) -> Result<Option<Property>, StoreError> {
        let query = format!("SELECT {} FROM properties WHERE id = $1", PROPERTY_COLUMNS);

        let property = sqlx::query_as::<_, Property>(&query)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    async fn get_catalog_stats(&self) -> Result<CatalogStats, StoreError> {
        let (total_properties, total_value, funded_properties, average_return) =
            sqlx::query_as::<_, (i64, i64, i64, f64)>(
                r#"
                SELECT
                    COUNT(*) AS total_properties,
                    COALESCE(SUM(total_value), 0)::BIGINT AS total_value,
                    COUNT(*) FILTER (WHERE status = 'FUNDED') AS funded_properties,
                    COALESCE(AVG(est_return), 0)::DOUBLE PRECISION AS average_return
                FROM properties
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(CatalogStats {
            total_properties,
            total_value,
            funded_properties,
            average_return: round_one_decimal(average_return),
        })
    }

    async fn count_properties(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_properties(&self, properties: Vec<Property>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for property in properties {
            sqlx::query(
                r#"
                INSERT INTO properties (
                    id, title, property_type, location, total_value, share_price, min_investment,
                    est_return, shares_sold, total_shares, status, funding_progress, image,
                    description, documents, verified, launch_date, created_at, updated_at
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19
                )
                "#,
            )
            .bind(&property.id)
            .bind(&property.title)
            .bind(property.property_type)
            .bind(&property.location)
            .bind(property.total_value)
            .bind(property.share_price)
            .bind(property.min_investment)
            .bind(property.est_return)
            .bind(property.shares_sold)
            .bind(property.total_shares)
            .bind(property.status)
            .bind(property.funding_progress)
            .bind(&property.image)
            .bind(&property.description)
            .bind(&property.documents)
            .bind(property.verified)
            .bind(property.launch_date)
            .bind(property.created_at)
            .bind(property.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_insert_error(e, &property.id))?;
        }

        tx.commit().await?;
        Ok(())
    }
}
