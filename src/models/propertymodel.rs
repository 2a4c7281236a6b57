use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "property_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Residential,
    Commercial,
    Agricultural,
    Luxury,
    Colonial,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "property_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    New,
    Active,
    Funded,
    WholeNft,     // Sold as a single NFT, never fractionalized
    ComingSoon,
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RESIDENTIAL" => Ok(PropertyType::Residential),
            "COMMERCIAL" => Ok(PropertyType::Commercial),
            "AGRICULTURAL" => Ok(PropertyType::Agricultural),
            "LUXURY" => Ok(PropertyType::Luxury),
            "COLONIAL" => Ok(PropertyType::Colonial),
            other => Err(format!("Invalid property type: {}", other)),
        }
    }
}

impl FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NEW" => Ok(PropertyStatus::New),
            "ACTIVE" => Ok(PropertyStatus::Active),
            "FUNDED" => Ok(PropertyStatus::Funded),
            "WHOLE_NFT" => Ok(PropertyStatus::WholeNft),
            "COMING_SOON" => Ok(PropertyStatus::ComingSoon),
            other => Err(format!("Invalid property status: {}", other)),
        }
    }
}

/// Permanent storage links for the legal paperwork behind a listing.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDocuments {
    pub property_title: String,
    pub rgp_certification: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub location: String,

    // Pricing, whole USD
    pub total_value: i64,
    pub share_price: Option<i64>,
    pub min_investment: i64,
    pub est_return: f64,

    // Fractional share accounting; all None for whole-NFT listings
    pub shares_sold: Option<i64>,
    pub total_shares: Option<i64>,

    pub status: PropertyStatus,
    pub funding_progress: f64,
    pub image: String,
    pub description: String,
    pub documents: Json<PropertyDocuments>,
    pub verified: bool,
    pub launch_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ShareAccountingError {
    #[error("Property {0} must define share price, shares sold and total shares together")]
    IncompleteShares(String),

    #[error("Whole-NFT property {0} cannot carry share data")]
    UnexpectedShares(String),

    #[error("Property {0} must have a positive share supply")]
    EmptySupply(String),

    #[error("Property {id} has sold {sold} of {total} shares")]
    Oversold { id: String, sold: i64, total: i64 },
}

impl Property {
    pub fn is_fractional(&self) -> bool {
        self.total_shares.is_some()
    }

    /// Checks the share invariants and returns the funding percentage they
    /// imply, rounded to two decimals.
    pub fn check_share_accounting(&self) -> Result<f64, ShareAccountingError> {
        match (self.share_price, self.shares_sold, self.total_shares) {
            (None, None, None) => {
                if self.status != PropertyStatus::WholeNft {
                    return Err(ShareAccountingError::IncompleteShares(self.id.clone()));
                }
                Ok(0.0)
            }
            (Some(_), Some(sold), Some(total)) => {
                if self.status == PropertyStatus::WholeNft {
                    return Err(ShareAccountingError::UnexpectedShares(self.id.clone()));
                }
                if total <= 0 {
                    return Err(ShareAccountingError::EmptySupply(self.id.clone()));
                }
                if sold < 0 || sold > total {
                    return Err(ShareAccountingError::Oversold {
                        id: self.id.clone(),
                        sold,
                        total,
                    });
                }
                let progress = sold as f64 / total as f64 * 100.0;
                Ok((progress * 100.0).round() / 100.0)
            }
            _ => Err(ShareAccountingError::IncompleteShares(self.id.clone())),
        }
    }

    /// Validates the record and overwrites `funding_progress` with the value
    /// derived from the share counts.
    pub fn with_derived_funding(mut self) -> Result<Self, ShareAccountingError> {
        self.funding_progress = self.check_share_accounting()?;
        Ok(self)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_properties: i64,
    pub total_value: i64,
    pub funded_properties: i64,
    pub average_return: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fractional(sold: i64, total: i64) -> Property {
        let now = Utc::now();
        Property {
            id: "prop-test".to_string(),
            title: "TEST HOME".to_string(),
            property_type: PropertyType::Residential,
            location: "Zone 15, Guatemala City".to_string(),
            total_value: 75000,
            share_price: Some(250),
            min_investment: 1000,
            est_return: 8.5,
            shares_sold: Some(sold),
            total_shares: Some(total),
            status: PropertyStatus::Active,
            funding_progress: 0.0,
            image: "R".to_string(),
            description: "Test listing".to_string(),
            documents: Json(PropertyDocuments::default()),
            verified: true,
            launch_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_funding_progress_derives_from_shares() {
        let property = fractional(225, 300).with_derived_funding().unwrap();
        assert_eq!(property.funding_progress, 75.0);

        let property = fractional(1, 3).with_derived_funding().unwrap();
        assert_eq!(property.funding_progress, 33.33);
    }

    #[test]
    fn test_oversold_property_is_rejected() {
        let err = fractional(301, 300).check_share_accounting().unwrap_err();
        assert_eq!(
            err,
            ShareAccountingError::Oversold { id: "prop-test".to_string(), sold: 301, total: 300 }
        );
    }

    #[test]
    fn test_whole_nft_cannot_carry_shares() {
        let mut property = fractional(0, 300);
        property.status = PropertyStatus::WholeNft;
        assert!(matches!(
            property.check_share_accounting(),
            Err(ShareAccountingError::UnexpectedShares(_))
        ));

        property.share_price = None;
        property.shares_sold = None;
        property.total_shares = None;
        assert_eq!(property.check_share_accounting(), Ok(0.0));
    }

    #[test]
    fn test_partial_share_data_is_rejected() {
        let mut property = fractional(10, 100);
        property.share_price = None;
        assert!(matches!(
            property.check_share_accounting(),
            Err(ShareAccountingError::IncompleteShares(_))
        ));
    }

    #[test]
    fn test_parse_filters_case_insensitively() {
        assert_eq!("commercial".parse::<PropertyType>(), Ok(PropertyType::Commercial));
        assert_eq!("whole_nft".parse::<PropertyStatus>(), Ok(PropertyStatus::WholeNft));
        assert!("castle".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_property_serializes_camel_case() {
        let value = serde_json::to_value(fractional(225, 300)).unwrap();
        assert_eq!(value["type"], "RESIDENTIAL");
        assert_eq!(value["sharesSold"], 225);
        assert_eq!(value["status"], "ACTIVE");
        assert!(value["documents"]["propertyTitle"].is_string());
    }
}
