// db/seed.rs
use chrono::{Duration, NaiveDate, Utc};
use sqlx::types::Json;

use crate::{
    db::{propertydb::PropertyExt, Store},
    models::propertymodel::{
        Property, PropertyDocuments, PropertyStatus, PropertyType, ShareAccountingError,
    },
};

struct SeedListing {
    id: &'static str,
    title: &'static str,
    property_type: PropertyType,
    location: &'static str,
    total_value: i64,
    share_price: Option<i64>,
    min_investment: i64,
    est_return: f64,
    shares: Option<(i64, i64)>,
    status: PropertyStatus,
    image: &'static str,
    description: &'static str,
    documents: (&'static str, &'static str, &'static [&'static str]),
    verified: bool,
    launch_date: Option<(i32, u32, u32)>,
}

const LISTINGS: [SeedListing; 6] = [
    SeedListing {
        id: "prop-001",
        title: "FAMILY HOME, ZONE 15",
        property_type: PropertyType::Residential,
        location: "Zone 15, Guatemala City",
        total_value: 75000,
        share_price: Some(250),
        min_investment: 1000,
        est_return: 8.5,
        shares: Some((225, 300)),
        status: PropertyStatus::Active,
        image: "R",
        description: "Beautiful family home in prestigious Zone 15",
        documents: ("ar://abc123", "ar://def456", &["ar://photo1", "ar://photo2"]),
        verified: true,
        launch_date: None,
    },
    SeedListing {
        id: "prop-002",
        title: "OFFICE BUILDING, ZONE 10",
        property_type: PropertyType::Commercial,
        location: "Zone 10, Guatemala City",
        total_value: 2500000,
        share_price: Some(250),
        min_investment: 10000,
        est_return: 12.0,
        shares: Some((0, 10000)),
        status: PropertyStatus::New,
        image: "C",
        description: "Prime commercial space in financial district",
        documents: ("ar://xyz789", "ar://uvw012", &[]),
        verified: true,
        launch_date: None,
    },
    SeedListing {
        id: "prop-003",
        title: "AGRICULTURAL LAND, PETEN",
        property_type: PropertyType::Agricultural,
        location: "Peten, Guatemala",
        total_value: 125000,
        share_price: Some(250),
        min_investment: 500,
        est_return: 6.8,
        shares: Some((200, 500)),
        status: PropertyStatus::Active,
        image: "A",
        description: "Fertile agricultural land with high potential",
        documents: ("ar://agr123", "ar://agr456", &[]),
        verified: true,
        launch_date: None,
    },
    SeedListing {
        id: "prop-004",
        title: "LUXURY VILLA, ZONE 14",
        property_type: PropertyType::Luxury,
        location: "Zone 14, Guatemala City",
        total_value: 450000,
        share_price: None,
        min_investment: 450000,
        est_return: 5.2,
        shares: None,
        status: PropertyStatus::WholeNft,
        image: "L",
        description: "Exclusive luxury villa in prime location",
        documents: ("ar://lux123", "ar://lux456", &[]),
        verified: true,
        launch_date: None,
    },
    SeedListing {
        id: "prop-005",
        title: "RETAIL SPACE, ZONE 1",
        property_type: PropertyType::Commercial,
        location: "Zone 1, Guatemala City",
        total_value: 180000,
        share_price: Some(250),
        min_investment: 2500,
        est_return: 9.2,
        shares: Some((720, 720)),
        status: PropertyStatus::Funded,
        image: "S",
        description: "High-traffic retail space in historic center",
        documents: ("ar://ret123", "ar://ret456", &[]),
        verified: true,
        launch_date: None,
    },
    SeedListing {
        id: "prop-006",
        title: "COLONIAL HOUSE, ANTIGUA",
        property_type: PropertyType::Colonial,
        location: "Antigua Guatemala",
        total_value: 320000,
        share_price: Some(250),
        min_investment: 2000,
        est_return: 7.5,
        shares: Some((0, 1280)),
        status: PropertyStatus::ComingSoon,
        image: "H",
        description: "Historic colonial house in UNESCO World Heritage site",
        documents: ("ar://col123", "ar://col456", &[]),
        verified: false,
        launch_date: Some((2025, 3, 1)),
    },
];

/// The launch catalog. Listings are a second apart so the recency order is
/// stable, prop-001 first.
pub fn seed_properties() -> Result<Vec<Property>, ShareAccountingError> {
    let now = Utc::now();

    LISTINGS
        .iter()
        .enumerate()
        .map(|(index, listing)| {
            let stamp = now - Duration::seconds(index as i64);
            let (title_link, rgp_link, photos) = listing.documents;

            Property {
                id: listing.id.to_string(),
                title: listing.title.to_string(),
                property_type: listing.property_type,
                location: listing.location.to_string(),
                total_value: listing.total_value,
                share_price: listing.share_price,
                min_investment: listing.min_investment,
                est_return: listing.est_return,
                shares_sold: listing.shares.map(|(sold, _)| sold),
                total_shares: listing.shares.map(|(_, total)| total),
                status: listing.status,
                funding_progress: 0.0,
                image: listing.image.to_string(),
                description: listing.description.to_string(),
                documents: Json(PropertyDocuments {
                    property_title: title_link.to_string(),
                    rgp_certification: rgp_link.to_string(),
                    photos: photos.iter().map(|p| p.to_string()).collect(),
                }),
                verified: listing.verified,
                launch_date: listing
                    .launch_date
                    .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                created_at: stamp,
                updated_at: stamp,
            }
            .with_derived_funding()
        })
        .collect()
}

/// Inserts the launch catalog into an empty store. Returns how many
/// listings were written.
pub async fn seed_catalog(store: &dyn Store) -> anyhow::Result<usize> {
    let existing = store.count_properties().await?;
    if existing > 0 {
        tracing::debug!("Catalog already holds {} properties, skipping seed", existing);
        return Ok(0);
    }

    tracing::info!("Initializing property data...");
    let properties = seed_properties()?;
    let count = properties.len();
    store.insert_properties(properties).await?;
    tracing::info!("Property data initialized ({} listings)", count);

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memorydb::MemoryDB, propertydb::PropertySearchFilters};

    #[test]
    fn test_seed_listings_satisfy_share_accounting() {
        let properties = seed_properties().unwrap();
        assert_eq!(properties.len(), 6);

        let home = &properties[0];
        assert_eq!(home.funding_progress, 75.0);

        let villa = properties.iter().find(|p| p.id == "prop-004").unwrap();
        assert!(!villa.is_fractional());
        assert_eq!(villa.funding_progress, 0.0);

        let colonial = properties.iter().find(|p| p.id == "prop-006").unwrap();
        assert_eq!(colonial.funding_progress, 0.0);
        assert_eq!(colonial.launch_date, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[tokio::test]
    async fn test_seed_runs_once() {
        let store = MemoryDB::new();
        assert_eq!(seed_catalog(&store).await.unwrap(), 6);
        assert_eq!(seed_catalog(&store).await.unwrap(), 0);

        let listed = store
            .get_properties(&PropertySearchFilters::default(), 20)
            .await
            .unwrap();
        assert_eq!(listed.len(), 6);
        assert_eq!(listed[0].id, "prop-001");
    }
}
