use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    db::propertydb::PropertySearchFilters,
    models::propertymodel::{PropertyStatus, PropertyType},
};

pub const DEFAULT_PROPERTY_LIMIT: usize = 20;

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct PropertyQueryDto {
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<usize>,
}

impl PropertyQueryDto {
    /// Turns the raw query into store filters. `ALL` (any case) and empty
    /// values mean no filter.
    pub fn filters(&self) -> Result<PropertySearchFilters, String> {
        let property_type = match self.property_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(t) if t.eq_ignore_ascii_case("ALL") => None,
            Some(t) => Some(t.parse::<PropertyType>()?),
        };

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(s.parse::<PropertyStatus>()?),
        };

        Ok(PropertySearchFilters { property_type, status })
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PROPERTY_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponseDto<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> ListResponseDto<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponseDto<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponseDto<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponseDto {
    pub success: bool,
    pub message: String,
}
