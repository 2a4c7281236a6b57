use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::propertydb::PropertyExt,
    dtos::propertydtos::{DataResponseDto, ListResponseDto, PropertyQueryDto},
    error::{ErrorMessage, HttpError},
    AppState,
};

pub fn properties_handler() -> Router {
    Router::new()
        .route("/", get(get_properties))
        .route("/:property_id", get(get_property_by_id))
}

pub async fn get_properties(
    Extension(app_state): Extension<Arc<AppState>>,
    query: Result<Query<PropertyQueryDto>, QueryRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Query(query_params) = query.map_err(|e| HttpError::bad_request(e.body_text()))?;

    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let filters = query_params.filters().map_err(HttpError::bad_request)?;

    let properties = app_state
        .db_client
        .get_properties(&filters, query_params.limit() as i64)
        .await?;

    Ok(Json(ListResponseDto::new(properties)))
}

pub async fn get_property_by_id(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(property_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_by_id(&property_id)
        .await?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::PropertyNotFound.to_string()))?;

    Ok(Json(DataResponseDto::new(property)))
}

pub async fn get_stats(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state.db_client.get_catalog_stats().await?;
    Ok(Json(DataResponseDto::new(stats)))
}
