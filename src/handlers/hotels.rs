use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Hotel, RankedHotel};
use crate::services::auth;
use crate::state::AppState;

/// Vector search returns the handful of best matches, not a full listing.
const SEARCH_LIMIT: usize = 4;

// GET /api/hotels
#[derive(Deserialize)]
pub struct HotelsQuery {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
}

pub async fn get_all_hotels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HotelsQuery>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    // Non-numeric bounds are ignored, not rejected.
    let min_price = query.min_price.as_deref().and_then(|v| v.parse().ok());
    let max_price = query.max_price.as_deref().and_then(|v| v.parse().ok());

    let hotels = {
        let db = state.db.lock().unwrap();
        queries::list_hotels(&db, min_price, max_price, query.sort_by.as_deref())?
    };

    Ok(Json(hotels))
}

// GET /api/hotels/search
#[derive(Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

pub async fn search_hotels(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<RankedHotel>>, AppError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Search query is required.".to_string()))?;

    let query_embedding = state
        .embeddings
        .embed(query)
        .await
        .map_err(|e| AppError::Embedding(e.to_string()))?;

    let hotels = {
        let db = state.db.lock().unwrap();
        queries::search_hotels(&db, &query_embedding, SEARCH_LIMIT)?
    };

    Ok(Json(hotels))
}

// GET /api/hotels/:id
pub async fn get_hotel_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Hotel>, AppError> {
    let hotel = {
        let db = state.db.lock().unwrap();
        queries::get_hotel_by_id(&db, &id)?
    };

    hotel
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Hotel not found".to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelPayload {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
    pub stripe_price_id: Option<String>,
}

impl HotelPayload {
    fn validate(self) -> Result<ValidHotelPayload, AppError> {
        let name = self.name.filter(|s| !s.trim().is_empty());
        let location = self.location.filter(|s| !s.trim().is_empty());
        let description = self.description.filter(|s| !s.trim().is_empty());

        match (name, location, description, self.price) {
            (Some(name), Some(location), Some(description), Some(price)) if price > 0.0 => {
                Ok(ValidHotelPayload {
                    name,
                    location,
                    description,
                    image: self.image,
                    price,
                    rating: self.rating,
                    reviews: self.reviews.unwrap_or(0),
                    stripe_price_id: self.stripe_price_id,
                })
            }
            _ => Err(AppError::Validation(
                "Invalid hotel data: All required fields must be present.".to_string(),
            )),
        }
    }
}

struct ValidHotelPayload {
    name: String,
    location: String,
    description: String,
    image: Option<String>,
    price: f64,
    rating: Option<f64>,
    reviews: i64,
    stripe_price_id: Option<String>,
}

// POST /api/hotels
pub async fn create_hotel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<HotelPayload>,
) -> Result<(StatusCode, Json<Hotel>), AppError> {
    let identity = auth::authenticate(&state, &headers).await?;
    auth::require_admin(&identity)?;

    let payload = payload.validate()?;
    let now = Utc::now().naive_utc();

    let mut hotel = Hotel {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        location: payload.location,
        description: payload.description,
        image: payload.image,
        price: payload.price,
        rating: payload.rating,
        reviews: payload.reviews,
        stripe_price_id: payload.stripe_price_id,
        embedding: None,
        created_at: now,
        updated_at: now,
    };

    // Indexed at creation time so the hotel is searchable immediately.
    let embedding = state
        .embeddings
        .embed(&hotel.embedding_text())
        .await
        .map_err(|e| AppError::Embedding(e.to_string()))?;
    hotel.embedding = Some(embedding);

    {
        let db = state.db.lock().unwrap();
        queries::create_hotel(&db, &hotel)?;
    }

    Ok((StatusCode::CREATED, Json(hotel)))
}

// PUT /api/hotels/:id
pub async fn update_hotel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<HotelPayload>,
) -> Result<Json<Hotel>, AppError> {
    let identity = auth::authenticate(&state, &headers).await?;
    auth::require_admin(&identity)?;

    let payload = payload.validate()?;

    let existing = {
        let db = state.db.lock().unwrap();
        queries::get_hotel_by_id(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound("Hotel not found".to_string()))?;

    let mut hotel = Hotel {
        id: existing.id,
        name: payload.name,
        location: payload.location,
        description: payload.description,
        image: payload.image,
        price: payload.price,
        rating: payload.rating,
        reviews: payload.reviews,
        stripe_price_id: payload.stripe_price_id,
        embedding: None,
        created_at: existing.created_at,
        updated_at: Utc::now().naive_utc(),
    };

    let embedding = state
        .embeddings
        .embed(&hotel.embedding_text())
        .await
        .map_err(|e| AppError::Embedding(e.to_string()))?;
    hotel.embedding = Some(embedding);

    let updated = {
        let db = state.db.lock().unwrap();
        queries::update_hotel(&db, &hotel)?
    };

    if updated {
        Ok(Json(hotel))
    } else {
        Err(AppError::NotFound("Hotel not found".to_string()))
    }
}

// PATCH /api/hotels/:id
#[derive(Deserialize)]
pub struct PatchHotelRequest {
    pub price: Option<f64>,
}

pub async fn patch_hotel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<PatchHotelRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = auth::authenticate(&state, &headers).await?;
    auth::require_admin(&identity)?;

    let price = body
        .price
        .ok_or_else(|| AppError::Validation("Price is required".to_string()))?;

    let updated = {
        let db = state.db.lock().unwrap();
        queries::update_hotel_price(&db, &id, price)?
    };

    if updated {
        Ok(Json(serde_json::json!({ "ok": true })))
    } else {
        Err(AppError::NotFound("Hotel not found".to_string()))
    }
}

// DELETE /api/hotels/:id
pub async fn delete_hotel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = auth::authenticate(&state, &headers).await?;
    auth::require_admin(&identity)?;

    let removed = {
        let db = state.db.lock().unwrap();
        queries::delete_hotel(&db, &id)?
    };

    if removed {
        Ok(Json(serde_json::json!({ "ok": true })))
    } else {
        Err(AppError::NotFound("Hotel not found".to_string()))
    }
}
