use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingWithHotel, PaymentStatus};
use crate::services::auth;
use crate::state::AppState;

/// Accepts RFC 3339 timestamps or bare dates (midnight).
fn parse_stay_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Placeholder assignment; real room allocation happens at check-in.
fn generate_room_number() -> i64 {
    100 + (Uuid::new_v4().as_u128() % 900) as i64
}

// POST /api/bookings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub hotel_id: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let identity = auth::authenticate(&state, &headers).await?;

    let (Some(hotel_id), Some(check_in_date), Some(check_out_date)) =
        (body.hotel_id, body.check_in_date, body.check_out_date)
    else {
        return Err(AppError::Validation(
            "Hotel ID, check-in, and check-out dates are required.".to_string(),
        ));
    };

    let check_in = parse_stay_date(&check_in_date);
    let check_out = parse_stay_date(&check_out_date);
    let (check_in, check_out) = match (check_in, check_out) {
        (Some(ci), Some(co)) if ci < co => (ci, co),
        _ => {
            return Err(AppError::Validation(
                "Invalid dates. Check-out must be after check-in.".to_string(),
            ))
        }
    };

    let hotel = {
        let db = state.db.lock().unwrap();
        queries::get_hotel_by_id(&db, &hotel_id)?
    };
    if hotel.is_none() {
        return Err(AppError::NotFound("Hotel not found.".to_string()));
    }

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        user_id: identity.user_id,
        hotel_id,
        check_in,
        check_out,
        room_number: generate_room_number(),
        payment_status: PaymentStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_booking(&db, &booking)?;
    }

    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/me
pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingWithHotel>>, AppError> {
    let identity = auth::authenticate(&state, &headers).await?;

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_user_bookings(&db, &identity.user_id)?
    };

    Ok(Json(bookings))
}
