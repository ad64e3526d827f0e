use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, Hotel, PaymentStatus};
use crate::services::auth;
use crate::services::checkout;
use crate::services::payments::CreateSessionParams;
use crate::state::AppState;

// POST /api/payments/create-checkout-session
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub booking_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutResponse {
    pub client_secret: Option<String>,
    pub session_id: String,
}

pub async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>, AppError> {
    let identity = auth::authenticate(&state, &headers).await?;

    let booking_id = body
        .booking_id
        .ok_or_else(|| AppError::Validation("Booking ID is required.".to_string()))?;

    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, &booking_id)?
    };
    // "Not yours" reads the same as "does not exist" on purpose.
    let booking = match booking {
        Some(b) if b.user_id == identity.user_id => b,
        _ => {
            return Err(AppError::NotFound(
                "Booking not found or access denied.".to_string(),
            ))
        }
    };

    if booking.payment_status != PaymentStatus::Pending {
        return Err(AppError::Validation(format!(
            "Payment already processed: {}.",
            booking.payment_status.as_str()
        )));
    }

    let hotel = {
        let db = state.db.lock().unwrap();
        queries::get_hotel_by_id(&db, &booking.hotel_id)?
    };
    let price_id = hotel
        .and_then(|h| h.stripe_price_id)
        .ok_or_else(|| {
            AppError::Validation("Stripe price ID is missing for this hotel.".to_string())
        })?;

    let nights = checkout::billed_nights(booking.check_in, booking.check_out);

    let session = state
        .payments
        .create_session(CreateSessionParams {
            price_id,
            quantity: nights,
            return_url: format!(
                "{}/booking/complete?session_id={{CHECKOUT_SESSION_ID}}",
                state.config.frontend_url
            ),
            booking_id: booking.id,
            customer_email: identity.email,
        })
        .await
        .map_err(|e| AppError::Payment(e.to_string()))?;

    Ok(Json(CreateCheckoutResponse {
        client_secret: session.client_secret,
        session_id: session.id,
    }))
}

// GET /api/payments/session-status
#[derive(Deserialize)]
pub struct SessionStatusQuery {
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct SessionStatusResponse {
    pub booking: Booking,
    pub hotel: Hotel,
    pub status: String,
    pub customer_email: String,
    #[serde(rename = "paymentStatus")]
    pub payment_status: PaymentStatus,
}

pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionStatusQuery>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let session_id = query
        .session_id
        .ok_or_else(|| AppError::Validation("Session ID is required.".to_string()))?;

    // Bring the booking up to date before reading it back.
    checkout::fulfill(&state, &session_id)
        .await
        .map_err(|e| AppError::Payment(e.to_string()))?;

    let session = state
        .payments
        .retrieve_session(&session_id, false)
        .await
        .map_err(|e| AppError::Payment(e.to_string()))?;

    let resolved = {
        let db = state.db.lock().unwrap();
        match session.metadata.get("bookingId") {
            Some(booking_id) => match queries::get_booking_by_id(&db, booking_id)? {
                Some(booking) => {
                    let hotel = queries::get_hotel_by_id(&db, &booking.hotel_id)?;
                    hotel.map(|h| (booking, h))
                }
                None => None,
            },
            None => None,
        }
    };

    let Some((booking, hotel)) = resolved else {
        return Err(AppError::NotFound(
            "Booking or associated hotel not found.".to_string(),
        ));
    };

    Ok(Json(SessionStatusResponse {
        payment_status: booking.payment_status,
        booking,
        hotel,
        status: session.status,
        customer_email: session.customer_email.unwrap_or_else(|| "N/A".to_string()),
    }))
}
