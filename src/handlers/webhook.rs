use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::services::checkout;
use crate::services::payments::stripe::verify_webhook_signature;
use crate::services::payments::WebhookEvent;
use crate::state::AppState;

/// Stripe webhook endpoint.
///
/// Takes the raw body: the signature is computed over the exact bytes Stripe
/// sent, so nothing may parse the body before verification. Once the
/// signature checks out this handler always acknowledges; a 5xx would only
/// make Stripe redeliver an event the reconciler already treats as a no-op.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match verify_webhook_signature(&state.config.stripe_webhook_secret, signature, &body) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("invalid webhook signature");
            return (StatusCode::BAD_REQUEST, "Webhook Error: invalid signature").into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "malformed webhook signature header");
            return (StatusCode::BAD_REQUEST, format!("Webhook Error: {e}")).into_response();
        }
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable webhook payload");
            return (StatusCode::BAD_REQUEST, format!("Webhook Error: {e}")).into_response();
        }
    };

    match event.event_type.as_str() {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            // Best effort: fulfillment is idempotent, so a retry from the
            // provider would change nothing.
            if let Err(e) = checkout::fulfill(&state, &event.data.object.id).await {
                tracing::error!(
                    error = %e,
                    session_id = %event.data.object.id,
                    "checkout fulfillment failed"
                );
            }
        }
        other => {
            tracing::debug!(event_type = %other, "ignoring webhook event");
        }
    }

    Json(serde_json::json!({ "received": true })).into_response()
}
