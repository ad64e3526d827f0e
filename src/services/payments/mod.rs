pub mod stripe;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

/// Parameters for opening an embedded, one-time-payment checkout session.
#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub price_id: String,
    pub quantity: i64,
    pub return_url: String,
    /// Stored as session metadata; the only link back to the booking.
    pub booking_id: String,
    pub customer_email: Option<String>,
}

/// What the client-side checkout UI needs to mount the payment form.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSession {
    pub id: String,
    pub client_secret: Option<String>,
}

/// Provider-side view of a checkout session.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSession {
    pub id: String,
    pub payment_status: String,
    pub status: String,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_session(&self, params: CreateSessionParams) -> anyhow::Result<CreatedSession>;

    async fn retrieve_session(
        &self,
        session_id: &str,
        expand_line_items: bool,
    ) -> anyhow::Result<CheckoutSession>;
}

// ── Webhook payload ──

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookObject,
}

#[derive(Debug, Deserialize)]
pub struct WebhookObject {
    pub id: String,
}
