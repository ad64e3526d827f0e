use anyhow::Context;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{CheckoutSession, CreateSessionParams, CreatedSession, PaymentProvider};

const API_BASE: &str = "https://api.stripe.com/v1";

/// Webhook timestamps further than this from now are treated as replays.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

pub struct StripeGateway {
    secret_key: String,
    client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeGateway {
    async fn create_session(&self, params: CreateSessionParams) -> anyhow::Result<CreatedSession> {
        let mut form: Vec<(&str, String)> = vec![
            ("ui_mode", "embedded".to_string()),
            ("mode", "payment".to_string()),
            ("line_items[0][price]", params.price_id),
            ("line_items[0][quantity]", params.quantity.to_string()),
            ("return_url", params.return_url),
            ("metadata[bookingId]", params.booking_id),
        ];
        if let Some(email) = params.customer_email {
            form.push(("customer_email", email));
        }

        let resp = self
            .client
            .post(format!("{API_BASE}/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .context("failed to create checkout session")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse checkout session response")?;

        if !status.is_success() {
            anyhow::bail!("Stripe API error ({}): {}", status, data);
        }

        serde_json::from_value(data).context("unexpected checkout session shape")
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
        expand_line_items: bool,
    ) -> anyhow::Result<CheckoutSession> {
        let mut req = self
            .client
            .get(format!("{API_BASE}/checkout/sessions/{session_id}"))
            .bearer_auth(&self.secret_key);
        if expand_line_items {
            req = req.query(&[("expand[]", "line_items")]);
        }

        let resp = req.send().await.context("failed to retrieve checkout session")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse checkout session response")?;

        if !status.is_success() {
            anyhow::bail!("Stripe API error ({}): {}", status, data);
        }

        Ok(CheckoutSession {
            id: data["id"].as_str().unwrap_or_default().to_string(),
            payment_status: data["payment_status"].as_str().unwrap_or_default().to_string(),
            status: data["status"].as_str().unwrap_or_default().to_string(),
            customer_email: data["customer_details"]["email"].as_str().map(str::to_string),
            metadata: serde_json::from_value(data["metadata"].clone()).unwrap_or_default(),
        })
    }
}

/// Verify a `t=<unix>,v1=<hex>` signature header over the raw request body.
///
/// The signed payload is `"<timestamp>.<body>"` under HMAC-SHA256 with the
/// endpoint secret. A malformed header is an error; a wrong signature or a
/// stale timestamp is `Ok(false)`.
pub fn verify_webhook_signature(
    secret: &str,
    signature_header: &str,
    payload: &[u8],
) -> anyhow::Result<bool> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse()
                        .context("invalid timestamp in signature header")?,
                );
            }
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| anyhow::anyhow!("signature header missing timestamp"))?;
    if candidates.is_empty() {
        anyhow::bail!("signature header missing v1 signature");
    }

    let age = (chrono::Utc::now().timestamp() - timestamp).abs();
    if age > SIGNATURE_TOLERANCE_SECS {
        return Ok(false);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).context("invalid webhook secret")?;
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());

    Ok(candidates.iter().any(|candidate| *candidate == expected))
}
