use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{Identity, IdentityProvider};

pub struct ClerkProvider {
    base_url: String,
    secret_key: String,
    client: reqwest::Client,
}

impl ClerkProvider {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            base_url,
            secret_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityProvider for ClerkProvider {
    async fn verify_token(&self, token: &str) -> anyhow::Result<Option<Identity>> {
        let resp = self
            .client
            .post(format!("{}/v1/tokens/verify", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&json!({ "token": token }))
            .send()
            .await
            .context("failed to call identity provider")?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse identity response")?;

        if !status.is_success() {
            anyhow::bail!("identity provider error ({}): {}", status, data);
        }

        let Some(user_id) = data["user_id"].as_str().or_else(|| data["sub"].as_str()) else {
            return Ok(None);
        };

        Ok(Some(Identity {
            user_id: user_id.to_string(),
            email: data["email"].as_str().map(str::to_string),
            role: data["metadata"]["role"].as_str().map(str::to_string),
        }))
    }
}
