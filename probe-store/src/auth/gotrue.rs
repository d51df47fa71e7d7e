//! HTTP client for the GoTrue auth API (`/auth/v1`)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::{AuthBackend, AuthUser, Session, SignUpOutcome};
use crate::error::{Result, StoreError};
use crate::types::StoreConfig;

pub struct GoTrueAuth {
    config: StoreConfig,
    client: Client,
}

impl GoTrueAuth {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "apikey",
            header::HeaderValue::from_str(&config.anon_key)
                .map_err(|e| StoreError::InvalidResponse(format!("invalid anon key: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// 4xx means the service rejected the caller; anything else non-2xx is
    /// the service's own failure.
    async fn check(&self, endpoint: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(endpoint, status = status.as_u16(), body = %body, "Auth request failed");
        let message = StoreError::message_from_body(&body);
        if status.is_client_error() {
            Err(StoreError::Auth(message))
        } else {
            Err(StoreError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn parse<T: DeserializeOwned>(&self, endpoint: &str, response: reqwest::Response) -> Result<T> {
        let response = self.check(endpoint, response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AuthBackend for GoTrueAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.url("token?grant_type=password"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        self.parse("token", response).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let response = self
            .client
            .post(self.url("signup"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        self.parse("signup", response).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("logout"))
            .bearer_auth(access_token)
            .send()
            .await?;
        self.check("logout", response).await?;
        Ok(())
    }

    async fn recover_password(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        let mut url = self.url("recover");
        if let Some(target) = redirect_to {
            url.push_str("?redirect_to=");
            url.push_str(&urlencoding::encode(target));
        }
        let response = self
            .client
            .post(url)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        self.check("recover", response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser> {
        let response = self
            .client
            .get(self.url("user"))
            .bearer_auth(access_token)
            .send()
            .await?;
        self.parse("user", response).await
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<AuthUser> {
        let response = self
            .client
            .put(self.url("user"))
            .bearer_auth(access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await?;
        self.parse("user", response).await
    }
}
