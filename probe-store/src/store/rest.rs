//! HTTP store speaking the PostgREST dialect

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::RemoteStore;
use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::types::{Collection, StoreConfig};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

/// REST client for `/rest/v1/{table}`.
///
/// # Example
///
/// ```rust,no_run
/// use probe_store::{Collection, Query, RemoteStore, RestStore, StoreConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = RestStore::new(StoreConfig {
///     base_url: "https://project.supabase.co".into(),
///     anon_key: "public-anon-key".into(),
///     ..Default::default()
/// })?;
///
/// let rows = store
///     .select(Collection::Roadmaps, &Query::new().eq("user_id", "u1"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct RestStore {
    config: StoreConfig,
    client: Client,
    access_token: RwLock<Option<String>>,
}

impl RestStore {
    /// Create a new store client
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

        Ok(Self {
            config,
            client,
            access_token: RwLock::new(None),
        })
    }

    fn url(&self, collection: Collection, params: &[(String, String)]) -> String {
        let mut url = format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            collection.as_str()
        );
        if !params.is_empty() {
            let pairs: Vec<String> = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        url
    }

    /// Attach the bearer: the user's access token, or the anon key.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .access_token
            .read()
            .ok()
            .and_then(|t| t.clone())
            .unwrap_or_else(|| self.config.anon_key.clone());
        request.bearer_auth(token)
    }

    // ==================== Helper Methods ====================

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        collection: Collection,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(collection.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // A single-object read answers 406 for both zero and several rows
            if status == StatusCode::NOT_ACCEPTABLE && is_empty_single(&body) {
                return Err(StoreError::NotFound(collection.to_string()));
            }
            debug!(collection = %collection, status = status.as_u16(), body = %body, "Store request failed");
            return Err(StoreError::Server {
                status: status.as_u16(),
                message: StoreError::message_from_body(&body),
            });
        }

        let body = response.json().await?;
        Ok(body)
    }
}

/// `PGRST116` with a zero row count in its details.
fn is_empty_single(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .map(|v| {
            v["code"] == "PGRST116"
                && v["details"]
                    .as_str()
                    .is_some_and(|d| d.contains("contains 0 rows"))
        })
        .unwrap_or(false)
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>> {
        let url = self.url(collection, &query.to_params());
        let response = self.authorize(self.client.get(&url)).send().await?;
        self.handle_response(collection, response).await
    }

    async fn select_single(&self, collection: Collection, query: &Query) -> Result<Value> {
        let url = self.url(collection, &query.to_params());
        let response = self
            .authorize(self.client.get(&url))
            .header(header::ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;
        self.handle_response(collection, response).await
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Vec<Value>> {
        let url = self.url(collection, &[]);
        let response = self
            .authorize(self.client.post(&url))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row)
            .send()
            .await?;
        self.handle_response(collection, response).await
    }

    async fn update(&self, collection: Collection, query: &Query, patch: Value) -> Result<Vec<Value>> {
        let url = self.url(collection, &query.filter_params());
        let response = self
            .authorize(self.client.patch(&url))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch)
            .send()
            .await?;
        self.handle_response(collection, response).await
    }

    fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.access_token.write() {
            *slot = token;
        }
    }
}
