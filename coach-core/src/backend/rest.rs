//! REST Backend
//!
//! PostgREST-style row access over HTTP (`/rest/v1/<table>`).

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use super::query::Query;
use super::timeout::with_timeout;
use super::Backend;
use crate::config::BackendConfig;
use crate::domain::{DomainError, DomainResult};

/// HTTP client, configuration and current access token shared by the REST clients
#[derive(Clone)]
pub struct RestContext {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
    access_token: Arc<RwLock<Option<String>>>,
}

impl RestContext {
    pub fn new(config: BackendConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Use a signed-in user's token for subsequent requests (None = anon key)
    pub fn set_access_token(&self, token: Option<String>) {
        match self.access_token.write() {
            Ok(mut guard) => *guard = token,
            Err(e) => log::error!("[BACKEND] access token lock poisoned: {}", e),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().ok().and_then(|guard| guard.clone())
    }

    /// Request with api key and bearer headers set
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.access_token().unwrap_or_else(|| self.config.anon_key.clone());
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    /// One round trip, headers and body both under the configured timeout.
    /// Non-2xx statuses map to domain errors; the body text is returned otherwise.
    pub async fn send(&self, request: RequestBuilder) -> DomainResult<String> {
        with_timeout(self.config.request_timeout(), exchange(request)).await?
    }

    /// Send and decode a JSON body
    pub async fn send_json(&self, request: RequestBuilder) -> DomainResult<Value> {
        let text = self.send(request).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(DomainError::from)
    }
}

async fn exchange(request: RequestBuilder) -> DomainResult<String> {
    let response = request
        .send()
        .await
        .map_err(|e| DomainError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(match status.as_u16() {
            401 | 403 => DomainError::Unauthorized(message),
            404 => DomainError::NotFound(message),
            code => DomainError::Backend { status: code, message },
        });
    }
    response
        .text()
        .await
        .map_err(|e| DomainError::Network(e.to_string()))
}

/// Row tables over REST
#[derive(Clone)]
pub struct RestBackend {
    ctx: RestContext,
}

impl RestBackend {
    pub fn new(ctx: RestContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &RestContext {
        &self.ctx
    }

    fn table_url(&self, table: &str, query: &Query) -> String {
        let base = self.ctx.config().rest_url(table);
        let qs = query.to_query_string();
        if qs.is_empty() {
            base
        } else {
            format!("{}?{}", base, qs)
        }
    }
}

fn into_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Backend for RestBackend {
    async fn select(&self, table: &str, query: &Query) -> DomainResult<Vec<Value>> {
        let request = self.ctx.request(Method::GET, &self.table_url(table, query));
        let body = self.ctx.send_json(request).await?;
        log::debug!("[BACKEND] select {} ({})", table, query.to_query_string());
        Ok(into_rows(body))
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> DomainResult<Vec<Value>> {
        let count = rows.len();
        let request = self
            .ctx
            .request(Method::POST, &self.ctx.config().rest_url(table))
            .header("Prefer", "return=representation")
            .json(&Value::Array(rows));
        let body = self.ctx.send_json(request).await?;
        log::debug!("[BACKEND] insert {} x{}", table, count);
        Ok(into_rows(body))
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> DomainResult<Vec<Value>> {
        if query.filters.is_empty() {
            return Err(DomainError::InvalidInput(format!("refusing unfiltered update on {}", table)));
        }
        let request = self
            .ctx
            .request(Method::PATCH, &self.table_url(table, query))
            .header("Prefer", "return=representation")
            .json(&patch);
        let body = self.ctx.send_json(request).await?;
        Ok(into_rows(body))
    }

    async fn delete(&self, table: &str, query: &Query) -> DomainResult<()> {
        if query.filters.is_empty() {
            return Err(DomainError::InvalidInput(format!("refusing unfiltered delete on {}", table)));
        }
        let request = self.ctx.request(Method::DELETE, &self.table_url(table, query));
        self.ctx.send(request).await?;
        log::debug!("[BACKEND] delete {} ({})", table, query.to_query_string());
        Ok(())
    }
}
