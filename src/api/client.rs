//! PagerDuty REST client
//!
//! Wraps [`HttpClient`] with the three response shapes the API uses:
//! offset-paginated lists, single enveloped objects, and plain lists.

use super::models::{ListEnvelope, Resource};
use crate::auth::Credential;
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::pagination::{ListRequest, Page};
use crate::types::{JsonObject, JsonValue};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Authenticated client for one connection
#[derive(Debug)]
pub struct PagerDutyClient {
    http: HttpClient,
}

impl PagerDutyClient {
    /// Wrap an existing transport
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Build a client from connection settings and a resolved credential
    pub fn from_config(config: &ConnectionConfig, credential: Credential) -> Result<Self> {
        let http =
            HttpClient::with_credential(HttpClientConfig::from_connection(config), credential)?;
        Ok(Self::new(http))
    }

    /// Underlying transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Base URL requests go to
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Fetch one page of an offset-paginated collection
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        request: &ListRequest,
    ) -> Result<Page<T>> {
        let config = RequestConfig::new().extend_query(request.to_query());
        let envelope: ListEnvelope = self.http.get_json(path, config).await?;

        let ListEnvelope {
            limit,
            offset,
            more,
            mut rest,
        } = envelope;
        let items = take_items(&mut rest, path, key)?;

        debug!(path, offset = request.offset, count = items.len(), "decoded page");

        Ok(Page {
            items,
            more: more.unwrap_or(false),
            offset: offset.unwrap_or(request.offset),
            limit: limit.unwrap_or(request.limit),
        })
    }

    /// Fetch a single object wrapped as `{"<key>": {...}}`
    pub async fn get_item<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<T> {
        self.get_item_with(path, key, RequestConfig::new()).await
    }

    /// Like [`get_item`](Self::get_item) with extra query parameters
    pub async fn get_item_with<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let mut body: JsonObject = self.http.get_json(path, config).await?;
        let value = body
            .remove(key)
            .ok_or_else(|| Error::decode(format!("GET {path}: response has no '{key}' field")))?;
        serde_json::from_value(value).map_err(|e| Error::decode(format!("GET {path}: {e}")))
    }

    /// Fetch a non-paginated list wrapped as `{"<key>": [...]}`
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        config: RequestConfig,
    ) -> Result<Vec<T>> {
        let mut body: JsonObject = self.http.get_json(path, config).await?;
        take_items(&mut body, path, key)
    }

    /// Fetch one resource by id
    pub async fn get_resource(&self, path: &str, key: &str) -> Result<Resource> {
        self.get_item(path, key).await
    }
}

/// Remove and decode the item array; an absent key means no items
fn take_items<T: DeserializeOwned>(body: &mut JsonObject, path: &str, key: &str) -> Result<Vec<T>> {
    match body.remove(key) {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(value) => {
            serde_json::from_value(value).map_err(|e| Error::decode(format!("GET {path}: {e}")))
        }
    }
}
