//! HTTP entity backend.
//!
//! Speaks a plain REST convention over the same [`EntityBackend`] contract
//! the mock implements:
//!
//! ```text
//! GET    {base}/{kind}            list, filter as query string
//! GET    {base}/{kind}/{id}       get
//! POST   {base}/{kind}            create
//! PUT    {base}/{kind}/{id}       update
//! DELETE {base}/{kind}/{id}       delete
//! ```
//!
//! Status mapping: 404 → `NotFound`, 400/422 → `Validation`, anything else
//! non-success → `Backend`; connection/timeout failures → `Transport`.

use crate::backend::EntityBackend;
use async_trait::async_trait;
use lattice_commons::{Entity, ListFilter, Page, RecordId, StoreError, StoreResult};
use lattice_configs::StoreSettings;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use std::marker::PhantomData;
use std::time::Duration;

/// REST-backed entity store.
pub struct HttpBackend<E> {
    client: reqwest::Client,
    base_url: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> HttpBackend<E> {
    /// Builds a client from store settings (base URL, request timeout,
    /// optional bearer token).
    pub fn new(settings: &StoreSettings) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = settings.auth_token.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| StoreError::internal(format!("invalid auth token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            _entity: PhantomData,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, E::KIND)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!("{}/{}/{}", self.base_url, E::KIND, id)
    }

    /// Maps a non-success response into the error taxonomy, consuming the
    /// body as the message where the server provided one.
    async fn error_for(response: Response, id: Option<&RecordId>) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            body
        };

        match status {
            StatusCode::NOT_FOUND => StoreError::not_found(
                E::KIND,
                id.map(RecordId::as_str).unwrap_or("<unknown>"),
            ),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::validation(message)
            }
            _ => StoreError::backend(format!("{}: {}", status, message)),
        }
    }

    fn transport(err: reqwest::Error) -> StoreError {
        StoreError::transport(err.to_string())
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> StoreResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::serialization(e.to_string()))
    }
}

#[async_trait]
impl<E: Entity> EntityBackend<E> for HttpBackend<E> {
    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<E>> {
        let url = self.collection_url();
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .query(&filter.to_query())
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, None).await);
        }
        Self::decode(response).await
    }

    async fn get(&self, id: &RecordId) -> StoreResult<E> {
        let url = self.record_url(id);
        debug!("GET {url}");
        let response = self.client.get(&url).send().await.map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, Some(id)).await);
        }
        Self::decode(response).await
    }

    async fn create(&self, draft: E::Draft) -> StoreResult<E> {
        E::validate_draft(&draft)?;
        let url = self.collection_url();
        debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .json(&draft)
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, None).await);
        }
        Self::decode(response).await
    }

    async fn update(&self, id: &RecordId, patch: E::Patch) -> StoreResult<E> {
        E::validate_patch(&patch)?;
        let url = self.record_url(id);
        debug!("PUT {url}");
        let response = self
            .client
            .put(&url)
            .json(&patch)
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, Some(id)).await);
        }
        Self::decode(response).await
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<()> {
        let url = self.record_url(id);
        debug!("DELETE {url}");
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, Some(id)).await);
        }
        Ok(())
    }
}
