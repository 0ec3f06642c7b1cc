//! HTTP client for the JSON document store API.
//!
//! Speaks the document-store wire protocol served by `simpletask-server`:
//! collections live under `/v1/{collection}`, documents under
//! `/v1/{collection}/{id}`. Inserts answer `201` with the assigned id,
//! reads answer `200` with JSON bodies, updates and deletes answer `204`,
//! and a missing document answers `404`.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use simpletask_core::task::{Document, Fields};
use url::Url;

use super::{RemoteStore, StoreError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct InsertResponse {
    id: String,
}

/// Remote store backed by the HTTP document API.
///
/// Collection names and document ids are spliced into request paths
/// verbatim, so they must be URL path safe. Transport failures map to
/// [`StoreError::Unreachable`], `404` to [`StoreError::NotFound`], and any
/// other unexpected status to [`StoreError::Rejected`].
#[derive(Debug)]
pub struct HttpStore {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpStore {
    /// Creates a store client for the API at `base` with the default
    /// request timeout.
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self::with_timeout(base, DEFAULT_TIMEOUT)
    }

    /// Creates a store client with an explicit per-request timeout.
    #[must_use]
    pub fn with_timeout(base: Url, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
            timeout,
        }
    }

    fn endpoint(&self, tail: &str) -> String {
        format!("{}/v1/{tail}", self.base.as_str().trim_end_matches('/'))
    }
}

impl RemoteStore for HttpStore {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let response = self
            .client
            .post(self.endpoint(collection))
            .timeout(self.timeout)
            .json(&fields)
            .send()
            .await
            .map_err(|err| StoreError::Unreachable(err.to_string()))?;
        match response.status() {
            StatusCode::CREATED => response
                .json::<InsertResponse>()
                .await
                .map(|body| body.id)
                .map_err(|err| StoreError::InvalidResponse(err.to_string())),
            status => Err(StoreError::Rejected {
                status: status.as_u16(),
            }),
        }
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let response = self
            .client
            .get(self.endpoint(collection))
            .timeout(self.timeout)
            .query(&[("field", field), ("value", value)])
            .send()
            .await
            .map_err(|err| StoreError::Unreachable(err.to_string()))?;
        match response.status() {
            StatusCode::OK => response
                .json::<Vec<Document>>()
                .await
                .map_err(|err| StoreError::InvalidResponse(err.to_string())),
            status => Err(StoreError::Rejected {
                status: status.as_u16(),
            }),
        }
    }

    async fn fetch_by_id(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        let response = self
            .client
            .get(self.endpoint(&format!("{collection}/{id}")))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| StoreError::Unreachable(err.to_string()))?;
        match response.status() {
            StatusCode::OK => response
                .json::<Document>()
                .await
                .map_err(|err| StoreError::InvalidResponse(err.to_string())),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            status => Err(StoreError::Rejected {
                status: status.as_u16(),
            }),
        }
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(self.endpoint(&format!("{collection}/{id}")))
            .timeout(self.timeout)
            .json(&fields)
            .send()
            .await
            .map_err(|err| StoreError::Unreachable(err.to_string()))?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            status => Err(StoreError::Rejected {
                status: status.as_u16(),
            }),
        }
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("{collection}/{id}")))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| StoreError::Unreachable(err.to_string()))?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            status => Err(StoreError::Rejected {
                status: status.as_u16(),
            }),
        }
    }
}
