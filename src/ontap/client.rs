//! ONTAP Client
//!
//! The [`RestClient`] trait is the seam the resource adapters talk to. It
//! exposes the four call shapes the adapters need; [`OntapClient`] is the
//! reqwest-backed implementation used against a real cluster.

use super::auth::Credentials;
use super::http::{OntapHttpClient, RestError};
use super::query::Query;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Decoded body of a collection-style response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestResponse {
    pub num_records: usize,
    pub records: Vec<Value>,
}

impl RestResponse {
    /// Build from a response body; `None` when the body has no `records` member
    pub fn from_body(body: &Value) -> Option<Self> {
        let records = body.get("records").and_then(|v| v.as_array())?.clone();
        let num_records = body
            .get("num_records")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(records.len());
        Some(Self {
            num_records,
            records,
        })
    }
}

/// REST operations the resource adapters depend on
///
/// Each call is a single request/response round trip. Implementations do
/// not retry; errors are terminal for the caller.
#[async_trait]
pub trait RestClient: Send + Sync {
    fn new_query(&self) -> Query {
        Query::new()
    }

    /// GET a collection filtered down to at most one record
    ///
    /// More than one match is an error; no match is `None`. A body without
    /// a `records` member is a [`RestError::empty_response`].
    async fn get_nil_or_one_record(
        &self,
        api: &str,
        query: &Query,
    ) -> std::result::Result<(u16, Option<Value>), RestError>;

    /// GET every record of a collection, in server order
    ///
    /// `None` means the server sent no `records` member at all, which is
    /// different from an empty collection.
    async fn get_zero_or_more_records(
        &self,
        api: &str,
        query: &Query,
    ) -> std::result::Result<(u16, Option<Vec<Value>>), RestError>;

    /// POST a new object
    async fn call_create_method(
        &self,
        api: &str,
        query: &Query,
        body: &Value,
    ) -> std::result::Result<(u16, RestResponse), RestError>;

    /// DELETE the object addressed by `api`
    async fn call_delete_method(
        &self,
        api: &str,
        query: Option<&Query>,
    ) -> std::result::Result<(u16, RestResponse), RestError>;
}

/// Main ONTAP client
#[derive(Clone)]
pub struct OntapClient {
    pub credentials: Credentials,
    pub http: OntapHttpClient,
    base_url: Url,
}

impl OntapClient {
    /// Create a new client for the cluster at `host`
    ///
    /// `host` may be a bare address (`cluster1`, `10.0.0.1:443`), which is
    /// reached over HTTPS, or a full `http(s)://` URL.
    pub fn new(
        host: &str,
        credentials: Credentials,
        validate_certs: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Self::base_url_for(host)?;
        let http = OntapHttpClient::new(validate_certs, timeout)?;

        tracing::info!("ONTAP client for {} as {}", base_url, credentials.username);

        Ok(Self {
            credentials,
            http,
            base_url,
        })
    }

    fn base_url_for(host: &str) -> Result<Url> {
        let root = if host.starts_with("https://") || host.starts_with("http://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };
        Url::parse(&format!("{}/api/", root))
            .with_context(|| format!("Invalid cluster address: {}", host))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the full URL for an API path such as `network/ip/interfaces`
    pub fn api_url(&self, api: &str) -> std::result::Result<String, RestError> {
        self.base_url
            .join(api.trim_start_matches('/'))
            .map(String::from)
            .map_err(|e| RestError::new(0, format!("Invalid API path {}: {}", api, e)))
    }

    async fn get(&self, api: &str, query: &Query) -> std::result::Result<(u16, Value), RestError> {
        let url = self.api_url(api)?;
        self.http
            .send(Method::GET, &url, &self.credentials, Some(query), None)
            .await
    }
}

#[async_trait]
impl RestClient for OntapClient {
    async fn get_nil_or_one_record(
        &self,
        api: &str,
        query: &Query,
    ) -> std::result::Result<(u16, Option<Value>), RestError> {
        let (status, body) = self.get(api, query).await?;
        let Some(response) = RestResponse::from_body(&body) else {
            return Err(RestError::empty_response(status, api));
        };

        if response.records.len() > 1 {
            return Err(RestError::new(
                status,
                format!(
                    "received {} records for GET {}, expected at most one",
                    response.records.len(),
                    api
                ),
            ));
        }
        Ok((status, response.records.into_iter().next()))
    }

    async fn get_zero_or_more_records(
        &self,
        api: &str,
        query: &Query,
    ) -> std::result::Result<(u16, Option<Vec<Value>>), RestError> {
        let (status, body) = self.get(api, query).await?;
        Ok((status, RestResponse::from_body(&body).map(|r| r.records)))
    }

    async fn call_create_method(
        &self,
        api: &str,
        query: &Query,
        body: &Value,
    ) -> std::result::Result<(u16, RestResponse), RestError> {
        let url = self.api_url(api)?;
        let (status, response) = self
            .http
            .send(Method::POST, &url, &self.credentials, Some(query), Some(body))
            .await?;
        Ok((status, RestResponse::from_body(&response).unwrap_or_default()))
    }

    async fn call_delete_method(
        &self,
        api: &str,
        query: Option<&Query>,
    ) -> std::result::Result<(u16, RestResponse), RestError> {
        let url = self.api_url(api)?;
        let (status, response) = self
            .http
            .send(Method::DELETE, &url, &self.credentials, query, None)
            .await?;
        Ok((status, RestResponse::from_body(&response).unwrap_or_default()))
    }
}
