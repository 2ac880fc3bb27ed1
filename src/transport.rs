use std::future::Future;

use log::debug;
use reqwest::header::{CACHE_CONTROL, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::FetchError;

/// Everything the transport needs to issue one suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub no_cache: bool,
}

/// An abortable source of suggestion candidates.
///
/// The returned future is spawned onto its own task; dropping it (through
/// `JoinHandle::abort`) must abandon the request.
pub trait Transport: Send + Sync + 'static {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<Vec<String>, FetchError>> + Send;
}

/// Builds an opensearch request: `?action=opensearch&search=<q>&format=json&origin=*`.
pub fn opensearch_request(endpoint: &str, query: &str, no_cache: bool) -> Result<FetchRequest, FetchError> {
    let url = Url::parse_with_params(
        endpoint,
        &[
            ("action", "opensearch"),
            ("search", query),
            ("format", "json"),
            ("origin", "*"),
        ],
    )
    .map_err(|e| FetchError::Request(format!("bad endpoint {endpoint:?}: {e}")))?;

    Ok(FetchRequest {
        url: url.into(),
        no_cache,
    })
}

/// Pulls the candidate list out of an opensearch body.
///
/// Only element 1 is read; the rest of the array is ignored.
pub fn parse_opensearch(body: Value) -> Result<Vec<String>, FetchError> {
    let Value::Array(mut parts) = body else {
        return Err(FetchError::Malformed("expected a JSON array".into()));
    };
    if parts.len() < 2 {
        return Err(FetchError::Malformed(format!(
            "expected at least 2 elements, got {}",
            parts.len()
        )));
    }

    match parts.swap_remove(1) {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(FetchError::Malformed(format!(
                    "candidate is not a string: {other}"
                ))),
            })
            .collect(),
        other => Err(FetchError::Malformed(format!(
            "candidates are not a list: {other}"
        ))),
    }
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<Vec<String>, FetchError>> + Send {
        let client = self.client.clone();
        async move {
            let mut builder = client.get(&request.url);
            if request.no_cache {
                builder = builder.header(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            }

            debug!("GET {}", request.url);
            let response = builder.send().await?.error_for_status()?;
            let body: Value = response.json().await?;
            parse_opensearch(body)
        }
    }
}
