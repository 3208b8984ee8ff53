use std::collections::BTreeMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConduitError {
    #[error("Conduit API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConduitError>;

/// Form parameters for one Conduit call.
///
/// A `BTreeMap` keeps the encoded order stable, which makes request logs and
/// scripted tests deterministic. Constraint keys use Conduit's flattened
/// array syntax, e.g. `constraints[projects][0]`.
pub type ParamMap = BTreeMap<String, String>;

/// The Conduit response envelope. Every method wraps its payload the same
/// way; a non-empty `error_code` means the request failed application-side
/// even though the transport succeeded.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_info: Option<String>,
}

fn envelope_result(envelope: Envelope) -> Result<serde_json::Value> {
    match envelope.error_code.filter(|code| !code.is_empty()) {
        Some(code) => Err(ConduitError::Api {
            code,
            info: envelope
                .error_info
                .unwrap_or_else(|| "Unknown error".to_string()),
        }),
        None => Ok(envelope.result),
    }
}

/// The single operation every Conduit method goes through.
///
/// A trait so pagination and the resolution/aggregation layers above can run
/// against scripted responses in tests instead of a live tracker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Conduit: Send + Sync {
    /// Execute one `{base}/api/{method}` POST and return the envelope's
    /// `result` payload.
    async fn call(&self, method: &str, params: &ParamMap) -> Result<serde_json::Value>;
}

/// HTTP client for a Phabricator-compatible Conduit endpoint.
pub struct ConduitClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ConduitClient {
    /// `base_url` is the tracker root (e.g. `https://phab.example.com`);
    /// a trailing slash is trimmed. The token is sent as the `api.token`
    /// form field on every call.
    pub fn new(base_url: &str, token: &str) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("Taskscope/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// The tracker root this client talks to, without a trailing slash.
    /// Task URLs are built from it as `{base_url}/T{id}`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Conduit for ConduitClient {
    async fn call(&self, method: &str, params: &ParamMap) -> Result<serde_json::Value> {
        let url = format!("{}/api/{}", self.base_url, method);

        let mut form = params.clone();
        form.insert("api.token".to_string(), self.token.clone());

        debug!(method, "conduit call");

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        let envelope: Envelope = response.json().await?;
        envelope_result(envelope)
    }
}

/// One page of a Conduit `*.search` result.
///
/// The explicit default path on `data` keeps the derived impl from
/// requiring `T: Default`; the wire item types have no `Default` impl.
#[derive(Debug, Deserialize)]
struct SearchPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    cursor: Option<CursorInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct CursorInfo {
    #[serde(default)]
    after: Option<String>,
}

/// Cursor-paginated Conduit search.
///
/// Pulls pages on demand: each `next_page` call issues one request, using
/// the `after` cursor from the previous response, and the sequence ends the
/// first time the server returns no cursor (absent, null, or empty). The
/// sequence is finite and cannot be restarted; build a new `PagedQuery` to
/// fetch again. Items come back exactly as the server ordered them, with no
/// caching or dedup at this layer.
pub struct PagedQuery<'a, T> {
    conduit: &'a dyn Conduit,
    method: String,
    params: ParamMap,
    after: Option<String>,
    done: bool,
    _item: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> PagedQuery<'a, T> {
    pub fn new(conduit: &'a dyn Conduit, method: impl Into<String>, params: ParamMap) -> Self {
        Self {
            conduit,
            method: method.into(),
            params,
            after: None,
            done: false,
            _item: PhantomData,
        }
    }

    /// Fetch the next page of items, or `None` once the cursor is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.done {
            return Ok(None);
        }

        let mut params = self.params.clone();
        if let Some(after) = &self.after {
            params.insert("after".to_string(), after.clone());
        }

        let result = self.conduit.call(&self.method, &params).await?;
        let page: SearchPage<T> = serde_json::from_value(result)?;

        match page.cursor.and_then(|c| c.after).filter(|a| !a.is_empty()) {
            Some(after) => self.after = Some(after),
            None => self.done = true,
        }

        Ok(Some(page.data))
    }

    /// Drain every remaining page into one vector, preserving server order.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}
