//! Client for the management API of a running `kvdns serve`.

use anyhow::{anyhow, bail, Context as _, Result};
use kvdns_core::{normalize_name, RecordType, RecordValue};
use kvdns_srv::api::{record_body, record_from_body};
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::debug;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reply envelope shared by every route.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Envelope {
    Success { data: Value },
    Error { reason: String },
}

/// Record operations against a server's `/api/records` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    base: Url,
}

impl ApiClient {
    /// Client for the server at `base`, e.g. `http://127.0.0.1:5380`.
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid server URL '{base}'"))?;
        if base.cannot_be_a_base() {
            bail!("invalid server URL '{base}'");
        }
        let http = HttpClient::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(format!("kvdns/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, base })
    }

    /// Fetch one record, `None` when the server has none.
    pub async fn get(&self, rtype: RecordType, name: &str) -> Result<Option<RecordValue>> {
        let url = self.record_url(Some(name), Some(&[rtype]))?;
        debug!(%url, "GET request");

        let response = self.http.get(url).send().await.context("request failed")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let data = Self::handle_response(response).await?;
        let body = data
            .get("data")
            .cloned()
            .ok_or_else(|| anyhow!("server reply has no record data"))?;
        Ok(Some(record_from_body(rtype, body)?))
    }

    /// Create or replace the record owned by `name`.
    pub async fn set(&self, name: &str, value: &RecordValue) -> Result<()> {
        let url = self.record_url(None, None)?;
        debug!(%url, "POST request");

        let mut body = record_body(value)?;
        if let Value::Object(fields) = &mut body {
            fields.insert("type".into(), json!(value.record_type()));
            fields.insert("name".into(), json!(normalize_name(name)));
        }
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .context("request failed")?;
        Self::handle_response(response).await.map(drop)
    }

    /// Remove a record. Returns whether one existed.
    pub async fn delete(&self, rtype: RecordType, name: &str) -> Result<bool> {
        let url = self.record_url(Some(name), Some(&[rtype]))?;
        debug!(%url, "DELETE request");

        let response = self.http.delete(url).send().await.context("request failed")?;
        let data = Self::handle_response(response).await?;
        Ok(data.get("deleted").and_then(Value::as_bool).unwrap_or(false))
    }

    /// Owner names per record type; every type when `types` is empty.
    pub async fn list(&self, types: &[RecordType]) -> Result<BTreeMap<RecordType, BTreeSet<String>>> {
        let filter = (!types.is_empty()).then_some(types);
        let url = self.record_url(None, filter)?;
        debug!(%url, "GET request");

        let response = self.http.get(url).send().await.context("request failed")?;
        let data = Self::handle_response(response).await?;
        serde_json::from_value(data).context("server returned a malformed listing")
    }

    /// `/api/records[/{name}][?type=..]` under the base URL.
    fn record_url(&self, name: Option<&str>, types: Option<&[RecordType]>) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| anyhow!("server URL {} cannot take a path", self.base))?;
            segments.pop_if_empty().extend(["api", "records"]);
            if let Some(name) = name {
                segments.push(&normalize_name(name));
            }
        }
        if let Some(types) = types {
            let list = types
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(",");
            url.query_pairs_mut().append_pair("type", &list);
        }
        Ok(url)
    }

    /// Unwrap the envelope, turning error replies into errors.
    async fn handle_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await.context("failed to read server reply")?;

        match serde_json::from_str::<Envelope>(&text) {
            Ok(Envelope::Success { data }) if status.is_success() => Ok(data),
            Ok(Envelope::Error { reason }) => bail!("server rejected request ({status}): {reason}"),
            _ => bail!("unexpected server reply ({status}): {text}"),
        }
    }
}
