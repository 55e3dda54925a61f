/*
[INPUT]:  HTTP configuration (base URL, backend flavor, timeouts)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use crate::http::{Result, TaskrError};
use crate::types::{ApiFlavor, Envelope};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default TaskR backend
pub const DEFAULT_BASE_URL: &str = "https://voxursa.com/TaskR/";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub flavor: ApiFlavor,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            flavor: ApiFlavor::default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the TaskR PHP backend
#[derive(Debug, Clone)]
pub struct TaskrClient {
    http_client: Client,
    base_url: Url,
    flavor: ApiFlavor,
}

impl TaskrClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: parse_base_url(&config.base_url)?,
            flavor: config.flavor,
        })
    }

    /// Backend flavor this client speaks
    pub fn flavor(&self) -> ApiFlavor {
        self.flavor
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for a script endpoint
    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Build request builder for a script endpoint
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    /// POST a form-encoded body
    pub(crate) async fn post_form<F>(&self, endpoint: &str, form: &F) -> Result<Response>
    where
        F: Serialize + ?Sized,
    {
        tracing::debug!(endpoint, flavor = ?self.flavor, "POST form");
        let response = self.request(Method::POST, endpoint)?.form(form).send().await?;
        Ok(response)
    }

    /// Send a request and decode its JSON body
    pub(crate) async fn send_json<T>(&self, builder: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        read_json(response).await
    }
}

/// Decode a JSON body after checking the status code
pub(crate) async fn read_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|err| {
        tracing::warn!(error = %err, body = %truncate(&body), "undecodable response body");
        TaskrError::InvalidResponse(format!("{err}"))
    })
}

/// Accept a mutation response: empty bodies count as success, JSON bodies
/// carrying `success: false` are rejections.
pub(crate) async fn expect_success(response: Response, fallback: &str) -> Result<()> {
    let body = read_body(response).await?;
    if body.trim().is_empty() {
        return Ok(());
    }

    let value: serde_json::Value = serde_json::from_str(&body).map_err(|err| {
        tracing::warn!(error = %err, body = %truncate(&body), "non-JSON mutation response");
        TaskrError::InvalidResponse(format!("{err}"))
    })?;

    if value.get("success").is_none() {
        return Ok(());
    }

    let envelope: Envelope = serde_json::from_value(value)?;
    if envelope.success {
        Ok(())
    } else {
        Err(TaskrError::rejected(envelope.message, fallback))
    }
}

async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), body = %truncate(&body), "request failed");
        return Err(TaskrError::api_error(status, truncate(&body)));
    }
    Ok(body)
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskrError::Config("base URL is empty".to_string()));
    }
    // Url::join replaces the last segment unless the base ends with '/'
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&normalized)?)
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
