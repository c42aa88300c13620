// Congress REST client
//
// Wraps `reqwest::Client` with URL construction, JSON encoding and
// status-to-error mapping. The endpoint groups (applications, devices,
// gateways, outputs) are inherent methods implemented in separate files
// to keep this module focused on transport mechanics.

use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default address of the Congress backend.
pub const DEFAULT_ADDR: &str = "https://api.lora.telenor.io";

/// Everything needed to talk to one backend with one token.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://api.lora.telenor.io`.
    pub addr: Url,
    pub token: SecretString,
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Config for the default backend address.
    pub fn new(token: SecretString) -> Self {
        Self::with_addr(default_addr(), token)
    }

    pub fn with_addr(addr: Url, token: SecretString) -> Self {
        Self {
            addr,
            token,
            transport: TransportConfig::default(),
        }
    }
}

/// Parsed [`DEFAULT_ADDR`].
pub fn default_addr() -> Url {
    Url::parse(DEFAULT_ADDR).unwrap_or_else(|_| unreachable!("DEFAULT_ADDR is a valid URL"))
}

/// Async client for the Congress REST API.
///
/// Cheap to share: the inner `reqwest::Client` is pooled and thread-safe,
/// and nothing here is mutated after construction.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
    transport: TransportConfig,
}

impl Client {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client without touching the network.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = config.transport.build_client(&config.token)?;
        Ok(Self {
            http,
            base_url: config.addr,
            token: config.token,
            transport: config.transport,
        })
    }

    /// Build a client and verify the backend answers with [`ping`](Self::ping).
    pub async fn connect(config: ClientConfig) -> Result<Self, Error> {
        let client = Self::new(config)?;
        client.ping().await?;
        Ok(client)
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn token(&self) -> &SecretString {
        &self.token
    }

    pub(crate) fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Request the root resource. Any 2xx answer counts as alive.
    pub async fn ping(&self) -> Result<(), Error> {
        let url = self.url("/")?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_empty(resp).await
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an absolute API path (e.g. `/applications/abc`) onto the base URL.
    ///
    /// Any path prefix on the base URL is kept, so a backend mounted below
    /// `/api` works too.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        handle_empty(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(api_error(status, resp).await);
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(api_error(status, resp).await)
    }
}

/// Map a non-2xx response to [`Error::Api`], carrying the full body text.
async fn api_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let message = match resp.text().await {
        Ok(body) => body,
        Err(e) => e.to_string(),
    };
    Error::Api {
        status: status.as_u16(),
        message,
    }
}
