use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::TrackerError;

/// Authenticated JSON client shared by the tracker services.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    base_url: Url,
    client: Client,
    auth_header: String,
    verbose: bool,
}

impl HttpClient {
    /// `auth_header` is the complete `Authorization` value, e.g. `Basic dXNlcjpwdw==`.
    pub(crate) fn new(base_url: &str, auth_header: String) -> Result<Self, TrackerError> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| TrackerError::InvalidInput(format!("base url {base_url}: {e}")))?;

        let client = Client::builder()
            .user_agent("ticket-toolbox")
            .build()
            .map_err(|e| TrackerError::Request(format!("HTTP client init: {e}")))?;

        Ok(Self {
            base_url,
            client,
            auth_header,
            verbose: false,
        })
    }

    pub(crate) fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, TrackerError> {
        self.base_url
            .join(path)
            .map_err(|e| TrackerError::InvalidInput(format!("bad path {path}: {e}")))
    }

    fn echo(&self, method: &str, url: &Url) {
        debug!(%method, %url, "tracker request");
        if self.verbose {
            println!("> {method} {url}");
        }
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
    }

    /// GET without interpreting the status.
    pub(crate) async fn get(&self, url: Url) -> Result<Response, TrackerError> {
        self.echo("GET", &url);
        self.with_auth(self.client.get(url))
            .send()
            .await
            .map_err(|e| TrackerError::Request(e.to_string()))
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Response, TrackerError> {
        self.echo("POST", &url);
        self.with_auth(self.client.post(url).json(body))
            .send()
            .await
            .map_err(|e| TrackerError::Request(e.to_string()))
    }
}

/// Decode a success body or turn the response into `TrackerError::Transport`.
pub(crate) async fn handle_response<T: DeserializeOwned>(
    resp: Response,
    context: &str,
) -> Result<T, TrackerError> {
    if resp.status().is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| TrackerError::Decode(format!("{context}: {e}")))
    } else {
        Err(transport_error(resp, context).await)
    }
}

pub(crate) async fn transport_error(resp: Response, context: &str) -> TrackerError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    TrackerError::Transport {
        context: context.to_string(),
        status: status.as_u16(),
        body,
    }
}

pub(crate) fn is_not_found(resp: &Response) -> bool {
    resp.status() == StatusCode::NOT_FOUND
}
