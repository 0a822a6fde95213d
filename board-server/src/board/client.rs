//! Operator website HTTP client.
//!
//! Fetches the public departure board page for a stop and hands back the
//! body as a byte stream, so extraction can start before the page has
//! finished downloading.

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, TryStreamExt};
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::domain::StopId;

use super::error::BoardError;
use super::source::{BoardSource, BoardStream};

/// Default base URL; the stop id is appended as the last path segment.
pub const DEFAULT_BASE_URL: &str = "https://nctx.co.uk/stops";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upstream error bodies are cut to this many characters.
const ERROR_BODY_LIMIT: usize = 500;

/// Configuration for the board client.
#[derive(Debug, Clone)]
pub struct BoardClientConfig {
    /// Base URL stop pages live under
    pub base_url: String,
    /// Request timeout in seconds, covering the whole body download
    pub timeout_secs: u64,
    /// User agent sent with each request
    pub user_agent: String,
}

impl BoardClientConfig {
    /// Create a config with production defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

impl Default for BoardClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for operator board pages.
#[derive(Debug, Clone)]
pub struct BoardClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BoardClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BoardClientConfig) -> Result<Self, BoardError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BoardError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(BoardError::InvalidUrl(config.base_url));
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// URL of the board page for a stop. The id is percent-encoded.
    pub fn stop_url(&self, stop: &StopId) -> Result<Url, BoardError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BoardError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(stop.as_str());
        Ok(url)
    }

    /// Request a stop's board page.
    ///
    /// Resolves once response headers arrive; the body follows on the
    /// returned stream.
    pub async fn fetch(&self, stop: &StopId) -> Result<BoardStream, BoardError> {
        let url = self.stop_url(stop)?;
        debug!(%url, "fetching board");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%stop, status = status.as_u16(), "board request failed");
            return Err(status_error(stop, status, &body));
        }

        Ok(response.bytes_stream().map_err(BoardError::from).boxed())
    }
}

/// Error for a non-success response to a board request.
fn status_error(stop: &StopId, status: StatusCode, body: &str) -> BoardError {
    match status {
        StatusCode::NOT_FOUND => BoardError::StopNotFound(stop.clone()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BoardError::Refused {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => BoardError::RateLimited,
        _ => BoardError::Upstream {
            status: status.as_u16(),
            message: body.chars().take(ERROR_BODY_LIMIT).collect(),
        },
    }
}

impl BoardSource for BoardClient {
    fn open<'a>(&'a self, stop: &'a StopId) -> BoxFuture<'a, Result<BoardStream, BoardError>> {
        self.fetch(stop).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str) -> StopId {
        StopId::parse(id).unwrap()
    }

    #[test]
    fn config_builder() {
        let config = BoardClientConfig::new()
            .with_base_url("http://localhost:8080/stops")
            .with_timeout(5)
            .with_user_agent("test-agent");

        assert_eq!(config.base_url, "http://localhost:8080/stops");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn config_defaults() {
        let config = BoardClientConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.user_agent.starts_with("board-server/"));
    }

    #[test]
    fn client_creation() {
        assert!(BoardClient::new(BoardClientConfig::new()).is_ok());
    }

    #[test]
    fn rejects_unusable_base_url() {
        let bad = BoardClient::new(BoardClientConfig::new().with_base_url("not a url"));
        assert!(matches!(bad, Err(BoardError::InvalidUrl(_))));

        let bad = BoardClient::new(BoardClientConfig::new().with_base_url("mailto:ops@example.com"));
        assert!(matches!(bad, Err(BoardError::InvalidUrl(_))));
    }

    #[test]
    fn stop_url_appends_segment() {
        let client = BoardClient::new(BoardClientConfig::new()).unwrap();
        assert_eq!(
            client.stop_url(&stop("3390FO07")).unwrap().as_str(),
            "https://nctx.co.uk/stops/3390FO07"
        );
    }

    #[test]
    fn stop_url_handles_trailing_slash() {
        let client =
            BoardClient::new(BoardClientConfig::new().with_base_url("http://localhost/stops/"))
                .unwrap();
        assert_eq!(
            client.stop_url(&stop("123")).unwrap().as_str(),
            "http://localhost/stops/123"
        );
    }

    #[test]
    fn stop_url_encodes_id() {
        let client = BoardClient::new(BoardClientConfig::new()).unwrap();
        let url = client.stop_url(&stop("a/b?c")).unwrap();
        assert_eq!(url.as_str(), "https://nctx.co.uk/stops/a%2Fb%3Fc");
    }

    #[test]
    fn status_errors() {
        let s = stop("123");

        assert!(matches!(
            status_error(&s, StatusCode::NOT_FOUND, ""),
            BoardError::StopNotFound(id) if id == s
        ));
        assert!(matches!(
            status_error(&s, StatusCode::UNAUTHORIZED, ""),
            BoardError::Refused { status: 401 }
        ));
        assert!(matches!(
            status_error(&s, StatusCode::FORBIDDEN, "go away"),
            BoardError::Refused { status: 403 }
        ));
        assert!(matches!(
            status_error(&s, StatusCode::TOO_MANY_REQUESTS, ""),
            BoardError::RateLimited
        ));
        assert!(matches!(
            status_error(&s, StatusCode::SERVICE_UNAVAILABLE, "down"),
            BoardError::Upstream { status: 503, message } if message == "down"
        ));
    }

    #[test]
    fn upstream_message_is_truncated() {
        let body = "x".repeat(ERROR_BODY_LIMIT * 2);
        let err = status_error(&stop("1"), StatusCode::BAD_GATEWAY, &body);
        assert!(matches!(err, BoardError::Upstream { message, .. } if message.len() == ERROR_BODY_LIMIT));
    }

    // Fetch tests against the live site would go here, marked #[ignore].
}
