//! HTTP transport
//!
//! Every network read in the crate goes through the [`Transport`] trait: API
//! calls as text, artifact downloads as a byte stream. [`HttpTransport`] is
//! the production implementation over a blocking `reqwest` client.

use crate::config::FetchConfig;
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during an HTTP exchange
#[derive(Debug, Error)]
pub enum HttpError {
    /// HTTP request failed (DNS, connect, timeout, reset)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} for URL: {url}")]
    Status { status: u16, url: String },

    /// IO error while reading a body
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// Whether the server answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, HttpError::Status { status: 404, .. })
    }
}

/// Readable download body
pub type Body = Box<dyn Read + Send>;

/// Blocking GET access to the network
pub trait Transport: Send + Sync {
    /// GET `url` and return the body as text
    fn get_text(&self, url: &str) -> Result<String, HttpError>;

    /// GET `url` and return the body as a stream
    fn open(&self, url: &str) -> Result<Body, HttpError>;
}

/// [`Transport`] backed by `reqwest`
pub struct HttpTransport {
    client: Client,
    download_timeout: Duration,
}

impl HttpTransport {
    /// Create a transport from the fetch settings
    pub fn new(config: &FetchConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            download_timeout: config.download_timeout(),
        })
    }

    fn send(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, HttpError> {
        validate_url(url)?;

        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json, */*");
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &str) -> Result<String, HttpError> {
        let response = self.send(url, None)?;
        Ok(response.text()?)
    }

    fn open(&self, url: &str) -> Result<Body, HttpError> {
        let response = self.send(url, Some(self.download_timeout))?;
        Ok(Box::new(response))
    }
}

fn validate_url(url: &str) -> Result<(), HttpError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(HttpError::InvalidUrl(url.to_string()));
    }
    Ok(())
}
