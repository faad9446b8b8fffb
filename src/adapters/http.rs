use crate::domain::ports::{ByteFetcher, FetchedBytes};
use crate::utils::error::{MenuError, Result};
use reqwest::blocking::Client;
use reqwest::header::COOKIE;
use std::time::Duration;
use url::Url;

/// Fetches the menu page and sheets from the canteen website.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    cookie: Option<String>,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| MenuError::ConfigValidationError {
            field: "source.base_url".to_string(),
            message: format!("Invalid URL: {}", e),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MenuError::ConfigError {
                message: format!("Cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            cookie: None,
        })
    }

    /// The website only lists menus when a portal/language cookie is sent.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        self.cookie = if cookie.is_empty() { None } else { Some(cookie) };
        self
    }
}

impl ByteFetcher for HttpFetcher {
    fn resolve(&self, href: &str) -> Result<String> {
        self.base_url
            .join(href)
            .map(String::from)
            .map_err(|e| MenuError::FetchError {
                locator: href.to_string(),
                reason: format!("Invalid link: {}", e),
            })
    }

    fn fetch(&self, locator: &str) -> Result<FetchedBytes> {
        let to_fetch_error = |e: reqwest::Error| MenuError::FetchError {
            locator: locator.to_string(),
            reason: e.to_string(),
        };

        tracing::debug!("Making HTTP request to: {}", locator);
        let mut request = self.client.get(locator);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = request.send().map_err(to_fetch_error)?;

        tracing::debug!("HTTP response status: {}", response.status());
        if !response.status().is_success() {
            return Err(MenuError::FetchError {
                locator: locator.to_string(),
                reason: format!("unexpected status {}", response.status()),
            });
        }

        let declared_size = response.content_length();
        let bytes = response.bytes().map_err(to_fetch_error)?;
        Ok(FetchedBytes {
            declared_size,
            bytes: bytes.to_vec(),
        })
    }
}
