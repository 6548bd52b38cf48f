use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::OdeError;

pub trait CatalogClient: Send + Sync {
    /// Raw XML body of the catalog at `url`.
    fn fetch_catalog(&self, url: &str) -> Result<String, OdeError>;
}

#[derive(Clone)]
pub struct OdeHttpClient {
    client: Client,
}

impl OdeHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, OdeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("ode-catalog/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| OdeError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| OdeError::Http(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, OdeError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "ODE request failed".to_string());
        Err(OdeError::Status { status, message })
    }
}

impl CatalogClient for OdeHttpClient {
    fn fetch_catalog(&self, url: &str) -> Result<String, OdeError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| OdeError::Http(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| OdeError::Http(err.to_string()))
    }
}
