use crate::app_config::AppConfig;
use reqwest::header::HeaderValue;
use reqwest::{Client, header};
use thiserror::Error;

/// Handle to the backing service whose endpoints are synchronized.
/// Handed to endpoints controller factories as-is.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base url with exactly one `/` in between.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

pub fn new_client(config: &AppConfig) -> Result<ApiClient, ApiClientError> {
    let mut headers = header::HeaderMap::new();
    if let Some(token) = config.api().token() {
        let mut authorization_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        authorization_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization_value);
    }

    let http = Client::builder().timeout(config.api().timeout()).default_headers(headers).build()?;
    Ok(ApiClient {
        http,
        base_url: config.api().url().to_owned(),
    })
}

#[derive(Error, Debug)]
pub enum ApiClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("api client set an invalid header value: {0}")]
    InvalidHeaderValue(#[from] header::InvalidHeaderValue),
}
