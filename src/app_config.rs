use config::{Config, ConfigError};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    api: Api,
    endpoints: Endpoints,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::with_prefix("ENDPOINT_SYNC").prefix_separator("_").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppConfigError> {
        if self.endpoints.sync_interval.is_zero() {
            return Err(AppConfigError::ZeroSyncInterval);
        }
        Ok(())
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

#[derive(Debug, Deserialize)]
pub struct Api {
    url: String,
    token: Option<String>,
    #[serde(with = "humantime_serde")]
    timeout: Duration,
}

impl Api {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[derive(Debug, Deserialize)]
pub struct Endpoints {
    controller: String,
    #[serde(with = "humantime_serde")]
    sync_interval: Duration,
}

impl Endpoints {
    /// The name of the registered endpoints controller to run.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn sync_interval(&self) -> Duration {
        self.sync_interval
    }
}

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("endpoints.sync_interval must be greater than zero")]
    ZeroSyncInterval,
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                api: Api {
                    url: "http://localhost:8080".to_string(),
                    token: None,
                    timeout: Duration::from_secs(5),
                },
                endpoints: Endpoints {
                    controller: "log".to_string(),
                    sync_interval: Duration::from_secs(10),
                },
            },
        }
    }

    pub fn api_url(mut self, url: String) -> Self {
        self.config.api.url = url;
        self
    }

    pub fn api_token(mut self, token: &str) -> Self {
        self.config.api.token = Some(token.to_string());
        self
    }

    pub fn sync_interval(mut self, sync_interval: Duration) -> Self {
        self.config.endpoints.sync_interval = sync_interval;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
