use thiserror::Error;

use crate::netbox::Endpoint;

pub const URL_VARIABLE: &str = "NETBOX_URL";
pub const TOKEN_VARIABLE: &str = "NETBOX_API_TOKEN";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),
}

/// Where NetBox lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub netbox_url: String,
    pub api_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let netbox_url = required(URL_VARIABLE)?;
        let api_token = required(TOKEN_VARIABLE)?;

        Ok(Self {
            netbox_url: netbox_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.netbox_url, endpoint.path())
    }
}
