use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::capabilities::http::{validate_base_url, ApiEndpoints};
use crate::{DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("configuration is not valid JSON: {0}")]
    Parse(String),
    #[error("invalid api_base_url: {0}")]
    BaseUrl(String),
    #[error("{field} must be between 1 and {max}, got {value}")]
    PageSize {
        field: &'static str,
        value: u32,
        max: u32,
    },
}

/// Session configuration sent by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub api_base_url: String,
    pub page_size: u32,
    pub search_page_size: u32,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search_page_size: DEFAULT_SEARCH_PAGE_SIZE,
        }
    }
}

impl JournalConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        check_page_size("page_size", self.page_size)?;
        check_page_size("search_page_size", self.search_page_size)?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        validate_base_url(&self.api_base_url).map_err(|e| ConfigError::BaseUrl(e.to_string()))
    }

    pub fn endpoints(&self) -> Result<ApiEndpoints, ConfigError> {
        self.base_url().map(ApiEndpoints::new)
    }
}

fn check_page_size(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_PAGE_SIZE {
        return Err(ConfigError::PageSize {
            field,
            value,
            max: MAX_PAGE_SIZE,
        });
    }
    Ok(())
}
