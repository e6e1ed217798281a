use crux_http::{HttpError, Response};
use thiserror::Error;
use url::Url;

use crate::record::JournalId;
use crate::AppError;

pub const MAX_URL_LENGTH: usize = 2048;
pub const JOURNALS_PATH: &str = "journals";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Parses and checks an API base URL: http(s) only, with a host and no
/// embedded credentials.
pub fn validate_base_url(raw: &str) -> Result<Url, EndpointError> {
    let invalid = |reason: &str| EndpointError::InvalidUrl {
        url: truncate_url(raw),
        reason: reason.to_string(),
    };

    if raw.trim().is_empty() {
        return Err(invalid("URL cannot be empty"));
    }
    if raw.len() > MAX_URL_LENGTH {
        return Err(invalid("URL exceeds maximum length"));
    }

    let parsed = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    check_base_url(&parsed).map_err(invalid)?;
    Ok(parsed)
}

fn check_base_url(url: &Url) -> Result<(), &'static str> {
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err("only 'http' and 'https' are allowed");
    }
    if url.host_str().is_none() {
        return Err("URL must have a host");
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err("credentials in URL are not allowed");
    }
    Ok(())
}

fn truncate_url(url: &str) -> String {
    if url.len() <= 100 {
        url.to_string()
    } else {
        let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &url[..cut])
    }
}

/// URL builder for the journal REST routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base: Url,
}

impl ApiEndpoints {
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    #[must_use]
    pub fn journals(&self) -> Url {
        self.with_segments(&[JOURNALS_PATH])
    }

    #[must_use]
    pub fn journal(&self, id: &JournalId) -> Url {
        self.with_segments(&[JOURNALS_PATH, id.as_str()])
    }

    #[must_use]
    pub fn latest(&self, page: u32, size: u32) -> Url {
        let mut url = self.journals();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        url
    }

    #[must_use]
    pub fn search(&self, query: &str, page: u32, size: u32) -> Url {
        let mut url = self.journals();
        url.query_pairs_mut()
            .append_pair("search_text", query)
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        url
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

pub fn check_status(status: u16) -> Result<(), AppError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(AppError::from_http_status(status, None))
    }
}

/// Unwraps a typed `crux_http` response into its body or a journal failure.
pub fn decode<T>(result: crux_http::Result<Response<T>>) -> Result<T, AppError> {
    let mut response = result.map_err(|e| from_http_error(&e))?;
    let status: u16 = response.status().into();
    check_status(status)?;
    response.take_body().ok_or_else(|| {
        AppError::server("Empty response from the journal service")
            .with_context("http_status", status.to_string())
    })
}

/// Like [`decode`] for routes whose body carries nothing we keep.
pub fn decode_ack<T>(result: crux_http::Result<Response<T>>) -> Result<(), AppError> {
    let response = result.map_err(|e| from_http_error(&e))?;
    check_status(response.status().into())
}

#[must_use]
pub fn from_http_error(error: &HttpError) -> AppError {
    match error {
        HttpError::Http {
            code,
            message,
            body,
        } => AppError::from_http_status(u16::from(*code), body.as_deref())
            .with_internal(message.clone()),
        HttpError::Json(msg) => {
            AppError::server("Malformed response from the journal service").with_internal(msg.clone())
        }
        // Transport failures, timeouts included.
        other => AppError::network("Network error").with_internal(other.to_string()),
    }
}
