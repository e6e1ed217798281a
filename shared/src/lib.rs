// lib.rs - Wildlife journal core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod create_form;
pub mod draft;
pub mod event;
pub mod gateway;
pub mod listing;
pub mod model;
pub mod record;
pub mod request;
pub mod selection;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{ConfigError, JournalConfig};
pub use event::{DraftEdit, DraftField, DraftTarget, Event};
pub use model::Model;
pub use record::{JournalDate, JournalEntry, JournalId, JournalRecord, SpeciesTally, ValidationError};
pub use view::ViewModel;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 100;
/// Upper bound enforced by the journal backend on `size`.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const NO_RESULTS_MESSAGE: &str = "No results found.";
pub const DISPLAY_DATE_FORMAT: &str = "%-d %b %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    NotFound,
    Validation,
    ServerError,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::ServerError => "SERVER_ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServerError, message)
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Whether trying the same request again may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Network | ErrorKind::ServerError)
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to reach the journal service. Please check your connection and try again."
                    .into()
            }
            ErrorKind::NotFound => {
                "This journal could not be found. It may have been deleted.".into()
            }
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::ServerError => {
                "The journal service ran into a problem. Please try again later.".into()
            }
        }
    }

    /// Maps a non-2xx status to an error, pulling the server's message out of
    /// `{"detail": ...}` or `{"message": ...}` bodies when present.
    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let kind = match status {
            404 => ErrorKind::NotFound,
            400 | 422 => ErrorKind::Validation,
            _ => ErrorKind::ServerError,
        };

        let message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .and_then(ApiErrorResponse::into_message)
            .unwrap_or_else(|| format!("HTTP error: {status}"));

        Self::new(kind, message).with_context("http_status", status.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    fn into_message(self) -> Option<String> {
        if let Some(message) = self.message.filter(|m| !m.is_empty()) {
            return Some(message);
        }
        match self.detail? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}
