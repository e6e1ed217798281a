//! Remote journal gateway: turns controller commands into `crux_http`
//! requests whose callbacks come back as completion events.

use crux_http::Http;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capabilities::http::{decode, decode_ack, ApiEndpoints};
use crate::config::{ConfigError, JournalConfig};
use crate::event::Event;
use crate::record::{JournalEntry, JournalId, JournalRecord};
use crate::request::Ticket;
use crate::AppError;

/// One page of records as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalPage {
    pub records: Vec<JournalRecord>,
    /// `None` when the backend answered with a bare array.
    pub total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageWire {
    Paged {
        journals: Vec<JournalRecord>,
        #[serde(default, rename = "totalCount", alias = "total_count")]
        total_count: Option<u64>,
    },
    Bare(Vec<JournalRecord>),
}

impl From<PageWire> for JournalPage {
    fn from(wire: PageWire) -> Self {
        match wire {
            PageWire::Paged {
                journals,
                total_count,
            } => Self {
                records: journals,
                total_count,
            },
            PageWire::Bare(records) => Self {
                records,
                total_count: None,
            },
        }
    }
}

/// A request a controller wants issued. Each carries the ticket its
/// completion will be matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayRequest {
    ListLatest {
        ticket: Ticket,
        page: u32,
        page_size: u32,
    },
    Search {
        ticket: Ticket,
        query: String,
        page: u32,
        page_size: u32,
    },
    Create {
        ticket: Ticket,
        entry: JournalEntry,
    },
    Update {
        ticket: Ticket,
        record: JournalRecord,
    },
    Delete {
        ticket: Ticket,
        id: JournalId,
    },
}

impl GatewayRequest {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::ListLatest { ticket, .. }
            | Self::Search { ticket, .. }
            | Self::Create { ticket, .. }
            | Self::Update { ticket, .. }
            | Self::Delete { ticket, .. } => *ticket,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListLatest { .. } => "list_latest",
            Self::Search { .. } => "search",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    /// The completion event this request produces when it fails before
    /// reaching the transport.
    #[must_use]
    pub fn fail(self, error: AppError) -> Event {
        match self {
            Self::ListLatest { ticket, page, .. } => Event::LatestLoaded {
                ticket,
                page,
                result: Box::new(Err(error)),
            },
            Self::Search { ticket, query, .. } => Event::SearchLoaded {
                ticket,
                query,
                result: Box::new(Err(error)),
            },
            Self::Create { ticket, .. } => Event::JournalCreated {
                ticket,
                result: Box::new(Err(error)),
            },
            Self::Update { ticket, record } => Event::JournalUpdated {
                ticket,
                id: record.id,
                result: Box::new(Err(error)),
            },
            Self::Delete { ticket, id } => Event::JournalDeleted {
                ticket,
                id,
                result: Box::new(Err(error)),
            },
        }
    }
}

pub struct JournalGateway<'a> {
    http: &'a Http<Event>,
    endpoints: Result<ApiEndpoints, ConfigError>,
}

impl<'a> JournalGateway<'a> {
    #[must_use]
    pub fn new(http: &'a Http<Event>, config: &JournalConfig) -> Self {
        Self {
            http,
            endpoints: config.endpoints(),
        }
    }

    /// Issues `request`. Returns the failure event instead when the request
    /// cannot be built.
    pub fn dispatch(&self, request: GatewayRequest) -> Option<Event> {
        let endpoints = match &self.endpoints {
            Ok(endpoints) => endpoints,
            Err(e) => {
                let error = AppError::network("The journal service address is not configured")
                    .with_internal(e.to_string());
                return Some(request.fail(error));
            }
        };

        debug!(request = request.name(), ticket = %request.ticket(), "dispatching");

        match request {
            GatewayRequest::ListLatest {
                ticket,
                page,
                page_size,
            } => {
                let url = endpoints.latest(page, page_size);
                self.http
                    .get(url.as_str())
                    .expect_json::<PageWire>()
                    .send(move |result| Event::LatestLoaded {
                        ticket,
                        page,
                        result: Box::new(decode(result).map(JournalPage::from)),
                    });
            }
            GatewayRequest::Search {
                ticket,
                query,
                page,
                page_size,
            } => {
                let url = endpoints.search(&query, page, page_size);
                self.http
                    .get(url.as_str())
                    .expect_json::<PageWire>()
                    .send(move |result| Event::SearchLoaded {
                        ticket,
                        query,
                        result: Box::new(decode(result).map(JournalPage::from)),
                    });
            }
            GatewayRequest::Create { ticket, entry } => {
                let body = match serde_json::to_vec(&entry) {
                    Ok(body) => body,
                    Err(e) => return Some(GatewayRequest::Create { ticket, entry }.fail(encode_error(&e))),
                };
                self.http
                    .post(endpoints.journals().as_str())
                    .header("Content-Type", "application/json")
                    .body(body)
                    .expect_json::<JournalRecord>()
                    .send(move |result| Event::JournalCreated {
                        ticket,
                        result: Box::new(decode(result)),
                    });
            }
            GatewayRequest::Update { ticket, record } => {
                let body = match serde_json::to_vec(&record) {
                    Ok(body) => body,
                    Err(e) => return Some(GatewayRequest::Update { ticket, record }.fail(encode_error(&e))),
                };
                let id = record.id;
                self.http
                    .put(endpoints.journal(&id).as_str())
                    .header("Content-Type", "application/json")
                    .body(body)
                    .expect_json::<JournalRecord>()
                    .send(move |result| Event::JournalUpdated {
                        ticket,
                        id,
                        result: Box::new(decode(result)),
                    });
            }
            GatewayRequest::Delete { ticket, id } => {
                self.http
                    .delete(endpoints.journal(&id).as_str())
                    .send(move |result| Event::JournalDeleted {
                        ticket,
                        id,
                        result: Box::new(decode_ack(result)),
                    });
            }
        }
        None
    }
}

fn encode_error(e: &serde_json::Error) -> AppError {
    AppError::server("Could not encode the journal").with_internal(e.to_string())
}
