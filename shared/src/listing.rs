//! List and search view state.
//!
//! The latest page is always retained, even while a search view is active,
//! so clearing a search shows it again immediately. Page and search requests
//! each own one [`Pending`] slot: a response is applied only while its ticket
//! is still the current one for that slot.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::gateway::{GatewayRequest, JournalPage};
use crate::record::{JournalId, JournalRecord};
use crate::request::{Pending, Ticket, Tickets};
use crate::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_count: Option<u64>,
    /// Length of the last page received, used when the total is unknown.
    pub last_page_len: usize,
}

impl Pagination {
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_count: None,
            last_page_len: 0,
        }
    }

    #[must_use]
    pub fn total_pages(&self) -> Option<u32> {
        self.total_count.map(|total| {
            let pages = total.div_ceil(u64::from(self.page_size));
            u32::try_from(pages).unwrap_or(u32::MAX)
        })
    }

    /// Highest page that may be requested, when the total is known.
    #[must_use]
    pub fn max_page(&self) -> Option<u32> {
        self.total_pages().map(|pages| pages.max(1))
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.has_next_from(self.page)
    }

    /// Whether a page after `page` exists. Without a total, only the page
    /// actually loaded can tell, by coming back full.
    #[must_use]
    pub fn has_next_from(&self, page: u32) -> bool {
        match self.total_pages() {
            Some(pages) => page < pages,
            None => page == self.page && self.last_page_len >= self.page_size as usize,
        }
    }

    #[must_use]
    pub fn clamp(&self, page: u32) -> u32 {
        match self.max_page() {
            Some(max) => page.clamp(1, max),
            None => page.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmptyReason {
    NoResults { query: String },
    SearchFailed { query: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListView {
    #[default]
    Latest,
    Searching {
        query: String,
    },
    SearchResults {
        query: String,
        records: Vec<JournalRecord>,
    },
    Empty {
        reason: EmptyReason,
    },
}

impl ListView {
    #[must_use]
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Latest => None,
            Self::Searching { query }
            | Self::SearchResults { query, .. }
            | Self::Empty {
                reason: EmptyReason::NoResults { query } | EmptyReason::SearchFailed { query },
            } => Some(query),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListState {
    search_text: String,
    view: ListView,
    latest: Vec<JournalRecord>,
    pagination: Pagination,
    search_page_size: u32,
    error: Option<AppError>,
    pending_latest: Pending<u32>,
    pending_search: Pending<String>,
}

impl ListState {
    #[must_use]
    pub fn new(page_size: u32, search_page_size: u32) -> Self {
        Self {
            search_text: String::new(),
            view: ListView::Latest,
            latest: Vec::new(),
            pagination: Pagination::new(page_size),
            search_page_size: search_page_size.max(1),
            error: None,
            pending_latest: Pending::default(),
            pending_search: Pending::default(),
        }
    }

    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    #[must_use]
    pub fn view(&self) -> &ListView {
        &self.view
    }

    #[must_use]
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    #[must_use]
    pub fn latest(&self) -> &[JournalRecord] {
        &self.latest
    }

    #[must_use]
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        match self.view {
            ListView::Latest => self.pending_latest.is_pending(),
            _ => self.pending_search.is_pending(),
        }
    }

    /// The collection the list currently shows.
    #[must_use]
    pub fn displayed(&self) -> &[JournalRecord] {
        match &self.view {
            ListView::Latest => &self.latest,
            ListView::SearchResults { records, .. } => records,
            ListView::Searching { .. } | ListView::Empty { .. } => &[],
        }
    }

    #[must_use]
    pub fn find_displayed(&self, id: &JournalId) -> Option<&JournalRecord> {
        self.displayed().iter().find(|r| &r.id == id)
    }

    /// Page the list is heading to: the pending page if any, else the
    /// current one.
    #[must_use]
    pub fn cursor(&self) -> u32 {
        self.pending_latest
            .intent()
            .copied()
            .unwrap_or(self.pagination.page)
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.view.is_latest() && self.cursor() > 1
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.view.is_latest() && self.pagination.has_next_from(self.cursor())
    }

    /// New page sizes start the session over at page 1.
    pub fn reconfigure(&mut self, tickets: &mut Tickets, page_size: u32, search_page_size: u32) -> GatewayRequest {
        self.pagination = Pagination::new(page_size);
        self.search_page_size = search_page_size.max(1);
        self.request_page(tickets, 1)
    }

    /// Fetches the latest page the list is on, whatever view is active.
    pub fn refresh_latest(&mut self, tickets: &mut Tickets) -> GatewayRequest {
        self.request_page(tickets, self.cursor())
    }

    pub fn next_page(&mut self, tickets: &mut Tickets) -> Option<GatewayRequest> {
        if !self.can_go_next() {
            return None;
        }
        let page = self.cursor() + 1;
        Some(self.request_page(tickets, page))
    }

    pub fn previous_page(&mut self, tickets: &mut Tickets) -> Option<GatewayRequest> {
        if !self.can_go_previous() {
            return None;
        }
        let page = self.cursor() - 1;
        Some(self.request_page(tickets, page))
    }

    /// Direct page click. Pages outside the known range are ignored.
    pub fn select_page(&mut self, tickets: &mut Tickets, page: u32) -> Option<GatewayRequest> {
        if !self.view.is_latest() || page == 0 {
            return None;
        }
        let in_range = match self.pagination.max_page() {
            Some(max) => page <= max,
            None => page <= self.pagination.page || (page == self.pagination.page + 1 && self.pagination.has_next()),
        };
        if !in_range {
            debug!(page, "page out of range, ignored");
            return None;
        }
        Some(self.request_page(tickets, page))
    }

    /// Updates the search box. Emptying it while a search view is shown
    /// clears the search and returns the refresh for the latest page.
    pub fn set_search_text(&mut self, tickets: &mut Tickets, text: String) -> Option<GatewayRequest> {
        self.search_text = text;
        if self.search_text.trim().is_empty() && !self.view.is_latest() {
            return Some(self.clear_search(tickets));
        }
        None
    }

    /// Starts a new search for the trimmed search text, always at page 1.
    pub fn submit_search(&mut self, tickets: &mut Tickets) -> Option<GatewayRequest> {
        let query = self.search_text.trim().to_string();
        if query.is_empty() {
            return None;
        }
        self.error = None;
        self.view = ListView::Searching {
            query: query.clone(),
        };
        Some(self.request_search(tickets, query))
    }

    /// Drops the search and returns to the latest page last viewed. The
    /// retained page shows at once while it is re-fetched.
    pub fn clear_search(&mut self, tickets: &mut Tickets) -> GatewayRequest {
        self.search_text.clear();
        self.view = ListView::Latest;
        self.error = None;
        self.pending_search.cancel();
        self.refresh_latest(tickets)
    }

    /// Re-issues whatever request backs the current view.
    pub fn refresh(&mut self, tickets: &mut Tickets) -> GatewayRequest {
        match self.view.query().map(str::to_string) {
            Some(query) => self.request_search(tickets, query),
            None => self.refresh_latest(tickets),
        }
    }

    /// Applies a page response. Returns a follow-up request when the
    /// reported total puts the page out of range.
    pub fn apply_latest(
        &mut self,
        tickets: &mut Tickets,
        ticket: Ticket,
        result: Result<JournalPage, AppError>,
    ) -> Option<GatewayRequest> {
        let Some(page) = self.pending_latest.settle(ticket) else {
            debug!(%ticket, "stale page response dropped");
            return None;
        };

        match result {
            Ok(loaded) => {
                self.pagination.page = page;
                self.pagination.total_count = loaded.total_count;
                self.pagination.last_page_len = loaded.records.len();
                self.latest = loaded.records;
                if self.view.is_latest() {
                    self.error = None;
                }

                let clamped = match self.pagination.max_page() {
                    Some(max) if page > max => Some(max),
                    None if page > 1 && self.latest.is_empty() => Some(page - 1),
                    _ => None,
                };
                clamped.map(|target| {
                    debug!(page, target, "page out of range after load, clamping");
                    self.request_page(tickets, target)
                })
            }
            Err(error) => {
                warn!(page, code = error.code(), %error, "latest page failed");
                if self.view.is_latest() {
                    self.error = Some(error);
                }
                None
            }
        }
    }

    pub fn apply_search(&mut self, ticket: Ticket, result: Result<JournalPage, AppError>) {
        let Some(query) = self.pending_search.settle(ticket) else {
            debug!(%ticket, "stale search response dropped");
            return;
        };

        match result {
            Ok(loaded) if loaded.records.is_empty() => {
                self.error = None;
                self.view = ListView::Empty {
                    reason: EmptyReason::NoResults { query },
                };
            }
            Ok(loaded) => {
                self.error = None;
                self.view = ListView::SearchResults {
                    query,
                    records: loaded.records,
                };
            }
            Err(error) => {
                warn!(%query, code = error.code(), %error, "search failed");
                // A failed refresh keeps the results already on screen.
                if !matches!(self.view, ListView::SearchResults { .. }) {
                    self.view = ListView::Empty {
                        reason: EmptyReason::SearchFailed { query },
                    };
                }
                self.error = Some(error);
            }
        }
    }

    /// Removes a deleted record from every local collection.
    pub fn remove_record(&mut self, id: &JournalId) {
        self.latest.retain(|r| &r.id != id);
        if let ListView::SearchResults { query, records } = &mut self.view {
            records.retain(|r| &r.id != id);
            if records.is_empty() {
                let query = std::mem::take(query);
                self.view = ListView::Empty {
                    reason: EmptyReason::NoResults { query },
                };
            }
        }
    }

    pub fn replace_record(&mut self, record: &JournalRecord) {
        let collections = match &mut self.view {
            ListView::SearchResults { records, .. } => vec![&mut self.latest, records],
            _ => vec![&mut self.latest],
        };
        for collection in collections {
            if let Some(slot) = collection.iter_mut().find(|r| r.id == record.id) {
                slot.clone_from(record);
            }
        }
    }

    fn request_page(&mut self, tickets: &mut Tickets, page: u32) -> GatewayRequest {
        let ticket = tickets.issue();
        self.pending_latest.begin(ticket, page);
        GatewayRequest::ListLatest {
            ticket,
            page,
            page_size: self.pagination.page_size,
        }
    }

    fn request_search(&mut self, tickets: &mut Tickets, query: String) -> GatewayRequest {
        let ticket = tickets.issue();
        self.pending_search.begin(ticket, query.clone());
        GatewayRequest::Search {
            ticket,
            query,
            page: 1,
            page_size: self.search_page_size,
        }
    }
}
