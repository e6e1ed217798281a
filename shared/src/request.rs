//! Correlation tickets for in-flight gateway requests.
//!
//! Every request that feeds back into view state is issued with a [`Ticket`].
//! The controller that issued it parks the ticket in a [`Pending`] slot, and a
//! response is applied only when its ticket still occupies that slot. Changing
//! intent (another page, a new search, a different selection) overwrites or
//! clears the slot, which turns any late response into a no-op.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic ticket source shared by all controllers of one model.
#[derive(Debug, Default)]
pub struct Tickets {
    last: u64,
}

impl Tickets {
    pub fn issue(&mut self) -> Ticket {
        self.last += 1;
        Ticket(self.last)
    }
}

/// One outstanding request per concern, with the intent it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending<T = ()> {
    slot: Option<(Ticket, T)>,
}

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> Pending<T> {
    /// Replaces whatever was outstanding; the old ticket becomes stale.
    pub fn begin(&mut self, ticket: Ticket, intent: T) {
        self.slot = Some((ticket, intent));
    }

    /// Takes the intent back if `ticket` is the current one.
    pub fn settle(&mut self, ticket: Ticket) -> Option<T> {
        match &self.slot {
            Some((current, _)) if *current == ticket => self.slot.take().map(|(_, intent)| intent),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.slot = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    #[must_use]
    pub fn intent(&self) -> Option<&T> {
        self.slot.as_ref().map(|(_, intent)| intent)
    }

    #[must_use]
    pub fn ticket(&self) -> Option<Ticket> {
        self.slot.as_ref().map(|(ticket, _)| *ticket)
    }
}
