use serde::{Deserialize, Serialize};

pub use crate::draft::{DraftEdit, DraftField};
use crate::config::JournalConfig;
use crate::gateway::JournalPage;
use crate::record::{JournalId, JournalRecord};
use crate::request::Ticket;
use crate::AppError;

/// Which draft a [`DraftEdit`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftTarget {
    Edit,
    Create,
}

// --- Event enum: completion results boxed to keep it small ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub enum Event {
    #[default]
    Noop,

    Configured(JournalConfig),
    Mounted,

    SearchTextChanged {
        text: String,
    },
    SearchSubmitted,
    SearchCleared,
    NextPage,
    PreviousPage,
    PageSelected {
        page: u32,
    },
    Refresh,

    JournalSelected {
        id: JournalId,
    },
    SelectionCleared,
    EditRequested,
    EditCancelled,
    EditSaved,
    DeleteRequested,
    DeleteConfirmed,
    DeleteCancelled,

    DraftEdited {
        target: DraftTarget,
        edit: DraftEdit,
    },
    CreateSubmitted,
    CreateReset,
    DismissToast,

    LatestLoaded {
        ticket: Ticket,
        page: u32,
        result: Box<Result<JournalPage, AppError>>,
    },
    SearchLoaded {
        ticket: Ticket,
        query: String,
        result: Box<Result<JournalPage, AppError>>,
    },
    JournalCreated {
        ticket: Ticket,
        result: Box<Result<JournalRecord, AppError>>,
    },
    JournalUpdated {
        ticket: Ticket,
        id: JournalId,
        result: Box<Result<JournalRecord, AppError>>,
    },
    JournalDeleted {
        ticket: Ticket,
        id: JournalId,
        result: Box<Result<(), AppError>>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configured(_) => "configured",
            Self::Mounted => "mounted",
            Self::SearchTextChanged { .. } => "search_text_changed",
            Self::SearchSubmitted => "search_submitted",
            Self::SearchCleared => "search_cleared",
            Self::NextPage => "next_page",
            Self::PreviousPage => "previous_page",
            Self::PageSelected { .. } => "page_selected",
            Self::Refresh => "refresh",
            Self::JournalSelected { .. } => "journal_selected",
            Self::SelectionCleared => "selection_cleared",
            Self::EditRequested => "edit_requested",
            Self::EditCancelled => "edit_cancelled",
            Self::EditSaved => "edit_saved",
            Self::DeleteRequested => "delete_requested",
            Self::DeleteConfirmed => "delete_confirmed",
            Self::DeleteCancelled => "delete_cancelled",
            Self::DraftEdited { .. } => "draft_edited",
            Self::CreateSubmitted => "create_submitted",
            Self::CreateReset => "create_reset",
            Self::DismissToast => "dismiss_toast",
            Self::LatestLoaded { .. } => "latest_loaded",
            Self::SearchLoaded { .. } => "search_loaded",
            Self::JournalCreated { .. } => "journal_created",
            Self::JournalUpdated { .. } => "journal_updated",
            Self::JournalDeleted { .. } => "journal_deleted",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::SearchTextChanged { .. }
                | Self::SearchSubmitted
                | Self::SearchCleared
                | Self::NextPage
                | Self::PreviousPage
                | Self::PageSelected { .. }
                | Self::Refresh
                | Self::JournalSelected { .. }
                | Self::SelectionCleared
                | Self::EditRequested
                | Self::EditCancelled
                | Self::EditSaved
                | Self::DeleteRequested
                | Self::DeleteConfirmed
                | Self::DeleteCancelled
                | Self::DraftEdited { .. }
                | Self::CreateSubmitted
                | Self::CreateReset
                | Self::DismissToast
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_are_not_user_initiated() {
        assert!(!Event::Noop.is_user_initiated());
        assert!(!Event::Mounted.is_user_initiated());
        assert!(Event::SearchSubmitted.is_user_initiated());
        assert!(Event::JournalSelected {
            id: JournalId::new("1")
        }
        .is_user_initiated());
        assert!(!Event::JournalDeleted {
            ticket: crate::request::Tickets::default().issue(),
            id: JournalId::new("1"),
            result: Box::new(Ok(())),
        }
        .is_user_initiated());
    }

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(size <= 128, "Event enum is {size} bytes, box more variants");
    }
}
