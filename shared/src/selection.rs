//! Selected journal, edit mode and delete confirmation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::draft::{DraftEdit, FieldError, JournalDraft};
use crate::gateway::GatewayRequest;
use crate::record::{JournalId, JournalRecord};
use crate::request::{Pending, Ticket, Tickets};
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewActivity {
    #[default]
    Idle,
    ConfirmingDelete,
    Deleting,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    NoSelection,
    Viewing {
        record: JournalRecord,
        activity: ViewActivity,
    },
    /// `record` is the copy last seen from the server; the draft is only
    /// ever written back through a successful save.
    Editing {
        record: JournalRecord,
        draft: JournalDraft,
    },
}

/// Selection state together with the panel's error and in-flight requests.
/// Every transition that changes which record is selected replaces the
/// whole panel.
#[derive(Debug, Clone, Default)]
pub struct SelectionPanel {
    state: SelectionState,
    error: Option<AppError>,
    field_errors: Vec<FieldError>,
    saving: Pending,
    deleting: Pending,
}

impl SelectionPanel {
    fn with_state(state: SelectionState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    #[must_use]
    pub fn selected(&self) -> Option<&JournalRecord> {
        match &self.state {
            SelectionState::NoSelection => None,
            SelectionState::Viewing { record, .. } | SelectionState::Editing { record, .. } => Some(record),
        }
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&JournalId> {
        self.selected().map(|r| &r.id)
    }

    #[must_use]
    pub fn draft(&self) -> Option<&JournalDraft> {
        match &self.state {
            SelectionState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving.is_pending()
    }

    #[must_use]
    pub fn activity(&self) -> Option<ViewActivity> {
        match self.state {
            SelectionState::Viewing { activity, .. } => Some(activity),
            _ => None,
        }
    }

    /// Selects `record`, discarding any edit in progress. Re-selecting the
    /// record already being edited or awaiting deletion is ignored.
    pub fn select(&mut self, record: JournalRecord) -> bool {
        let busy_with_same = match &self.state {
            SelectionState::Viewing { record: current, activity } => {
                current.id == record.id && *activity != ViewActivity::Idle
            }
            SelectionState::Editing { record: current, .. } => current.id == record.id,
            SelectionState::NoSelection => false,
        };
        if busy_with_same {
            debug!(id = %record.id, "already selected and busy, ignored");
            return false;
        }
        *self = Self::with_state(SelectionState::Viewing {
            record,
            activity: ViewActivity::Idle,
        });
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn begin_edit(&mut self) -> bool {
        let SelectionState::Viewing {
            record,
            activity: ViewActivity::Idle,
        } = &self.state
        else {
            return false;
        };
        let record = record.clone();
        let draft = JournalDraft::from_record(&record);
        *self = Self::with_state(SelectionState::Editing { record, draft });
        true
    }

    /// Drops the draft and its pending save; the record is shown unchanged.
    pub fn cancel_edit(&mut self) -> bool {
        let SelectionState::Editing { record, .. } = &self.state else {
            return false;
        };
        *self = Self::with_state(SelectionState::Viewing {
            record: record.clone(),
            activity: ViewActivity::Idle,
        });
        true
    }

    pub fn edit_draft(&mut self, edit: &DraftEdit) -> bool {
        let SelectionState::Editing { draft, .. } = &mut self.state else {
            return false;
        };
        record_edit(draft, &mut self.field_errors, edit);
        true
    }

    /// Validates the draft and returns the update request, or records the
    /// field errors. A second save while one is pending is ignored.
    pub fn save(&mut self, tickets: &mut Tickets) -> Option<GatewayRequest> {
        let SelectionState::Editing { record, draft } = &self.state else {
            return None;
        };
        if self.saving.is_pending() {
            debug!("save already in flight, ignored");
            return None;
        }
        match draft.to_entry() {
            Ok(entry) => {
                let record = entry.with_id(record.id.clone());
                let ticket = tickets.issue();
                self.saving.begin(ticket, ());
                self.error = None;
                self.field_errors.clear();
                Some(GatewayRequest::Update { ticket, record })
            }
            Err(errors) => {
                self.field_errors = errors;
                None
            }
        }
    }

    /// Applies an update response. Returns `false` when the save was
    /// superseded and the panel was left alone.
    pub fn apply_update(&mut self, ticket: Ticket, result: Result<JournalRecord, AppError>) -> bool {
        if self.saving.settle(ticket).is_none() {
            debug!(%ticket, "stale update response dropped");
            return false;
        }
        match result {
            Ok(record) => {
                *self = Self::with_state(SelectionState::Viewing {
                    record,
                    activity: ViewActivity::Idle,
                });
            }
            Err(error) => {
                warn!(code = error.code(), %error, "update failed");
                self.error = Some(error);
            }
        }
        true
    }

    pub fn request_delete(&mut self) -> bool {
        self.set_activity(ViewActivity::Idle, ViewActivity::ConfirmingDelete)
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.set_activity(ViewActivity::ConfirmingDelete, ViewActivity::Idle)
    }

    pub fn confirm_delete(&mut self, tickets: &mut Tickets) -> Option<GatewayRequest> {
        let id = match &self.state {
            SelectionState::Viewing {
                record,
                activity: ViewActivity::ConfirmingDelete,
            } => record.id.clone(),
            _ => return None,
        };
        self.set_activity(ViewActivity::ConfirmingDelete, ViewActivity::Deleting);
        self.error = None;
        let ticket = tickets.issue();
        self.deleting.begin(ticket, ());
        Some(GatewayRequest::Delete { ticket, id })
    }

    /// Applies a delete response. Returns `false` for a superseded delete.
    pub fn apply_delete(&mut self, ticket: Ticket, result: Result<(), AppError>) -> bool {
        if self.deleting.settle(ticket).is_none() {
            debug!(%ticket, "stale delete response dropped");
            return false;
        }
        match result {
            Ok(()) => self.clear(),
            Err(error) => {
                warn!(code = error.code(), %error, "delete failed");
                self.set_activity(ViewActivity::Deleting, ViewActivity::Idle);
                self.error = Some(error);
            }
        }
        true
    }

    /// Swaps in a fresher copy of the selected record when only viewing it.
    pub fn refresh_record(&mut self, fresh: &JournalRecord) {
        if let SelectionState::Viewing { record, .. } = &mut self.state {
            if record.id == fresh.id {
                record.clone_from(fresh);
            }
        }
    }

    fn set_activity(&mut self, from: ViewActivity, to: ViewActivity) -> bool {
        match &mut self.state {
            SelectionState::Viewing { activity, .. } if *activity == from => {
                *activity = to;
                true
            }
            _ => false,
        }
    }
}

/// Applies one draft edit and keeps the field's inline error in step.
pub(crate) fn record_edit(draft: &mut JournalDraft, field_errors: &mut Vec<FieldError>, edit: &DraftEdit) {
    let field = edit.field();
    field_errors.retain(|e| e.field != field);
    if let Err(error) = draft.apply(edit) {
        field_errors.push(error);
    }
}
