use tracing::{debug, warn};

use crate::draft::{DraftEdit, FieldError, JournalDraft};
use crate::gateway::GatewayRequest;
use crate::record::JournalRecord;
use crate::request::{Pending, Ticket, Tickets};
use crate::selection::record_edit;
use crate::AppError;

/// New-journal form. Keeps its contents on failure so nothing typed is lost.
#[derive(Debug, Clone, Default)]
pub struct CreateForm {
    draft: JournalDraft,
    field_errors: Vec<FieldError>,
    error: Option<AppError>,
    submitting: Pending,
}

impl CreateForm {
    #[must_use]
    pub fn draft(&self) -> &JournalDraft {
        &self.draft
    }

    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    #[must_use]
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting.is_pending()
    }

    pub fn edit(&mut self, edit: &DraftEdit) {
        record_edit(&mut self.draft, &mut self.field_errors, edit);
    }

    pub fn submit(&mut self, tickets: &mut Tickets) -> Option<GatewayRequest> {
        if self.submitting.is_pending() {
            debug!("create already in flight, ignored");
            return None;
        }
        match self.draft.to_entry() {
            Ok(entry) => {
                let ticket = tickets.issue();
                self.submitting.begin(ticket, ());
                self.field_errors.clear();
                self.error = None;
                Some(GatewayRequest::Create { ticket, entry })
            }
            Err(errors) => {
                self.field_errors = errors;
                None
            }
        }
    }

    /// Applies a create response and hands back the created record.
    pub fn apply_created(
        &mut self,
        ticket: Ticket,
        result: Result<JournalRecord, AppError>,
    ) -> Option<JournalRecord> {
        if self.submitting.settle(ticket).is_none() {
            debug!(%ticket, "stale create response dropped");
            return None;
        }
        match result {
            Ok(record) => {
                self.reset();
                Some(record)
            }
            Err(error) => {
                warn!(code = error.code(), %error, "create failed");
                self.error = Some(error);
                None
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
