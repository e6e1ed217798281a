use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::JournalConfig;
use crate::create_form::CreateForm;
use crate::event::{DraftTarget, Event};
use crate::gateway::GatewayRequest;
use crate::listing::ListState;
use crate::record::JournalId;
use crate::request::Tickets;
use crate::selection::SelectionPanel;
use crate::AppError;

pub const JOURNAL_CREATED: &str = "Journal created";
pub const JOURNAL_UPDATED: &str = "Journal updated";
pub const JOURNAL_DELETED: &str = "Journal deleted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            duration_ms: kind.default_duration_ms(),
        }
    }
}

#[derive(Debug)]
pub struct Model {
    pub config: JournalConfig,
    pub list: ListState,
    pub selection: SelectionPanel,
    pub create: CreateForm,
    pub toast: Option<ToastMessage>,
    pub mounted: bool,
    tickets: Tickets,
}

impl Default for Model {
    fn default() -> Self {
        Self::with_config(JournalConfig::default())
    }
}

impl Model {
    #[must_use]
    pub fn with_config(config: JournalConfig) -> Self {
        Self {
            list: ListState::new(config.page_size, config.search_page_size),
            config,
            selection: SelectionPanel::default(),
            create: CreateForm::default(),
            toast: None,
            mounted: false,
            tickets: Tickets::default(),
        }
    }

    /// Runs one event through the controllers and returns the requests to
    /// issue.
    pub fn apply(&mut self, event: Event) -> Vec<GatewayRequest> {
        let tickets = &mut self.tickets;
        match event {
            Event::Noop => Vec::new(),

            Event::Configured(config) => {
                if let Err(error) = config.validate() {
                    warn!(%error, "configuration rejected");
                    self.toast = Some(ToastMessage::new(error.to_string(), ToastKind::Error));
                    return Vec::new();
                }
                let (page_size, search_page_size) = (config.page_size, config.search_page_size);
                self.config = config;
                if self.mounted {
                    vec![self.list.reconfigure(tickets, page_size, search_page_size)]
                } else {
                    self.list = ListState::new(page_size, search_page_size);
                    Vec::new()
                }
            }

            Event::Mounted => {
                self.mounted = true;
                vec![self.list.refresh_latest(tickets)]
            }

            Event::SearchTextChanged { text } => {
                let request = self.list.set_search_text(tickets, text);
                if request.is_some() {
                    self.selection.clear();
                }
                request.into_iter().collect()
            }

            Event::SearchSubmitted => {
                let request = self.list.submit_search(tickets);
                if request.is_some() {
                    self.selection.clear();
                }
                request.into_iter().collect()
            }

            Event::SearchCleared => {
                self.selection.clear();
                vec![self.list.clear_search(tickets)]
            }

            Event::NextPage => self.list.next_page(tickets).into_iter().collect(),
            Event::PreviousPage => self.list.previous_page(tickets).into_iter().collect(),
            Event::PageSelected { page } => self.list.select_page(tickets, page).into_iter().collect(),
            Event::Refresh => vec![self.list.refresh(tickets)],

            Event::JournalSelected { id } => {
                match self.list.find_displayed(&id) {
                    Some(record) => {
                        self.selection.select(record.clone());
                    }
                    None => debug!(%id, "selected journal is not displayed, ignored"),
                }
                Vec::new()
            }
            Event::SelectionCleared => {
                self.selection.clear();
                Vec::new()
            }
            Event::EditRequested => {
                self.selection.begin_edit();
                Vec::new()
            }
            Event::EditCancelled => {
                self.selection.cancel_edit();
                Vec::new()
            }
            Event::EditSaved => self.selection.save(tickets).into_iter().collect(),
            Event::DeleteRequested => {
                self.selection.request_delete();
                Vec::new()
            }
            Event::DeleteCancelled => {
                self.selection.cancel_delete();
                Vec::new()
            }
            Event::DeleteConfirmed => self.selection.confirm_delete(tickets).into_iter().collect(),

            Event::DraftEdited { target, edit } => {
                match target {
                    DraftTarget::Edit => {
                        if !self.selection.edit_draft(&edit) {
                            debug!("draft edit outside edit mode, ignored");
                        }
                    }
                    DraftTarget::Create => self.create.edit(&edit),
                }
                Vec::new()
            }
            Event::CreateSubmitted => self.create.submit(tickets).into_iter().collect(),
            Event::CreateReset => {
                self.create.reset();
                Vec::new()
            }
            Event::DismissToast => {
                self.toast = None;
                Vec::new()
            }

            Event::LatestLoaded { ticket, result, .. } => {
                self.list.apply_latest(tickets, ticket, *result).into_iter().collect()
            }
            Event::SearchLoaded { ticket, result, .. } => {
                self.list.apply_search(ticket, *result);
                Vec::new()
            }

            // A successful mutation is reflected in the lists even when the
            // form or panel that issued it has moved on.
            Event::JournalCreated { ticket, result } => {
                let result = *result;
                let created_id = result.as_ref().ok().map(|r| r.id.clone());
                let applied = self.create.apply_created(ticket, result).is_some();
                let Some(id) = created_id else {
                    return Vec::new();
                };
                info!(%id, "journal created");
                if applied {
                    self.toast = Some(ToastMessage::new(JOURNAL_CREATED, ToastKind::Success));
                }
                vec![self.list.refresh_latest(tickets)]
            }

            Event::JournalUpdated { ticket, id, result } => {
                let result = *result;
                let updated = result.as_ref().ok().cloned();
                let failure = result.as_ref().err().cloned();
                let applied = self.selection.apply_update(ticket, result);
                let Some(record) = updated else {
                    if let (false, Some(error)) = (applied, failure) {
                        self.toast = Some(detached_failure("update", &id, &error));
                    }
                    return Vec::new();
                };
                info!(%id, "journal updated");
                self.list.replace_record(&record);
                if applied {
                    self.toast = Some(ToastMessage::new(JOURNAL_UPDATED, ToastKind::Success));
                } else {
                    self.selection.refresh_record(&record);
                }
                vec![self.list.refresh(tickets)]
            }

            Event::JournalDeleted { ticket, id, result } => {
                let result = *result;
                let failure = result.as_ref().err().cloned();
                let applied = self.selection.apply_delete(ticket, result);
                if let Some(error) = failure {
                    if !applied {
                        self.toast = Some(detached_failure("delete", &id, &error));
                    }
                    return Vec::new();
                }
                info!(%id, "journal deleted");
                self.list.remove_record(&id);
                if applied {
                    self.toast = Some(ToastMessage::new(JOURNAL_DELETED, ToastKind::Success));
                } else if self.selection.selected_id() == Some(&id) {
                    self.selection.clear();
                }
                vec![self.list.refresh(tickets)]
            }
        }
    }
}

/// Toast for a failed mutation whose panel has since moved on, so the error
/// has nowhere else to show.
fn detached_failure(action: &str, id: &JournalId, error: &AppError) -> ToastMessage {
    warn!(%id, code = error.code(), %error, "{action} failed after the panel moved on");
    ToastMessage::new(
        format!("Could not {action} journal {id}: {}", error.user_facing_message()),
        ToastKind::Error,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftEdit;
    use crate::gateway::JournalPage;
    use crate::listing::{EmptyReason, ListView};
    use crate::record::{JournalDate, JournalEntry, JournalRecord, SpeciesTally};
    use crate::selection::SelectionState;

    fn record(id: &str, place: &str) -> JournalRecord {
        JournalEntry::new(
            JournalDate::parse("2024-03-12").unwrap(),
            place,
            SpeciesTally::new(),
            "",
        )
        .unwrap()
        .with_id(JournalId::new(id))
    }

    fn page(records: Vec<JournalRecord>, total: u64) -> Box<Result<JournalPage, AppError>> {
        Box::new(Ok(JournalPage {
            records,
            total_count: Some(total),
        }))
    }

    /// Completes a latest-page request with `records`.
    fn answer_latest(model: &mut Model, request: &GatewayRequest, records: Vec<JournalRecord>, total: u64) -> Vec<GatewayRequest> {
        let GatewayRequest::ListLatest { ticket, page: p, .. } = request else {
            panic!("expected a page request, got {request:?}");
        };
        model.apply(Event::LatestLoaded {
            ticket: *ticket,
            page: *p,
            result: page(records, total),
        })
    }

    fn answer_search(model: &mut Model, request: &GatewayRequest, records: Vec<JournalRecord>) {
        let GatewayRequest::Search { ticket, query, .. } = request else {
            panic!("expected a search request, got {request:?}");
        };
        model.apply(Event::SearchLoaded {
            ticket: *ticket,
            query: query.clone(),
            result: page(records, 1),
        });
    }

    fn mounted_with(records: Vec<JournalRecord>) -> Model {
        let mut model = Model::default();
        let requests = model.apply(Event::Mounted);
        let total = records.len() as u64;
        answer_latest(&mut model, &requests[0], records, total);
        model
    }

    #[test]
    fn search_clears_selection() {
        let mut model = mounted_with(vec![record("a", "Park")]);
        model.apply(Event::JournalSelected { id: "a".into() });
        assert!(model.selection.selected().is_some());

        model.apply(Event::SearchTextChanged { text: "Lake".into() });
        assert!(model.selection.selected().is_some());
        let requests = model.apply(Event::SearchSubmitted);
        assert_eq!(requests.len(), 1);
        assert_eq!(model.selection.state(), &SelectionState::NoSelection);

        answer_search(&mut model, &requests[0], Vec::new());
        assert_eq!(
            model.list.view(),
            &ListView::Empty {
                reason: EmptyReason::NoResults { query: "Lake".into() }
            }
        );
        assert!(model.selection.selected().is_none());
    }

    #[test]
    fn clearing_after_selecting_result_returns_to_latest() {
        let mut model = mounted_with(vec![record("a", "Park")]);
        model.apply(Event::SearchTextChanged { text: "Lake".into() });
        let requests = model.apply(Event::SearchSubmitted);
        answer_search(&mut model, &requests[0], vec![record("l1", "Lake")]);
        model.apply(Event::JournalSelected { id: "l1".into() });
        assert!(model.selection.selected().is_some());

        let requests = model.apply(Event::SearchTextChanged { text: String::new() });
        assert!(model.list.view().is_latest());
        assert!(model.selection.selected().is_none());
        assert_eq!(model.list.search_text(), "");
        assert_eq!(model.list.pagination().page, 1);
        assert!(matches!(requests[..], [GatewayRequest::ListLatest { page: 1, .. }]));
    }

    #[test]
    fn selecting_unknown_id_is_ignored() {
        let mut model = mounted_with(vec![record("a", "Park")]);
        model.apply(Event::JournalSelected { id: "zzz".into() });
        assert!(model.selection.selected().is_none());
    }

    #[test]
    fn delete_success_removes_and_refetches() {
        let mut model = mounted_with(vec![record("a", "Park"), record("b", "Lake")]);
        model.apply(Event::JournalSelected { id: "a".into() });
        model.apply(Event::DeleteRequested);
        let requests = model.apply(Event::DeleteConfirmed);
        let GatewayRequest::Delete { ticket, id } = &requests[0] else {
            panic!("expected a delete request");
        };

        let follow_up = model.apply(Event::JournalDeleted {
            ticket: *ticket,
            id: id.clone(),
            result: Box::new(Ok(())),
        });
        assert!(model.selection.selected().is_none());
        assert!(model.list.find_displayed(&"a".into()).is_none());
        assert_eq!(model.toast.as_ref().map(|t| t.message.as_str()), Some(JOURNAL_DELETED));

        answer_latest(&mut model, &follow_up[0], vec![record("b", "Lake")], 1);
        assert_eq!(model.list.displayed().len(), 1);
    }

    #[test]
    fn failed_delete_leaves_record_present_and_selected() {
        let mut model = mounted_with(vec![record("a", "Park")]);
        model.apply(Event::JournalSelected { id: "a".into() });
        model.apply(Event::DeleteRequested);
        let requests = model.apply(Event::DeleteConfirmed);
        let follow_up = model.apply(requests[0].clone().fail(AppError::server("boom")));

        assert!(follow_up.is_empty());
        assert_eq!(model.selection.selected_id(), Some(&"a".into()));
        assert!(model.selection.error().is_some());
        assert!(model.list.find_displayed(&"a".into()).is_some());
    }

    #[test]
    fn stale_update_still_reaches_the_list() {
        let mut model = mounted_with(vec![record("a", "Park"), record("b", "Lake")]);
        model.apply(Event::JournalSelected { id: "a".into() });
        model.apply(Event::EditRequested);
        model.apply(Event::DraftEdited {
            target: DraftTarget::Edit,
            edit: DraftEdit::SetPlace { value: "Pond".into() },
        });
        let requests = model.apply(Event::EditSaved);
        let GatewayRequest::Update { ticket, record: sent } = requests[0].clone() else {
            panic!("expected an update request");
        };

        model.apply(Event::JournalSelected { id: "b".into() });
        let follow_up = model.apply(Event::JournalUpdated {
            ticket,
            id: sent.id.clone(),
            result: Box::new(Ok(sent)),
        });

        assert_eq!(model.selection.selected_id(), Some(&"b".into()));
        assert_eq!(model.list.find_displayed(&"a".into()).map(JournalRecord::place), Some("Pond"));
        assert_eq!(follow_up.len(), 1);
        assert!(model.toast.is_none());
    }

    #[test]
    fn delete_failure_after_moving_on_raises_toast() {
        let mut model = mounted_with(vec![record("j1", "Park"), record("j2", "Lake")]);
        model.apply(Event::JournalSelected { id: "j1".into() });
        model.apply(Event::DeleteRequested);
        let requests = model.apply(Event::DeleteConfirmed);

        model.apply(Event::JournalSelected { id: "j2".into() });
        let follow_up = model.apply(requests[0].clone().fail(AppError::server("boom")));

        assert!(follow_up.is_empty());
        assert_eq!(model.selection.selected_id(), Some(&"j2".into()));
        assert!(model.selection.error().is_none());
        assert!(model.list.find_displayed(&"j1".into()).is_some());
        let toast = model.toast.as_ref().expect("failure should surface");
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.message.contains("j1"));
    }

    #[test]
    fn update_failure_after_cancel_raises_toast() {
        let mut model = mounted_with(vec![record("j1", "Park")]);
        model.apply(Event::JournalSelected { id: "j1".into() });
        model.apply(Event::EditRequested);
        let requests = model.apply(Event::EditSaved);
        model.apply(Event::EditCancelled);

        let follow_up = model.apply(requests[0].clone().fail(AppError::from_http_status(404, None)));

        assert!(follow_up.is_empty());
        assert_eq!(model.list.find_displayed(&"j1".into()).map(JournalRecord::place), Some("Park"));
        let toast = model.toast.as_ref().expect("failure should surface");
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.message.starts_with("Could not update journal j1"));
    }

    #[test]
    fn configured_after_mount_restarts_at_page_one() {
        let mut model = mounted_with(vec![record("a", "Park")]);
        let config = JournalConfig {
            page_size: 5,
            ..JournalConfig::default()
        };
        let requests = model.apply(Event::Configured(config));
        assert!(matches!(
            requests[..],
            [GatewayRequest::ListLatest { page: 1, page_size: 5, .. }]
        ));
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let mut model = Model::default();
        let config = JournalConfig {
            page_size: 0,
            ..JournalConfig::default()
        };
        assert!(model.apply(Event::Configured(config)).is_empty());
        assert_eq!(model.config.page_size, 10);
        assert_eq!(model.toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
    }
}
