use serde::{Deserialize, Serialize};

use crate::draft::{FieldError, JournalDraft};
use crate::listing::{EmptyReason, ListView};
use crate::model::{Model, ToastKind, ToastMessage};
use crate::record::{JournalRecord, SpeciesTally};
use crate::selection::{SelectionState, ViewActivity};
use crate::{AppError, NO_RESULTS_MESSAGE};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeciesView {
    pub name: String,
    pub count: u32,
}

fn species_rows(tally: &SpeciesTally) -> Vec<SpeciesView> {
    tally
        .iter()
        .map(|s| SpeciesView {
            name: s.name.clone(),
            count: s.count,
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchBarView {
    pub text: String,
    pub can_submit: bool,
    pub can_clear: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JournalListItem {
    pub id: String,
    pub place: String,
    pub date: String,
    pub display_date: String,
    pub is_selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: Option<u32>,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListDisplay {
    Latest,
    Searching { query: String },
    Results { query: String },
    Empty { query: String, message: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListPanelView {
    pub display: ListDisplay,
    pub items: Vec<JournalListItem>,
    pub is_loading: bool,
    /// Present only while the latest page is shown.
    pub pagination: Option<PaginationView>,
    pub error: Option<UserFacingError>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JournalDetailView {
    pub id: String,
    pub date: String,
    pub display_date: String,
    pub place: String,
    pub notes: String,
    pub species: Vec<SpeciesView>,
}

impl From<&JournalRecord> for JournalDetailView {
    fn from(r: &JournalRecord) -> Self {
        Self {
            id: r.id.to_string(),
            date: r.date().to_string(),
            display_date: r.date().display(),
            place: r.place().to_string(),
            notes: r.notes().to_string(),
            species: species_rows(r.species()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DraftView {
    pub date: String,
    pub place: String,
    pub notes: String,
    pub species: Vec<SpeciesView>,
}

impl From<&JournalDraft> for DraftView {
    fn from(d: &JournalDraft) -> Self {
        Self {
            date: d.date.clone(),
            place: d.place.clone(),
            notes: d.notes.clone(),
            species: species_rows(&d.species),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionView {
    NoSelection,
    Viewing {
        journal: JournalDetailView,
        confirming_delete: bool,
        is_deleting: bool,
        error: Option<UserFacingError>,
    },
    Editing {
        journal: JournalDetailView,
        draft: DraftView,
        is_saving: bool,
        field_errors: Vec<FieldError>,
        error: Option<UserFacingError>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateFormView {
    pub draft: DraftView,
    pub is_submitting: bool,
    pub field_errors: Vec<FieldError>,
    pub error: Option<UserFacingError>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub search: SearchBarView,
    pub list: ListPanelView,
    pub selection: SelectionView,
    pub create_form: CreateFormView,
    pub toast: Option<ToastView>,
}

impl ViewModel {
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        Self {
            search: search_bar(model),
            list: list_panel(model),
            selection: selection_panel(model),
            create_form: create_form(model),
            toast: model.toast.as_ref().map(ToastView::from),
        }
    }
}

fn search_bar(model: &Model) -> SearchBarView {
    let text = model.list.search_text();
    SearchBarView {
        text: text.to_string(),
        can_submit: !text.trim().is_empty(),
        can_clear: !text.is_empty() || !model.list.view().is_latest(),
    }
}

fn list_panel(model: &Model) -> ListPanelView {
    let list = &model.list;
    let selected = model.selection.selected_id();

    let display = match list.view() {
        ListView::Latest => ListDisplay::Latest,
        ListView::Searching { query } => ListDisplay::Searching {
            query: query.clone(),
        },
        ListView::SearchResults { query, .. } => ListDisplay::Results {
            query: query.clone(),
        },
        ListView::Empty {
            reason: EmptyReason::NoResults { query },
        } => ListDisplay::Empty {
            query: query.clone(),
            message: NO_RESULTS_MESSAGE.to_string(),
        },
        ListView::Empty {
            reason: EmptyReason::SearchFailed { query },
        } => ListDisplay::Empty {
            query: query.clone(),
            message: list
                .error()
                .map_or_else(|| NO_RESULTS_MESSAGE.to_string(), AppError::user_facing_message),
        },
    };

    let items = list
        .displayed()
        .iter()
        .map(|r| JournalListItem {
            id: r.id.to_string(),
            place: r.place().to_string(),
            date: r.date().to_string(),
            display_date: r.date().display(),
            is_selected: selected == Some(&r.id),
        })
        .collect();

    let pagination = list.view().is_latest().then(|| {
        let p = list.pagination();
        PaginationView {
            page: list.cursor(),
            total_pages: p.total_pages(),
            has_previous: list.can_go_previous(),
            has_next: list.can_go_next(),
        }
    });

    ListPanelView {
        display,
        items,
        is_loading: list.is_loading(),
        pagination,
        error: list.error().map(UserFacingError::from),
    }
}

fn selection_panel(model: &Model) -> SelectionView {
    let panel = &model.selection;
    let error = panel.error().map(UserFacingError::from);
    match panel.state() {
        SelectionState::NoSelection => SelectionView::NoSelection,
        SelectionState::Viewing { record, activity } => SelectionView::Viewing {
            journal: record.into(),
            confirming_delete: *activity == ViewActivity::ConfirmingDelete,
            is_deleting: *activity == ViewActivity::Deleting,
            error,
        },
        SelectionState::Editing { record, draft } => SelectionView::Editing {
            journal: record.into(),
            draft: draft.into(),
            is_saving: panel.is_saving(),
            field_errors: panel.field_errors().to_vec(),
            error,
        },
    }
}

fn create_form(model: &Model) -> CreateFormView {
    let form = &model.create;
    CreateFormView {
        draft: form.draft().into(),
        is_submitting: form.is_submitting(),
        field_errors: form.field_errors().to_vec(),
        error: form.error().map(UserFacingError::from),
    }
}
