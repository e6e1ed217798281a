use crux_core::testing::AppTester;
use wildlife_journal::gateway::{GatewayRequest, JournalPage};
use wildlife_journal::record::JournalDate;
use wildlife_journal::selection::SelectionState;
use wildlife_journal::view::SelectionView;
use wildlife_journal::{
    App, AppError, DraftEdit, DraftTarget, Effect, Event, JournalEntry, JournalRecord, Model,
};

fn heron_entry() -> JournalEntry {
    JournalEntry::new(
        JournalDate::parse("2024-03-12").unwrap(),
        "Lake Meadow",
        [("Heron", 2)].into_iter().collect(),
        "Foggy morning",
    )
    .unwrap()
}

fn latest_loaded(request: &GatewayRequest, records: Vec<JournalRecord>, total: u64) -> Event {
    let GatewayRequest::ListLatest { ticket, page, .. } = request else {
        panic!("expected a page request, got {request:?}");
    };
    Event::LatestLoaded {
        ticket: *ticket,
        page: *page,
        result: Box::new(Ok(JournalPage {
            records,
            total_count: Some(total),
        })),
    }
}

fn edit(target: DraftTarget, edit: DraftEdit) -> Event {
    Event::DraftEdited { target, edit }
}

#[test]
fn mount_requests_first_page_and_renders() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::Mounted, &mut model);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));

    let url = update
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::Http(request) => Some(request.operation.url.clone()),
            Effect::Render(_) => None,
        })
        .expect("mount should fetch the latest page");
    assert_eq!(url, "http://localhost:8000/journals?page=1&size=10");
}

#[test]
fn blank_create_issues_no_request() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::CreateSubmitted, &mut model);
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
    assert_eq!(app.view(&model).create_form.field_errors.len(), 2);
}

#[test]
fn created_journal_appears_in_latest_page() {
    let mut model = Model::default();
    let mount = model.apply(Event::Mounted);
    model.apply(latest_loaded(&mount[0], Vec::new(), 0));

    for e in [
        edit(DraftTarget::Create, DraftEdit::SetDate { value: "2024-03-12".into() }),
        edit(DraftTarget::Create, DraftEdit::SetPlace { value: "Lake Meadow".into() }),
        edit(
            DraftTarget::Create,
            DraftEdit::AddSpecies {
                name: "Heron".into(),
                count: 2,
            },
        ),
        edit(DraftTarget::Create, DraftEdit::SetNotes { value: "Foggy morning".into() }),
    ] {
        assert!(model.apply(e).is_empty());
    }

    let requests = model.apply(Event::CreateSubmitted);
    let [GatewayRequest::Create { ticket, entry }] = &requests[..] else {
        panic!("expected one create request, got {requests:?}");
    };
    assert_eq!(entry, &heron_entry());

    // The backend echoes the entry back with its new id.
    let created = entry.clone().with_id("j1".into());
    let refresh = model.apply(Event::JournalCreated {
        ticket: *ticket,
        result: Box::new(Ok(created.clone())),
    });
    assert!(matches!(
        refresh[..],
        [GatewayRequest::ListLatest { page: 1, page_size: 10, .. }]
    ));

    model.apply(latest_loaded(&refresh[0], vec![created.clone()], 1));
    let listed = model.list.find_displayed(&"j1".into()).expect("j1 should be listed");
    assert_eq!(listed, &created);
    assert_eq!(listed.species().get("Heron"), Some(2));
}

#[test]
fn edit_save_refreshes_current_view_and_keeps_selection() {
    let original = heron_entry().with_id("j1".into());
    let mut model = Model::default();
    let mount = model.apply(Event::Mounted);
    model.apply(latest_loaded(&mount[0], vec![original.clone()], 1));

    model.apply(Event::JournalSelected { id: "j1".into() });
    model.apply(Event::EditRequested);
    model.apply(edit(
        DraftTarget::Edit,
        DraftEdit::RenameSpecies {
            from: "Heron".into(),
            to: "Grey Heron".into(),
        },
    ));

    let requests = model.apply(Event::EditSaved);
    let [GatewayRequest::Update { ticket, record }] = &requests[..] else {
        panic!("expected one update request, got {requests:?}");
    };
    assert_eq!(record.species().get("Grey Heron"), Some(2));
    assert!(model.apply(Event::EditSaved).is_empty());

    let refresh = model.apply(Event::JournalUpdated {
        ticket: *ticket,
        id: record.id.clone(),
        result: Box::new(Ok(record.clone())),
    });
    assert_eq!(refresh.len(), 1);
    assert!(matches!(
        model.selection.state(),
        SelectionState::Viewing { record, .. } if record.species().contains("Grey Heron")
    ));

    model.apply(latest_loaded(&refresh[0], vec![record.clone()], 1));
    assert_eq!(model.selection.selected_id(), Some(&"j1".into()));
}

#[test]
fn failed_save_keeps_draft_and_shows_error_on_card() {
    let app = AppTester::<App, Effect>::default();
    let original = heron_entry().with_id("j1".into());
    let mut model = Model::default();
    let mount = model.apply(Event::Mounted);
    model.apply(latest_loaded(&mount[0], vec![original], 1));

    model.apply(Event::JournalSelected { id: "j1".into() });
    model.apply(Event::EditRequested);
    model.apply(edit(DraftTarget::Edit, DraftEdit::SetPlace { value: "Pond".into() }));
    let requests = model.apply(Event::EditSaved);
    model.apply(requests[0].clone().fail(AppError::from_http_status(404, None)));

    let SelectionView::Editing { draft, error, .. } = app.view(&model).selection else {
        panic!("expected the panel to stay in edit mode");
    };
    assert_eq!(draft.place, "Pond");
    assert_eq!(error.map(|e| e.error_code), Some("NOT_FOUND".to_string()));
}

#[test]
fn delete_flow_through_app_issues_delete_request() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let mount = model.apply(Event::Mounted);
    model.apply(latest_loaded(&mount[0], vec![heron_entry().with_id("j1".into())], 1));

    app.update(Event::JournalSelected { id: "j1".into() }, &mut model);
    let update = app.update(Event::DeleteRequested, &mut model);
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Http(_))));

    let update = app.update(Event::DeleteConfirmed, &mut model);
    let method = update.effects.iter().find_map(|e| match e {
        Effect::Http(request) => Some(request.operation.method.clone()),
        Effect::Render(_) => None,
    });
    assert_eq!(method.as_deref(), Some("DELETE"));
    assert!(matches!(
        app.view(&model).selection,
        SelectionView::Viewing { is_deleting: true, .. }
    ));
}
