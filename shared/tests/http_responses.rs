use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use serde_json::json;
use wildlife_journal::view::{ListDisplay, SelectionView};
use wildlife_journal::{App, DraftEdit, DraftTarget, Effect, Event, Model};

fn http_request(update: Update<Effect, Event>) -> Request<HttpRequest> {
    update
        .into_effects()
        .find_map(|e| match e {
            Effect::Http(request) => Some(request),
            Effect::Render(_) => None,
        })
        .expect("expected an HTTP effect")
}

/// Answers `request` and runs the resulting events through the app.
fn respond(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    mut request: Request<HttpRequest>,
    response: HttpResponse,
) -> Vec<Update<Effect, Event>> {
    let update = app
        .resolve(&mut request, HttpResult::Ok(response))
        .expect("request should resolve");
    update
        .events
        .into_iter()
        .map(|event| app.update(event, model))
        .collect()
}

fn entry_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "date": "2024-03-12",
        "place": "Lake Meadow",
        "species_observed": {"Heron": 2},
        "notes": "Foggy morning",
    })
}

fn mounted(app: &AppTester<App, Effect>, model: &mut Model) {
    let request = http_request(app.update(Event::Mounted, model));
    respond(
        app,
        model,
        request,
        HttpResponse::ok()
            .json(json!({"journals": [entry_json("j1")], "totalCount": 1}))
            .build(),
    );
}

#[test]
fn paged_response_fills_the_latest_list() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let request = http_request(app.update(Event::Mounted, &mut model));
    assert_eq!(request.operation.method, "GET");
    respond(
        &app,
        &mut model,
        request,
        HttpResponse::ok()
            .json(json!({"journals": [entry_json("j1"), entry_json("j2")], "totalCount": 25}))
            .build(),
    );

    let view = app.view(&model);
    assert_eq!(view.list.display, ListDisplay::Latest);
    assert_eq!(view.list.items.len(), 2);
    assert_eq!(view.list.items[0].display_date, "12 Mar 2024");
    let pagination = view.list.pagination.expect("latest view is paginated");
    assert_eq!(pagination.total_pages, Some(3));
    assert!(pagination.has_next);
    assert!(view.list.error.is_none());
}

#[test]
fn bare_array_response_leaves_total_unknown() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let request = http_request(app.update(Event::Mounted, &mut model));
    respond(
        &app,
        &mut model,
        request,
        HttpResponse::ok().json(json!([entry_json("a")])).build(),
    );

    let view = app.view(&model);
    assert_eq!(view.list.items.len(), 1);
    assert_eq!(view.list.items[0].id, "a");
    let pagination = view.list.pagination.expect("latest view is paginated");
    assert_eq!(pagination.total_pages, None);
    assert!(!pagination.has_next);
}

#[test]
fn page_error_detail_reaches_the_list() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let request = http_request(app.update(Event::Mounted, &mut model));
    respond(
        &app,
        &mut model,
        request,
        HttpResponse::status(422)
            .json(json!({"detail": "size must be at most 100"}))
            .build(),
    );

    let error = app.view(&model).list.error.expect("the failure should be shown");
    assert_eq!(error.error_code, "VALIDATION_ERROR");
    assert_eq!(error.message, "size must be at most 100");
}

#[test]
fn delete_not_found_keeps_the_selection_with_an_error() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    mounted(&app, &mut model);

    app.update(Event::JournalSelected { id: "j1".into() }, &mut model);
    app.update(Event::DeleteRequested, &mut model);
    let request = http_request(app.update(Event::DeleteConfirmed, &mut model));
    assert_eq!(request.operation.method, "DELETE");
    assert_eq!(request.operation.url, "http://localhost:8000/journals/j1");

    let follow_ups = respond(
        &app,
        &mut model,
        request,
        HttpResponse::status(404)
            .json(json!({"detail": "Journal not found"}))
            .build(),
    );
    assert!(follow_ups
        .iter()
        .all(|u| !u.effects.iter().any(|e| matches!(e, Effect::Http(_)))));

    let view = app.view(&model);
    let SelectionView::Viewing {
        journal,
        is_deleting,
        error,
        ..
    } = view.selection
    else {
        panic!("expected the record to stay selected");
    };
    assert_eq!(journal.id, "j1");
    assert!(!is_deleting);
    assert_eq!(error.map(|e| e.error_code), Some("NOT_FOUND".to_string()));
    assert_eq!(view.list.items.len(), 1);
}

#[test]
fn rejected_save_shows_backend_detail_and_keeps_draft() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    mounted(&app, &mut model);

    app.update(Event::JournalSelected { id: "j1".into() }, &mut model);
    app.update(Event::EditRequested, &mut model);
    app.update(
        Event::DraftEdited {
            target: DraftTarget::Edit,
            edit: DraftEdit::SetNotes {
                value: "Clear skies".into(),
            },
        },
        &mut model,
    );
    let request = http_request(app.update(Event::EditSaved, &mut model));
    assert_eq!(request.operation.method, "PUT");
    assert_eq!(request.operation.url, "http://localhost:8000/journals/j1");
    let body: serde_json::Value =
        serde_json::from_slice(&request.operation.body).expect("body is JSON");
    assert_eq!(body["notes"], "Clear skies");

    respond(
        &app,
        &mut model,
        request,
        HttpResponse::status(422)
            .json(json!({"detail": "date must not be in the future"}))
            .build(),
    );

    let SelectionView::Editing {
        draft,
        is_saving,
        error,
        ..
    } = app.view(&model).selection
    else {
        panic!("expected the panel to stay in edit mode");
    };
    assert!(!is_saving);
    assert_eq!(draft.notes, "Clear skies");
    let error = error.expect("the failure should be shown");
    assert_eq!(error.error_code, "VALIDATION_ERROR");
    assert_eq!(error.message, "date must not be in the future");
}
