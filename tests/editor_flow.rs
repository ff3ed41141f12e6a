mod common;

use common::{date, schedule, MockScheduleRepository};
use congregation_calendar::components::editor::{
    AlertKind, EditorMode, EditorOutcome, ScheduleEditorController,
};
use congregation_calendar::components::schedule::models::{ScheduleField, ScheduleId};
use congregation_calendar::components::schedule::store::ScheduleStore;
use congregation_calendar::components::session::models::Anonymous;
use congregation_calendar::error::Error;
use std::sync::Arc;

async fn setup(repo: &Arc<MockScheduleRepository>) -> ScheduleStore {
    let mut store = ScheduleStore::new(repo.clone(), Arc::new(Anonymous));
    store.load_month(date(2024, 3, 1), date(2024, 3, 31)).await.unwrap();
    store
}

#[tokio::test]
async fn test_add_with_seed_date_and_empty_time() {
    let repo = Arc::new(MockScheduleRepository::new());
    let mut store = setup(&repo).await;
    let mut editor = ScheduleEditorController::new();

    editor.open_add(Some(date(2024, 3, 21)), date(2024, 3, 1)).unwrap();
    assert_eq!(editor.state().form().date, "2024-03-21");
    editor.set_field(ScheduleField::Description, "Meeting").unwrap();
    editor.set_field(ScheduleField::Time, "").unwrap();

    let outcome = editor.submit(&mut store).await.unwrap();

    let EditorOutcome::Saved(saved) = outcome else {
        panic!("expected a saved schedule");
    };
    assert_eq!(saved.date, date(2024, 3, 21));
    assert!(!saved.time.is_specified());
    assert_eq!(editor.state().mode(), EditorMode::Closed);
    assert_eq!(repo.insert_calls(), 1);
}

#[tokio::test]
async fn test_invalid_submission_stays_open_without_remote_call() {
    let repo = Arc::new(MockScheduleRepository::new());
    let mut store = setup(&repo).await;
    let mut editor = ScheduleEditorController::new();

    editor.open_add(None, date(2024, 3, 21)).unwrap();
    editor.set_field(ScheduleField::Description, "Meeting").unwrap();
    editor.set_field(ScheduleField::Time, "noon").unwrap();

    let err = editor.submit(&mut store).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(editor.state().mode(), EditorMode::Adding);
    assert!(editor.state().field_errors().get(ScheduleField::Time).is_some());
    assert_eq!(editor.state().form().description, "Meeting");
    assert_eq!(repo.insert_calls(), 0);
}

#[tokio::test]
async fn test_failed_save_keeps_form_and_shows_alert() {
    let repo = Arc::new(MockScheduleRepository::with_schedules(vec![schedule(
        "s1",
        date(2024, 3, 21),
        "14:00",
        "Meeting",
    )]));
    let mut store = setup(&repo).await;
    let mut editor = ScheduleEditorController::new();

    let target = store.get(&ScheduleId::new("s1")).cloned().unwrap();
    editor.open_edit(target).unwrap();
    assert_eq!(editor.state().form().time, "14:00");
    editor.set_field(ScheduleField::Location, "Main hall").unwrap();

    repo.fail_writes(true);
    let err = editor.submit(&mut store).await.unwrap_err();

    assert!(matches!(err, Error::Remote(_)));
    let state = editor.state();
    assert_eq!(state.mode(), EditorMode::Editing);
    assert!(!state.busy());
    assert_eq!(state.form().location, "Main hall");
    assert_eq!(state.alert().map(|a| a.kind), Some(AlertKind::Remote));
    assert_eq!(store.get(&ScheduleId::new("s1")).unwrap().location, None);

    repo.fail_writes(false);
    editor.dismiss_alert().unwrap();
    editor.submit(&mut store).await.unwrap();
    assert_eq!(
        store.get(&ScheduleId::new("s1")).unwrap().location.as_deref(),
        Some("Main hall")
    );
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let repo = Arc::new(MockScheduleRepository::with_schedules(vec![schedule(
        "s1",
        date(2024, 3, 21),
        "",
        "Meeting",
    )]));
    let mut store = setup(&repo).await;
    let mut editor = ScheduleEditorController::new();

    editor
        .open_edit(store.get(&ScheduleId::new("s1")).cloned().unwrap())
        .unwrap();
    assert!(editor.confirm_delete(&mut store).await.is_err());
    assert_eq!(repo.delete_calls(), 0);

    editor.request_delete().unwrap();
    editor.cancel_delete().unwrap();
    assert_eq!(editor.state().mode(), EditorMode::Editing);

    editor.request_delete().unwrap();
    editor.confirm_delete(&mut store).await.unwrap();
    assert_eq!(editor.state().mode(), EditorMode::Closed);
    assert!(store.schedules().is_empty());
}

#[tokio::test]
async fn test_failed_delete_returns_to_editing() {
    let repo = Arc::new(MockScheduleRepository::with_schedules(vec![schedule(
        "s1",
        date(2024, 3, 21),
        "",
        "Meeting",
    )]));
    let mut store = setup(&repo).await;
    let mut editor = ScheduleEditorController::new();

    editor
        .open_edit(store.get(&ScheduleId::new("s1")).cloned().unwrap())
        .unwrap();
    editor.request_delete().unwrap();
    repo.fail_writes(true);

    let err = editor.confirm_delete(&mut store).await.unwrap_err();
    assert!(matches!(err, Error::Remote(_)));
    assert_eq!(editor.state().mode(), EditorMode::Editing);
    assert_eq!(editor.state().alert().map(|a| a.kind), Some(AlertKind::Remote));
    assert!(store.contains(&ScheduleId::new("s1")));
}

#[tokio::test]
async fn test_cancel_discards_changes() {
    let repo = Arc::new(MockScheduleRepository::new());
    let mut store = setup(&repo).await;
    let mut editor = ScheduleEditorController::new();

    editor.open_add(None, date(2024, 3, 21)).unwrap();
    editor.set_field(ScheduleField::Description, "Meeting").unwrap();
    editor.cancel().unwrap();

    assert_eq!(editor.state().mode(), EditorMode::Closed);
    assert!(editor.submit(&mut store).await.is_err());
    assert_eq!(repo.insert_calls(), 0);
}
