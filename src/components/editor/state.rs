use crate::components::schedule::models::{
    FieldError, FieldErrors, Schedule, ScheduleField, ScheduleId, ScheduleInput, ScheduleTime,
};
use crate::error::{transition_error, CalendarResult, Error};
use crate::utils::i18n;
use crate::utils::time::{format_date, parse_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    #[default]
    Closed,
    Adding,
    Editing,
    ConfirmingDelete,
}

impl EditorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorMode::Closed => "closed",
            EditorMode::Adding => "adding",
            EditorMode::Editing => "editing",
            EditorMode::ConfirmingDelete => "confirming_delete",
        }
    }
}

/// Raw form values as typed by the member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleForm {
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub leader: String,
    pub detail_info: String,
}

impl ScheduleForm {
    /// Empty form seeded with a date
    pub fn blank(date: NaiveDate) -> Self {
        Self {
            date: format_date(date),
            ..Default::default()
        }
    }

    /// Form pre-filled from an existing schedule
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            description: schedule.description.clone(),
            date: format_date(schedule.date),
            time: schedule.time.badge().unwrap_or_default(),
            location: schedule.location.clone().unwrap_or_default(),
            leader: schedule.leader.clone().unwrap_or_default(),
            detail_info: schedule.detail_info.clone().unwrap_or_default(),
        }
    }

    pub fn get(&self, field: ScheduleField) -> &str {
        match field {
            ScheduleField::Description => &self.description,
            ScheduleField::Date => &self.date,
            ScheduleField::Time => &self.time,
            ScheduleField::Location => &self.location,
            ScheduleField::Leader => &self.leader,
            ScheduleField::DetailInfo => &self.detail_info,
        }
    }

    pub fn set(&mut self, field: ScheduleField, value: String) {
        match field {
            ScheduleField::Description => self.description = value,
            ScheduleField::Date => self.date = value,
            ScheduleField::Time => self.time = value,
            ScheduleField::Location => self.location = value,
            ScheduleField::Leader => self.leader = value,
            ScheduleField::DetailInfo => self.detail_info = value,
        }
    }

    /// Parse the form into store input, collecting every field problem
    pub fn to_input(&self) -> Result<ScheduleInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.description.trim().is_empty() {
            errors.push(FieldError::required(ScheduleField::Description));
        }

        let date = if self.date.trim().is_empty() {
            errors.push(FieldError::required(ScheduleField::Date));
            None
        } else {
            let parsed = parse_date(&self.date);
            if parsed.is_none() {
                errors.push(FieldError::invalid(ScheduleField::Date));
            }
            parsed
        };

        let time = match ScheduleTime::parse(&self.time) {
            Some(time) => time.as_time(),
            None => {
                errors.push(FieldError::invalid(ScheduleField::Time));
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ScheduleInput {
            description: self.description.clone(),
            date,
            time,
            location: Some(self.location.clone()),
            leader: Some(self.leader.clone()),
            detail_info: Some(self.detail_info.clone()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    NotFound,
    Remote,
    Load,
    Other,
}

/// Message shown to the member after a failed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub detail: String,
}

impl Alert {
    pub fn from_error(err: &Error) -> Self {
        let kind = match err {
            Error::NotFound(_) => AlertKind::NotFound,
            Error::Remote(_) => AlertKind::Remote,
            Error::Load(_) => AlertKind::Load,
            _ => AlertKind::Other,
        };
        Self {
            kind,
            detail: err.to_string(),
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self.kind {
            AlertKind::NotFound => "alert.not_found",
            AlertKind::Remote => "alert.remote",
            AlertKind::Load => "alert.load",
            AlertKind::Other => "alert.generic",
        }
    }

    pub fn message(&self, locale: &str) -> String {
        i18n::message(self.message_key(), locale)
    }
}

/// How a failed save or delete is reported back to the form
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    Fields(FieldErrors),
    Alert(Alert),
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        match err {
            Error::Validation(errors) => Failure::Fields(errors.clone()),
            other => Failure::Alert(Alert::from_error(other)),
        }
    }
}

/// Result of a save or delete once the store has answered
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    Saved(Schedule),
    Deleted(ScheduleId),
    Failed(Failure),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    OpenAdd {
        seed: Option<NaiveDate>,
        selected: NaiveDate,
    },
    OpenEdit(Schedule),
    SetField(ScheduleField, String),
    Submit,
    Cancel,
    RequestDelete,
    CancelDelete,
    ConfirmDelete,
    Completed(EditorOutcome),
    DismissAlert,
}

impl EditorAction {
    fn name(&self) -> &'static str {
        match self {
            EditorAction::OpenAdd { .. } => "open_add",
            EditorAction::OpenEdit(_) => "open_edit",
            EditorAction::SetField(..) => "set_field",
            EditorAction::Submit => "submit",
            EditorAction::Cancel => "cancel",
            EditorAction::RequestDelete => "request_delete",
            EditorAction::CancelDelete => "cancel_delete",
            EditorAction::ConfirmDelete => "confirm_delete",
            EditorAction::Completed(_) => "completed",
            EditorAction::DismissAlert => "dismiss_alert",
        }
    }
}

/// Store call requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEffect {
    Create(ScheduleInput),
    Update(ScheduleId, ScheduleInput),
    Delete(ScheduleId),
}

/// Complete state of the schedule modal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    mode: EditorMode,
    target: Option<Schedule>,
    form: ScheduleForm,
    field_errors: FieldErrors,
    busy: bool,
    alert: Option<Alert>,
}

impl EditorState {
    fn adding(date: NaiveDate) -> Self {
        Self {
            mode: EditorMode::Adding,
            form: ScheduleForm::blank(date),
            ..Default::default()
        }
    }

    fn editing(schedule: Schedule) -> Self {
        Self {
            mode: EditorMode::Editing,
            form: ScheduleForm::from_schedule(&schedule),
            target: Some(schedule),
            ..Default::default()
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != EditorMode::Closed
    }

    /// Schedule being edited, if any
    pub fn target(&self) -> Option<&Schedule> {
        self.target.as_ref()
    }

    pub fn form(&self) -> &ScheduleForm {
        &self.form
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Localized inline message for a field
    pub fn field_message(&self, field: ScheduleField, locale: &str) -> Option<String> {
        self.field_errors
            .get(field)
            .map(|error| i18n::message(&error.message_key(), locale))
    }
}

/// New state and the store call to make, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: EditorState,
    pub effect: Option<EditorEffect>,
}

impl Transition {
    fn to(state: EditorState) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

/// Apply one action to the editor.
///
/// Rejected actions return an error and leave `state` as it was. A submit
/// that fails validation is not rejected: the returned state carries the
/// field errors and no effect.
pub fn reduce(state: &EditorState, action: EditorAction) -> CalendarResult<Transition> {
    use EditorAction as A;
    use EditorMode as M;

    if state.busy && !matches!(action, A::Completed(_) | A::DismissAlert) {
        return Err(Error::Busy);
    }

    let mut next = state.clone();
    let transition = match (state.mode, action) {
        (M::Closed, A::OpenAdd { seed, selected }) => {
            Transition::to(EditorState::adding(seed.unwrap_or(selected)))
        }
        (M::Closed, A::OpenEdit(schedule)) => Transition::to(EditorState::editing(schedule)),
        (M::Adding | M::Editing, A::SetField(field, value)) => {
            next.form.set(field, value);
            next.field_errors.clear_field(field);
            Transition::to(next)
        }
        (M::Adding | M::Editing, A::Submit) => match state.form.to_input() {
            Err(errors) => {
                next.field_errors = errors;
                Transition::to(next)
            }
            Ok(input) => {
                let effect = match (state.mode, &state.target) {
                    (M::Editing, Some(target)) => EditorEffect::Update(target.id.clone(), input),
                    (M::Editing, None) => return Err(transition_error("editing without a target")),
                    _ => EditorEffect::Create(input),
                };
                next.field_errors = FieldErrors::new();
                next.alert = None;
                next.busy = true;
                Transition {
                    state: next,
                    effect: Some(effect),
                }
            }
        },
        (M::Adding | M::Editing, A::Cancel) => Transition::to(EditorState::default()),
        (M::Editing, A::RequestDelete) => {
            next.mode = M::ConfirmingDelete;
            Transition::to(next)
        }
        (M::ConfirmingDelete, A::CancelDelete) => {
            next.mode = M::Editing;
            Transition::to(next)
        }
        (M::ConfirmingDelete, A::ConfirmDelete) => {
            let id = state
                .target
                .as_ref()
                .map(|target| target.id.clone())
                .ok_or_else(|| transition_error("nothing to delete"))?;
            next.alert = None;
            next.busy = true;
            Transition {
                state: next,
                effect: Some(EditorEffect::Delete(id)),
            }
        }
        (_, A::Completed(outcome)) => {
            if !state.busy {
                return Err(transition_error("no save or delete in flight"));
            }
            next.busy = false;
            match outcome {
                EditorOutcome::Saved(_) | EditorOutcome::Deleted(_) => {
                    Transition::to(EditorState::default())
                }
                EditorOutcome::Failed(failure) => {
                    match failure {
                        Failure::Fields(errors) => next.field_errors = errors,
                        Failure::Alert(alert) => next.alert = Some(alert),
                    }
                    if next.mode == M::ConfirmingDelete {
                        next.mode = M::Editing;
                    }
                    Transition::to(next)
                }
            }
        }
        (_, A::DismissAlert) => {
            next.alert = None;
            Transition::to(next)
        }
        (mode, action) => {
            return Err(transition_error(&format!(
                "{} is not allowed while {}",
                action.name(),
                mode.as_str()
            )))
        }
    };

    Ok(transition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::schedule::models::FieldIssue;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule() -> Schedule {
        let now = Utc::now();
        Schedule {
            id: ScheduleId::new("s1"),
            date: date(2024, 3, 21),
            time: ScheduleTime::parse("14:00").unwrap(),
            description: "Meeting".to_string(),
            location: Some("Hall".to_string()),
            leader: None,
            detail_info: None,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        }
    }

    fn apply(state: &EditorState, action: EditorAction) -> Transition {
        reduce(state, action).unwrap()
    }

    fn open_add(seed: Option<NaiveDate>) -> EditorState {
        apply(
            &EditorState::default(),
            EditorAction::OpenAdd {
                seed,
                selected: date(2024, 3, 10),
            },
        )
        .state
    }

    #[test]
    fn test_open_add_uses_seed_or_selected_date() {
        assert_eq!(open_add(None).form().date, "2024-03-10");
        let seeded = open_add(Some(date(2024, 3, 21)));
        assert_eq!(seeded.mode(), EditorMode::Adding);
        assert_eq!(seeded.form().date, "2024-03-21");
        assert!(seeded.form().description.is_empty());
    }

    #[test]
    fn test_open_edit_prefills_form() {
        let state = apply(&EditorState::default(), EditorAction::OpenEdit(schedule())).state;
        assert_eq!(state.mode(), EditorMode::Editing);
        assert_eq!(state.form().description, "Meeting");
        assert_eq!(state.form().time, "14:00");
        assert_eq!(state.form().location, "Hall");
        assert_eq!(state.form().leader, "");
        assert_eq!(state.target().map(|s| s.id.as_str()), Some("s1"));
    }

    #[test]
    fn test_submit_with_empty_description_stays_open() {
        let state = open_add(None);
        let transition = apply(&state, EditorAction::Submit);

        assert!(transition.effect.is_none());
        assert_eq!(transition.state.mode(), EditorMode::Adding);
        assert!(!transition.state.busy());
        let error = transition
            .state
            .field_errors()
            .get(ScheduleField::Description)
            .unwrap();
        assert_eq!(error.issue, FieldIssue::Required);
    }

    #[test]
    fn test_submit_rejects_bad_time_and_missing_date() {
        let state = open_add(None);
        let state = apply(&state, EditorAction::SetField(ScheduleField::Description, "Meeting".into())).state;
        let state = apply(&state, EditorAction::SetField(ScheduleField::Date, "".into())).state;
        let state = apply(&state, EditorAction::SetField(ScheduleField::Time, "25:99".into())).state;

        let transition = apply(&state, EditorAction::Submit);
        assert!(transition.effect.is_none());
        let errors = transition.state.field_errors();
        assert_eq!(errors.get(ScheduleField::Date).unwrap().issue, FieldIssue::Required);
        assert_eq!(errors.get(ScheduleField::Time).unwrap().issue, FieldIssue::Invalid);
        assert!(errors.get(ScheduleField::Description).is_none());
    }

    #[test]
    fn test_editing_a_field_clears_its_error() {
        let state = apply(&open_add(None), EditorAction::Submit).state;
        assert!(!state.field_errors().is_empty());

        let state = apply(
            &state,
            EditorAction::SetField(ScheduleField::Description, "Meeting".into()),
        )
        .state;
        assert!(state.field_errors().is_empty());
    }

    #[test]
    fn test_submit_add_emits_create_and_sets_busy() {
        let state = open_add(Some(date(2024, 3, 21)));
        let state = apply(&state, EditorAction::SetField(ScheduleField::Description, "Meeting".into())).state;
        let transition = apply(&state, EditorAction::Submit);

        assert!(transition.state.busy());
        match transition.effect {
            Some(EditorEffect::Create(input)) => {
                assert_eq!(input.description, "Meeting");
                assert_eq!(input.date, Some(date(2024, 3, 21)));
                assert_eq!(input.time, None);
            }
            other => panic!("unexpected effect: {:?}", other),
        }
    }

    #[test]
    fn test_busy_rejects_reentrant_submit() {
        let state = open_add(Some(date(2024, 3, 21)));
        let state = apply(&state, EditorAction::SetField(ScheduleField::Description, "Meeting".into())).state;
        let busy = apply(&state, EditorAction::Submit).state;

        assert!(matches!(reduce(&busy, EditorAction::Submit), Err(Error::Busy)));
        assert!(matches!(reduce(&busy, EditorAction::Cancel), Err(Error::Busy)));
        assert!(matches!(
            reduce(&busy, EditorAction::SetField(ScheduleField::Description, "x".into())),
            Err(Error::Busy)
        ));
    }

    #[test]
    fn test_successful_save_closes() {
        let state = open_add(Some(date(2024, 3, 21)));
        let state = apply(&state, EditorAction::SetField(ScheduleField::Description, "Meeting".into())).state;
        let busy = apply(&state, EditorAction::Submit).state;

        let closed = apply(&busy, EditorAction::Completed(EditorOutcome::Saved(schedule()))).state;
        assert_eq!(closed, EditorState::default());
    }

    #[test]
    fn test_failed_save_keeps_fields_and_sets_alert() {
        let state = apply(&EditorState::default(), EditorAction::OpenEdit(schedule())).state;
        let state = apply(&state, EditorAction::SetField(ScheduleField::Description, "Renamed".into())).state;
        let transition = apply(&state, EditorAction::Submit);
        assert!(matches!(transition.effect, Some(EditorEffect::Update(ref id, _)) if id.as_str() == "s1"));

        let failure = Failure::from(&Error::Remote("timeout".into()));
        let failed = apply(&transition.state, EditorAction::Completed(EditorOutcome::Failed(failure))).state;

        assert_eq!(failed.mode(), EditorMode::Editing);
        assert!(!failed.busy());
        assert_eq!(failed.form().description, "Renamed");
        assert_eq!(failed.alert().map(|a| a.kind), Some(AlertKind::Remote));

        let dismissed = apply(&failed, EditorAction::DismissAlert).state;
        assert!(dismissed.alert().is_none());
    }

    #[test]
    fn test_delete_confirmation_flow() {
        let editing = apply(&EditorState::default(), EditorAction::OpenEdit(schedule())).state;
        let confirming = apply(&editing, EditorAction::RequestDelete).state;
        assert_eq!(confirming.mode(), EditorMode::ConfirmingDelete);

        let back = apply(&confirming, EditorAction::CancelDelete).state;
        assert_eq!(back.mode(), EditorMode::Editing);

        let confirming = apply(&back, EditorAction::RequestDelete).state;
        let transition = apply(&confirming, EditorAction::ConfirmDelete);
        assert!(transition.state.busy());
        assert_eq!(
            transition.effect,
            Some(EditorEffect::Delete(ScheduleId::new("s1")))
        );

        let closed = apply(
            &transition.state,
            EditorAction::Completed(EditorOutcome::Deleted(ScheduleId::new("s1"))),
        )
        .state;
        assert_eq!(closed.mode(), EditorMode::Closed);
    }

    #[test]
    fn test_failed_delete_returns_to_editing() {
        let editing = apply(&EditorState::default(), EditorAction::OpenEdit(schedule())).state;
        let confirming = apply(&editing, EditorAction::RequestDelete).state;
        let busy = apply(&confirming, EditorAction::ConfirmDelete).state;

        let failure = Failure::from(&Error::NotFound("s1".into()));
        let failed = apply(&busy, EditorAction::Completed(EditorOutcome::Failed(failure))).state;
        assert_eq!(failed.mode(), EditorMode::Editing);
        assert_eq!(failed.alert().map(|a| a.kind), Some(AlertKind::NotFound));
        assert_eq!(failed.form(), editing.form());
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let closed = EditorState::default();
        assert!(matches!(
            reduce(&closed, EditorAction::Submit),
            Err(Error::InvalidTransition(_))
        ));
        assert!(matches!(
            reduce(&open_add(None), EditorAction::RequestDelete),
            Err(Error::InvalidTransition(_))
        ));
        assert!(matches!(
            reduce(&open_add(None), EditorAction::OpenEdit(schedule())),
            Err(Error::InvalidTransition(_))
        ));
        assert!(matches!(
            reduce(&open_add(None), EditorAction::Completed(EditorOutcome::Saved(schedule()))),
            Err(Error::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_cancel_closes_without_effect() {
        let transition = apply(&open_add(None), EditorAction::Cancel);
        assert_eq!(transition.state.mode(), EditorMode::Closed);
        assert!(transition.effect.is_none());
    }
}
