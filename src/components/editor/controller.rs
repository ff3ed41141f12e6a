use super::state::{
    reduce, EditorAction, EditorEffect, EditorOutcome, EditorState, Failure,
};
use crate::components::schedule::models::{Schedule, ScheduleField};
use crate::components::schedule::store::ScheduleStore;
use crate::error::{CalendarResult, Error};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Perform the store call an editor transition asked for
pub async fn run_effect(
    store: &mut ScheduleStore,
    effect: EditorEffect,
) -> CalendarResult<EditorOutcome> {
    match effect {
        EditorEffect::Create(input) => store.create(&input).await.map(EditorOutcome::Saved),
        EditorEffect::Update(id, input) => {
            store.update(&id, &input).await.map(EditorOutcome::Saved)
        }
        EditorEffect::Delete(id) => {
            store.delete(&id).await?;
            Ok(EditorOutcome::Deleted(id))
        }
    }
}

/// Turn a finished store call into the action that completes it
pub fn completion(result: &CalendarResult<EditorOutcome>) -> EditorAction {
    let outcome = match result {
        Ok(outcome) => outcome.clone(),
        Err(err) => EditorOutcome::Failed(Failure::from(err)),
    };
    EditorAction::Completed(outcome)
}

/// Drives the schedule modal against a store
#[derive(Debug, Default)]
pub struct ScheduleEditorController {
    state: EditorState,
}

impl ScheduleEditorController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Apply an action and return the store call it requested
    pub fn dispatch(&mut self, action: EditorAction) -> CalendarResult<Option<EditorEffect>> {
        let transition = reduce(&self.state, action)?;
        self.state = transition.state;
        Ok(transition.effect)
    }

    pub fn open_add(&mut self, seed: Option<NaiveDate>, selected: NaiveDate) -> CalendarResult<()> {
        self.dispatch(EditorAction::OpenAdd { seed, selected })?;
        Ok(())
    }

    pub fn open_edit(&mut self, schedule: Schedule) -> CalendarResult<()> {
        self.dispatch(EditorAction::OpenEdit(schedule))?;
        Ok(())
    }

    pub fn set_field(&mut self, field: ScheduleField, value: impl Into<String>) -> CalendarResult<()> {
        self.dispatch(EditorAction::SetField(field, value.into()))?;
        Ok(())
    }

    pub fn cancel(&mut self) -> CalendarResult<()> {
        self.dispatch(EditorAction::Cancel)?;
        Ok(())
    }

    pub fn request_delete(&mut self) -> CalendarResult<()> {
        self.dispatch(EditorAction::RequestDelete)?;
        Ok(())
    }

    pub fn cancel_delete(&mut self) -> CalendarResult<()> {
        self.dispatch(EditorAction::CancelDelete)?;
        Ok(())
    }

    pub fn dismiss_alert(&mut self) -> CalendarResult<()> {
        self.dispatch(EditorAction::DismissAlert)?;
        Ok(())
    }

    /// Validate the form and save it through `store`.
    ///
    /// A form that fails validation is reported as `Error::Validation` and
    /// the modal stays open with the field errors set.
    pub async fn submit(&mut self, store: &mut ScheduleStore) -> CalendarResult<EditorOutcome> {
        match self.dispatch(EditorAction::Submit)? {
            Some(effect) => self.run(store, effect).await,
            None => {
                debug!("Schedule form rejected: {}", self.state.field_errors());
                Err(Error::Validation(self.state.field_errors().clone()))
            }
        }
    }

    /// Delete the schedule under confirmation
    pub async fn confirm_delete(&mut self, store: &mut ScheduleStore) -> CalendarResult<EditorOutcome> {
        match self.dispatch(EditorAction::ConfirmDelete)? {
            Some(effect) => self.run(store, effect).await,
            None => Err(crate::error::transition_error("nothing to delete")),
        }
    }

    async fn run(
        &mut self,
        store: &mut ScheduleStore,
        effect: EditorEffect,
    ) -> CalendarResult<EditorOutcome> {
        let result = run_effect(store, effect).await;
        if let Err(err) = &result {
            warn!("Schedule change failed: {}", err);
        }
        self.dispatch(completion(&result))?;
        result
    }
}
