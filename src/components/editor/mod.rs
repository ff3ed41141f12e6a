pub mod controller;
pub mod state;

pub use controller::{completion, run_effect, ScheduleEditorController};
pub use state::{
    reduce, Alert, AlertKind, EditorAction, EditorEffect, EditorMode, EditorOutcome, EditorState,
    Failure, ScheduleForm, Transition,
};
