use super::DashboardSettings;
use crate::components::calendar::{CalendarGridBuilder, CalendarView, MonthKey};
use crate::components::editor::{Alert, AlertKind, EditorMode, EditorState, ScheduleForm};
use crate::components::schedule::models::{FieldIssue, Schedule, ScheduleField, ScheduleId};
use crate::components::schedule::store::ScheduleStore;
use crate::utils::i18n;
use crate::utils::time::format_date;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Everything the presentation layer needs to draw one session's dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub month: MonthKey,
    pub title: String,
    pub weekdays: Vec<String>,
    pub cells: Vec<CellView>,
    pub selected_date: String,
    pub selected_schedules: Vec<ScheduleEntry>,
    pub editor: EditorView,
    pub loading: bool,
    pub alert: Option<AlertView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellView {
    pub date: String,
    pub day: u32,
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub schedule_count: usize,
    pub markers: usize,
    pub overflow: bool,
}

/// One row of the selected day's list
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub id: ScheduleId,
    pub time: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub leader: Option<String>,
    pub detail_info: Option<String>,
}

impl From<&Schedule> for ScheduleEntry {
    fn from(schedule: &Schedule) -> Self {
        Self {
            id: schedule.id.clone(),
            time: schedule.time.badge(),
            description: schedule.description.clone(),
            location: schedule.location.clone(),
            leader: schedule.leader.clone(),
            detail_info: schedule.detail_info.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub mode: EditorMode,
    pub target: Option<ScheduleId>,
    pub form: ScheduleForm,
    pub field_errors: Vec<FieldMessage>,
    pub busy: bool,
    pub alert: Option<AlertView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldMessage {
    pub field: ScheduleField,
    pub issue: FieldIssue,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertView {
    pub kind: AlertKind,
    pub message: String,
    pub detail: String,
}

impl AlertView {
    fn new(alert: &Alert, locale: &str) -> Self {
        Self {
            kind: alert.kind,
            message: alert.message(locale),
            detail: alert.detail.clone(),
        }
    }
}

impl DashboardSnapshot {
    pub(super) fn capture(
        view: &CalendarView,
        store: &ScheduleStore,
        editor: &EditorState,
        loading: bool,
        alert: Option<&Alert>,
        settings: &DashboardSettings,
        today: NaiveDate,
    ) -> Self {
        let locale = settings.locale.as_str();
        let month = view.displayed();
        let selected = view.selected();

        let cells = CalendarGridBuilder::new(settings.week_start)
            .build_with_counts(month.first_day(), today, store.index())
            .into_iter()
            .map(|cell| CellView {
                day: cell.date.day(),
                is_selected: cell.date == selected,
                markers: cell.visible_markers(settings.max_markers),
                overflow: cell.has_overflow(settings.max_markers),
                date: cell.key,
                in_month: cell.in_month,
                is_today: cell.is_today,
                schedule_count: cell.schedule_count,
            })
            .collect();

        let field_errors = editor
            .field_errors()
            .iter()
            .map(|error| FieldMessage {
                field: error.field,
                issue: error.issue,
                message: i18n::message(&error.message_key(), locale),
            })
            .collect();

        Self {
            month,
            title: i18n::month_title(locale, month.year(), month.month()),
            weekdays: i18n::weekday_labels(locale, settings.week_start),
            cells,
            selected_date: format_date(selected),
            selected_schedules: store
                .index()
                .for_date(selected)
                .iter()
                .map(ScheduleEntry::from)
                .collect(),
            editor: EditorView {
                mode: editor.mode(),
                target: editor.target().map(|schedule| schedule.id.clone()),
                form: editor.form().clone(),
                field_errors,
                busy: editor.busy(),
                alert: editor.alert().map(|alert| AlertView::new(alert, locale)),
            },
            loading,
            alert: alert.map(|alert| AlertView::new(alert, locale)),
        }
    }
}
