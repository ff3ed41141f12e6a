pub mod actor;
pub mod handle;
pub mod registry;
pub mod snapshot;

pub use actor::{DashboardActor, DashboardActorHandle, DashboardRequest};
pub use handle::DashboardHandle;
pub use registry::DashboardRegistry;
pub use snapshot::{AlertView, CellView, DashboardSnapshot, EditorView, FieldMessage, ScheduleEntry};

use crate::components::calendar::DEFAULT_MAX_MARKERS;
use chrono::Weekday;
use chrono_tz::Tz;

/// Display settings shared by every session's dashboard
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub week_start: Weekday,
    pub max_markers: usize,
    /// Zone that decides which day is "today"
    pub timezone: Tz,
    pub locale: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
            max_markers: DEFAULT_MAX_MARKERS,
            timezone: chrono_tz::UTC,
            locale: "ko".to_string(),
        }
    }
}
