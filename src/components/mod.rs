// Export components
pub mod calendar;
pub mod dashboard;
pub mod editor;
pub mod schedule;
pub mod session;

pub use calendar::{CalendarGridBuilder, CalendarView, MonthKey};
pub use dashboard::{DashboardHandle, DashboardRegistry, DashboardSettings};
pub use editor::ScheduleEditorController;
pub use schedule::{ScheduleIndex, ScheduleStore};
