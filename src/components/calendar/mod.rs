pub mod grid;
pub mod month;

pub use grid::{CalendarCell, CalendarGridBuilder, DEFAULT_MAX_MARKERS};
pub use month::{CalendarView, Direction, LoadTag, MonthKey, MonthRange};
