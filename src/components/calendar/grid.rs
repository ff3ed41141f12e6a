use crate::components::schedule::index::ScheduleIndex;
use crate::utils::time::{days_into_week, format_date, month_bounds};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

/// Default number of schedule markers shown in one cell
pub const DEFAULT_MAX_MARKERS: usize = 5;

/// One day in the month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    /// Canonical YYYY-MM-DD key used for selection
    pub key: String,
    pub in_month: bool,
    pub is_today: bool,
    pub schedule_count: usize,
}

impl CalendarCell {
    /// Markers to draw, capped at `max_markers`
    pub fn visible_markers(&self, max_markers: usize) -> usize {
        self.schedule_count.min(max_markers)
    }

    /// Whether more schedules exist than markers are drawn
    pub fn has_overflow(&self, max_markers: usize) -> bool {
        self.schedule_count > max_markers
    }
}

/// Builds the weeks covering a calendar month
#[derive(Debug, Clone, Copy)]
pub struct CalendarGridBuilder {
    week_start: Weekday,
}

impl Default for CalendarGridBuilder {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
        }
    }
}

impl CalendarGridBuilder {
    pub fn new(week_start: Weekday) -> Self {
        Self { week_start }
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Cells from the start of the week holding the first of the month to
    /// the end of the week holding its last day.
    ///
    /// Always a whole number of weeks. `today` is passed in rather than read
    /// from the clock so the result depends only on the arguments.
    pub fn build(&self, reference: NaiveDate, today: NaiveDate) -> Vec<CalendarCell> {
        let (first, last) = month_bounds(reference);
        let start = first - Duration::days(days_into_week(first, self.week_start) as i64);
        let end = last + Duration::days(6 - days_into_week(last, self.week_start) as i64);

        let mut cells = Vec::with_capacity(42);
        let mut day = start;
        while day <= end {
            cells.push(CalendarCell {
                date: day,
                key: format_date(day),
                in_month: day.year() == reference.year() && day.month() == reference.month(),
                is_today: day == today,
                schedule_count: 0,
            });
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        cells
    }

    /// Cells annotated with schedule counts from `index`
    pub fn build_with_counts(
        &self,
        reference: NaiveDate,
        today: NaiveDate,
        index: &ScheduleIndex,
    ) -> Vec<CalendarCell> {
        let mut cells = self.build(reference, today);
        annotate(&mut cells, index);
        cells
    }
}

/// Fill in schedule counts for each cell
pub fn annotate(cells: &mut [CalendarCell], index: &ScheduleIndex) {
    for cell in cells.iter_mut() {
        cell.schedule_count = index.for_key(&cell.key).len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::schedule::models::{Schedule, ScheduleId, ScheduleTime};
    use chrono::Utc;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_march_2024_grid() {
        // 31 days, starts on a Friday
        let cells = CalendarGridBuilder::default().build(date(2024, 3, 15), date(2024, 3, 21));

        assert_eq!(cells.len(), 35);
        assert_eq!(cells[0].date, date(2024, 2, 25));
        assert_eq!(cells[0].date.weekday(), Weekday::Sun);
        assert_eq!(cells[34].date, date(2024, 3, 30));
        assert_eq!(cells[34].date.weekday(), Weekday::Sat);

        assert!(!cells[0].in_month);
        assert!(cells[5].in_month);
        assert_eq!(cells[5].key, "2024-03-01");

        let today: Vec<&CalendarCell> = cells.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].key, "2024-03-21");
    }

    #[test]
    fn test_six_week_month() {
        // June 2024 starts on a Saturday and has 30 days
        let cells = CalendarGridBuilder::default().build(date(2024, 6, 1), date(2000, 1, 1));
        assert_eq!(cells.len(), 42);
        assert!(cells.iter().all(|c| !c.is_today));
    }

    #[test]
    fn test_four_week_february() {
        // February 2015 starts on a Sunday and has 28 days
        let cells = CalendarGridBuilder::default().build(date(2015, 2, 10), date(2015, 2, 10));
        assert_eq!(cells.len(), 28);
        assert!(cells.iter().all(|c| c.in_month));
    }

    #[test]
    fn test_monday_week_start() {
        let cells = CalendarGridBuilder::new(Weekday::Mon).build(date(2024, 3, 1), date(2024, 3, 1));
        assert_eq!(cells[0].date, date(2024, 2, 26));
        assert_eq!(cells.last().unwrap().date, date(2024, 3, 31));
        assert_eq!(cells.len(), 35);
    }

    #[test]
    fn test_grid_properties_for_many_months() {
        let builder = CalendarGridBuilder::default();
        let mut reference = date(2023, 1, 1);
        for _ in 0..36 {
            let cells = builder.build(reference, reference);
            let (first, last) = month_bounds(reference);

            assert_eq!(cells.len() % 7, 0);
            assert!(cells.iter().any(|c| c.date == first));
            assert!(cells.iter().any(|c| c.date == last));

            let unique: HashSet<NaiveDate> = cells.iter().map(|c| c.date).collect();
            assert_eq!(unique.len(), cells.len());

            reference = last.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_counts_and_overflow() {
        let now = Utc::now();
        let schedules: Vec<Schedule> = (0..7)
            .map(|i| Schedule {
                id: ScheduleId::new(format!("s{}", i)),
                date: date(2024, 3, 21),
                time: ScheduleTime::Unspecified,
                description: "Meeting".to_string(),
                location: None,
                leader: None,
                detail_info: None,
                created_at: now,
                updated_at: now,
                created_by: None,
                updated_by: None,
            })
            .collect();
        let index = ScheduleIndex::build(&schedules);

        let cells = CalendarGridBuilder::default().build_with_counts(
            date(2024, 3, 1),
            date(2024, 3, 1),
            &index,
        );
        let busy_day = cells.iter().find(|c| c.key == "2024-03-21").unwrap();
        assert_eq!(busy_day.schedule_count, 7);
        assert_eq!(busy_day.visible_markers(DEFAULT_MAX_MARKERS), 5);
        assert!(busy_day.has_overflow(DEFAULT_MAX_MARKERS));

        let quiet_day = cells.iter().find(|c| c.key == "2024-03-20").unwrap();
        assert_eq!(quiet_day.schedule_count, 0);
        assert!(!quiet_day.has_overflow(DEFAULT_MAX_MARKERS));
    }
}
