use super::models::Schedule;
use crate::utils::time::format_date;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Schedules grouped by canonical date string.
///
/// Each bucket is ordered by time of day with unspecified times first;
/// schedules with equal times keep their order from the source collection.
/// The index owns copies of the schedules and is rebuilt from scratch
/// whenever the collection changes.
#[derive(Debug, Clone, Default)]
pub struct ScheduleIndex {
    buckets: HashMap<String, Vec<Schedule>>,
    total: usize,
}

impl ScheduleIndex {
    /// Build the index from a flat collection
    pub fn build(schedules: &[Schedule]) -> Self {
        let mut buckets: HashMap<String, Vec<Schedule>> = HashMap::new();
        for schedule in schedules {
            buckets
                .entry(schedule.date_key())
                .or_default()
                .push(schedule.clone());
        }

        for bucket in buckets.values_mut() {
            // Stable: equal times keep collection order
            bucket.sort_by_key(|schedule| schedule.time);
        }

        Self {
            buckets,
            total: schedules.len(),
        }
    }

    /// Schedules on the given YYYY-MM-DD key
    pub fn for_key(&self, key: &str) -> &[Schedule] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Schedules on the given date
    pub fn for_date(&self, date: NaiveDate) -> &[Schedule] {
        self.for_key(&format_date(date))
    }

    /// Number of schedules on the given date
    pub fn count(&self, date: NaiveDate) -> usize {
        self.for_date(date).len()
    }

    /// Dates that have at least one schedule
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Total number of indexed schedules
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
