use crate::error::{config_error, CalendarResult};
use crate::utils::time::month_bounds;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, e.g. 2024-03
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        month_bounds(self.first_day()).1
    }

    pub fn range(&self) -> MonthRange {
        let (start, end) = month_bounds(self.first_day());
        MonthRange { start, end }
    }

    pub fn next(&self) -> Self {
        self.first_day()
            .checked_add_months(Months::new(1))
            .map(Self::of)
            .unwrap_or(*self)
    }

    pub fn previous(&self) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .map(Self::of)
            .unwrap_or(*self)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> CalendarResult<Self> {
        let invalid = || config_error(&format!("Invalid month '{}', expected YYYY-MM", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive date range of a loaded month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

/// Identifies one month load so late responses can be recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTag {
    pub month: MonthKey,
    generation: u64,
}

/// Displayed month and selected date of one session's calendar
#[derive(Debug, Clone)]
pub struct CalendarView {
    displayed: MonthKey,
    selected: NaiveDate,
    generation: u64,
}

impl CalendarView {
    /// Start on the month of `today` with `today` selected
    pub fn new(today: NaiveDate) -> Self {
        Self {
            displayed: MonthKey::of(today),
            selected: today,
            generation: 0,
        }
    }

    pub fn displayed(&self) -> MonthKey {
        self.displayed
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.selected = date;
    }

    /// Show `month` and return the tag the matching load must carry
    pub fn show(&mut self, month: MonthKey) -> LoadTag {
        self.displayed = month;
        self.generation += 1;
        self.current_tag()
    }

    pub fn navigate(&mut self, direction: Direction) -> LoadTag {
        let month = match direction {
            Direction::Prev => self.displayed.previous(),
            Direction::Next => self.displayed.next(),
        };
        self.show(month)
    }

    /// Jump back to the month containing `today`; the selection is kept
    pub fn go_to_today(&mut self, today: NaiveDate) -> LoadTag {
        self.show(MonthKey::of(today))
    }

    /// Tag for reloading the displayed month
    pub fn reload(&mut self) -> LoadTag {
        self.show(self.displayed)
    }

    pub fn current_tag(&self) -> LoadTag {
        LoadTag {
            month: self.displayed,
            generation: self.generation,
        }
    }

    /// Whether a load issued with `tag` is still the one the view waits for
    pub fn accepts(&self, tag: &LoadTag) -> bool {
        tag.month == self.displayed && tag.generation == self.generation
    }
}
