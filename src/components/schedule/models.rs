use crate::utils::time::{format_date, parse_naive_time};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wire value the backend stores for "no time given"
pub const UNSPECIFIED_TIME: &str = "00:00:00";

/// Opaque identifier assigned by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ScheduleId(String);

impl ScheduleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScheduleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// Backends hand out either uuid strings or integer keys
impl<'de> Deserialize<'de> for ScheduleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => ScheduleId(id),
            RawId::Number(id) => ScheduleId(id.to_string()),
        })
    }
}

/// Time of day of a schedule.
///
/// `Unspecified` orders before every concrete time, which is the same as
/// treating it as midnight: a midnight input collapses into `Unspecified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ScheduleTime {
    #[default]
    Unspecified,
    At(NaiveTime),
}

impl ScheduleTime {
    pub fn from_time(time: NaiveTime) -> Self {
        if time.num_seconds_from_midnight() == 0 && time.nanosecond() == 0 {
            ScheduleTime::Unspecified
        } else {
            ScheduleTime::At(time)
        }
    }

    /// Parse form or wire input; empty input means unspecified
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Some(ScheduleTime::Unspecified);
        }
        parse_naive_time(trimmed).map(Self::from_time)
    }

    pub fn is_specified(&self) -> bool {
        matches!(self, ScheduleTime::At(_))
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            ScheduleTime::Unspecified => None,
            ScheduleTime::At(time) => Some(*time),
        }
    }

    /// Short HH:MM label, absent for unspecified times
    pub fn badge(&self) -> Option<String> {
        self.as_time().map(|time| time.format("%H:%M").to_string())
    }

    pub fn to_wire(&self) -> String {
        match self {
            ScheduleTime::Unspecified => UNSPECIFIED_TIME.to_string(),
            ScheduleTime::At(time) => time.format("%H:%M:%S").to_string(),
        }
    }
}

impl Serialize for ScheduleTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for ScheduleTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(ScheduleTime::Unspecified),
            Some(value) => ScheduleTime::parse(&value)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", value))),
        }
    }
}

/// One calendar event as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: ScheduleTime,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub leader: Option<String>,
    #[serde(default)]
    pub detail_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl Schedule {
    /// Canonical YYYY-MM-DD key used by the index and the grid
    pub fn date_key(&self) -> String {
        format_date(self.date)
    }
}

/// Editable fields of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleField {
    Description,
    Date,
    Time,
    Location,
    Leader,
    DetailInfo,
}

impl ScheduleField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleField::Description => "description",
            ScheduleField::Date => "date",
            ScheduleField::Time => "time",
            ScheduleField::Location => "location",
            ScheduleField::Leader => "leader",
            ScheduleField::DetailInfo => "detail_info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldIssue {
    Required,
    Invalid,
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: ScheduleField,
    pub issue: FieldIssue,
}

impl FieldError {
    pub fn required(field: ScheduleField) -> Self {
        Self {
            field,
            issue: FieldIssue::Required,
        }
    }

    pub fn invalid(field: ScheduleField) -> Self {
        Self {
            field,
            issue: FieldIssue::Invalid,
        }
    }

    /// Translation key of the inline message
    pub fn message_key(&self) -> String {
        let issue = match self.issue {
            FieldIssue::Required => "required",
            FieldIssue::Invalid => "invalid",
        };
        format!("validation.{}.{}", issue, self.field.as_str())
    }
}

/// Collected validation failures, at most one per field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.clear_field(error.field);
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ScheduleField) -> Option<&FieldError> {
        self.0.iter().find(|error| error.field == field)
    }

    pub fn clear_field(&mut self, field: ScheduleField) {
        self.0.retain(|error| error.field != field);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|error| match error.issue {
                FieldIssue::Required => format!("{} is required", error.field.as_str()),
                FieldIssue::Invalid => format!("{} is invalid", error.field.as_str()),
            })
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Caller-supplied values for a create or update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub description: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
    pub leader: Option<String>,
    pub detail_info: Option<String>,
}

impl ScheduleInput {
    pub fn new(description: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            description: description.into(),
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_leader(mut self, leader: impl Into<String>) -> Self {
        self.leader = Some(leader.into());
        self
    }

    pub fn with_detail_info(mut self, detail_info: impl Into<String>) -> Self {
        self.detail_info = Some(detail_info.into());
        self
    }

    /// Check required fields and apply defaults
    pub fn validate(&self) -> Result<ScheduleFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let description = self.description.trim();
        if description.is_empty() {
            errors.push(FieldError::required(ScheduleField::Description));
        }
        if self.date.is_none() {
            errors.push(FieldError::required(ScheduleField::Date));
        }

        match self.date {
            Some(date) if errors.is_empty() => Ok(ScheduleFields {
                description: description.to_string(),
                date,
                time: self
                    .time
                    .map(ScheduleTime::from_time)
                    .unwrap_or(ScheduleTime::Unspecified),
                location: normalize_text(self.location.as_deref()),
                leader: normalize_text(self.leader.as_deref()),
                detail_info: normalize_text(self.detail_info.as_deref()),
            }),
            _ => Err(errors),
        }
    }
}

/// Blank optional text is stored as null
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Validated, normalized schedule values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleFields {
    pub description: String,
    pub date: NaiveDate,
    pub time: ScheduleTime,
    pub location: Option<String>,
    pub leader: Option<String>,
    pub detail_info: Option<String>,
}

/// Insert payload sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSchedule {
    #[serde(flatten)]
    pub fields: ScheduleFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl NewSchedule {
    /// Materialize the record a backend would return for this payload
    pub fn into_schedule(self, id: ScheduleId) -> Schedule {
        Schedule {
            id,
            date: self.fields.date,
            time: self.fields.time,
            description: self.fields.description,
            location: self.fields.location,
            leader: self.fields.leader,
            detail_info: self.fields.detail_info,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        }
    }
}

/// Update payload sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleUpdate {
    #[serde(flatten)]
    pub fields: ScheduleFields,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl ScheduleUpdate {
    /// Apply the changes to an existing record, keeping id and creation stamps
    pub fn apply_to(&self, existing: &Schedule) -> Schedule {
        Schedule {
            id: existing.id.clone(),
            date: self.fields.date,
            time: self.fields.time,
            description: self.fields.description.clone(),
            location: self.fields.location.clone(),
            leader: self.fields.leader.clone(),
            detail_info: self.fields.detail_info.clone(),
            created_at: existing.created_at,
            updated_at: self.updated_at,
            created_by: existing.created_by.clone(),
            updated_by: self.updated_by.clone().or_else(|| existing.updated_by.clone()),
        }
    }
}
