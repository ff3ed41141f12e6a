use super::models::{NewSchedule, Schedule, ScheduleId, ScheduleUpdate};
use crate::error::{CalendarResult, Error};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

/// Remote persistence for schedules
#[async_trait]
pub trait ScheduleRepository: Send + Sync + 'static {
    /// All schedules with `date` in `[start, end]`, ordered ascending by date
    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CalendarResult<Vec<Schedule>>;

    /// Store a new schedule and return the record with its assigned id
    async fn insert(&self, schedule: &NewSchedule) -> CalendarResult<Schedule>;

    /// Overwrite an existing schedule and return the stored record
    async fn update(&self, id: &ScheduleId, changes: &ScheduleUpdate) -> CalendarResult<Schedule>;

    /// Remove a schedule
    async fn delete(&self, id: &ScheduleId) -> CalendarResult<()>;
}

/// In-memory implementation of the repository (for testing and local runs)
#[derive(Debug, Default)]
pub struct InMemoryScheduleRepository {
    schedules: RwLock<Vec<Schedule>>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-filled with records
    pub fn with_schedules(schedules: Vec<Schedule>) -> Self {
        Self {
            schedules: RwLock::new(schedules),
        }
    }

    /// Copy of everything currently stored
    pub async fn all(&self) -> Vec<Schedule> {
        self.schedules.read().await.clone()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CalendarResult<Vec<Schedule>> {
        let schedules = self.schedules.read().await;
        let mut matching: Vec<Schedule> = schedules
            .iter()
            .filter(|schedule| schedule.date >= start && schedule.date <= end)
            .cloned()
            .collect();
        matching.sort_by_key(|schedule| schedule.date);
        Ok(matching)
    }

    async fn insert(&self, schedule: &NewSchedule) -> CalendarResult<Schedule> {
        let record = schedule.clone().into_schedule(ScheduleId::generate());
        let mut schedules = self.schedules.write().await;
        schedules.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &ScheduleId, changes: &ScheduleUpdate) -> CalendarResult<Schedule> {
        let mut schedules = self.schedules.write().await;
        let existing = schedules
            .iter_mut()
            .find(|schedule| &schedule.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        *existing = changes.apply_to(existing);
        Ok(existing.clone())
    }

    async fn delete(&self, id: &ScheduleId) -> CalendarResult<()> {
        let mut schedules = self.schedules.write().await;
        let before = schedules.len();
        schedules.retain(|schedule| &schedule.id != id);
        if schedules.len() == before {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::schedule::models::ScheduleInput;
    use chrono::Utc;

    fn new_schedule(description: &str, date: NaiveDate) -> NewSchedule {
        let now = Utc::now();
        NewSchedule {
            fields: ScheduleInput::new(description, date).validate().unwrap(),
            created_at: now,
            updated_at: now,
            created_by: Some("member-1".to_string()),
            updated_by: Some("member-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let repo = InMemoryScheduleRepository::new();
        let march = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
        let april = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();

        let meeting = repo.insert(&new_schedule("Meeting", march)).await.unwrap();
        repo.insert(&new_schedule("Outing", april)).await.unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let listed = repo.list_by_date_range(start, end).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, meeting.id);

        repo.delete(&meeting.id).await.unwrap();
        assert!(repo.list_by_date_range(start, end).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(&meeting.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_in_memory_update_keeps_creation_stamps() {
        let repo = InMemoryScheduleRepository::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
        let created = repo.insert(&new_schedule("Meeting", date)).await.unwrap();

        let changes = ScheduleUpdate {
            fields: ScheduleInput::new("Renamed", date).validate().unwrap(),
            updated_at: Utc::now(),
            updated_by: Some("member-2".to_string()),
        };
        let updated = repo.update(&created.id, &changes).await.unwrap();

        assert_eq!(updated.description, "Renamed");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.created_by.as_deref(), Some("member-1"));
        assert_eq!(updated.updated_by.as_deref(), Some("member-2"));
    }
}
