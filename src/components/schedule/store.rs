use super::index::ScheduleIndex;
use super::models::{NewSchedule, Schedule, ScheduleId, ScheduleInput, ScheduleUpdate};
use super::repository::ScheduleRepository;
use crate::components::calendar::month::MonthRange;
use crate::components::session::models::SessionContext;
use crate::error::{CalendarResult, Error};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetch a month's schedules without touching any store
pub async fn fetch_month(
    repository: Arc<dyn ScheduleRepository>,
    range: MonthRange,
) -> CalendarResult<Vec<Schedule>> {
    let mut schedules = repository
        .list_by_date_range(range.start, range.end)
        .await
        .map_err(|e| Error::Load(e.to_string()))?;
    schedules.sort_by_key(|schedule| schedule.date);
    Ok(schedules)
}

/// The loaded month's schedules, kept in step with the remote store.
///
/// The collection only changes after the backend confirmed a write, so a
/// failed create, update or delete leaves it exactly as it was.
pub struct ScheduleStore {
    repository: Arc<dyn ScheduleRepository>,
    session: Arc<dyn SessionContext>,
    schedules: Vec<Schedule>,
    loaded: Option<MonthRange>,
    index: ScheduleIndex,
}

impl ScheduleStore {
    pub fn new(repository: Arc<dyn ScheduleRepository>, session: Arc<dyn SessionContext>) -> Self {
        Self {
            repository,
            session,
            schedules: Vec::new(),
            loaded: None,
            index: ScheduleIndex::default(),
        }
    }

    pub fn repository(&self) -> Arc<dyn ScheduleRepository> {
        Arc::clone(&self.repository)
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn index(&self) -> &ScheduleIndex {
        &self.index
    }

    pub fn loaded_range(&self) -> Option<MonthRange> {
        self.loaded
    }

    pub fn get(&self, id: &ScheduleId) -> Option<&Schedule> {
        self.schedules.iter().find(|schedule| &schedule.id == id)
    }

    pub fn contains(&self, id: &ScheduleId) -> bool {
        self.get(id).is_some()
    }

    /// Replace the collection with every schedule in `[start, end]`
    pub async fn load_month(&mut self, start: NaiveDate, end: NaiveDate) -> CalendarResult<()> {
        let range = MonthRange { start, end };
        let schedules = fetch_month(self.repository(), range).await?;
        self.replace_month(range, schedules);
        Ok(())
    }

    /// Install a fetched month wholesale
    pub fn replace_month(&mut self, range: MonthRange, schedules: Vec<Schedule>) {
        info!(
            "Loaded {} schedules for {} to {}",
            schedules.len(),
            range.start,
            range.end
        );
        self.schedules = schedules;
        self.loaded = Some(range);
        self.reindex();
    }

    /// Empty the collection for `range`, e.g. after its load failed.
    ///
    /// The range stays set so later writes outside it are still dropped.
    pub fn reset_month(&mut self, range: MonthRange) {
        self.schedules.clear();
        self.loaded = Some(range);
        self.reindex();
    }

    /// Validate `input` and build the insert payload
    pub fn prepare_create(&self, input: &ScheduleInput) -> CalendarResult<NewSchedule> {
        let fields = input.validate().map_err(Error::Validation)?;
        let now = Utc::now();
        let user = self.session.current_user_id();
        Ok(NewSchedule {
            fields,
            created_at: now,
            updated_at: now,
            created_by: user.clone(),
            updated_by: user,
        })
    }

    /// Validate `input` for an existing schedule and build the update payload
    pub fn prepare_update(
        &self,
        id: &ScheduleId,
        input: &ScheduleInput,
    ) -> CalendarResult<ScheduleUpdate> {
        if !self.contains(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        let fields = input.validate().map_err(Error::Validation)?;
        Ok(ScheduleUpdate {
            fields,
            updated_at: Utc::now(),
            updated_by: self.session.current_user_id(),
        })
    }

    pub fn prepare_delete(&self, id: &ScheduleId) -> CalendarResult<()> {
        if !self.contains(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Add a record the backend just created
    pub fn apply_created(&mut self, record: Schedule) {
        if !self.in_loaded_range(record.date) {
            debug!(
                "Created schedule {} on {} is outside the loaded month",
                record.id, record.date
            );
            return;
        }
        match self.position(&record.id) {
            Some(position) => self.schedules[position] = record,
            None => self.schedules.push(record),
        }
        self.reindex();
    }

    /// Swap in a record the backend just updated, keeping its position
    pub fn apply_updated(&mut self, record: Schedule) {
        let Some(position) = self.position(&record.id) else {
            warn!("Updated schedule {} is no longer loaded", record.id);
            return;
        };
        if self.in_loaded_range(record.date) {
            self.schedules[position] = record;
        } else {
            debug!("Schedule {} moved out of the loaded month", record.id);
            self.schedules.remove(position);
        }
        self.reindex();
    }

    /// Remove a record the backend just deleted
    pub fn apply_deleted(&mut self, id: &ScheduleId) {
        if let Some(position) = self.position(id) {
            self.schedules.remove(position);
            self.reindex();
        }
    }

    /// Create a schedule; the collection changes only if the backend accepts it
    pub async fn create(&mut self, input: &ScheduleInput) -> CalendarResult<Schedule> {
        let payload = self.prepare_create(input)?;
        let record = self
            .repository
            .insert(&payload)
            .await
            .map_err(into_remote_error)?;
        info!("Created schedule {} on {}", record.id, record.date);
        self.apply_created(record.clone());
        Ok(record)
    }

    /// Update a loaded schedule in place
    pub async fn update(&mut self, id: &ScheduleId, input: &ScheduleInput) -> CalendarResult<Schedule> {
        let changes = self.prepare_update(id, input)?;
        let record = self
            .repository
            .update(id, &changes)
            .await
            .map_err(into_remote_error)?;
        info!("Updated schedule {}", record.id);
        self.apply_updated(record.clone());
        Ok(record)
    }

    /// Delete a loaded schedule
    pub async fn delete(&mut self, id: &ScheduleId) -> CalendarResult<()> {
        self.prepare_delete(id)?;
        self.repository
            .delete(id)
            .await
            .map_err(into_remote_error)?;
        info!("Deleted schedule {}", id);
        self.apply_deleted(id);
        Ok(())
    }

    fn position(&self, id: &ScheduleId) -> Option<usize> {
        self.schedules.iter().position(|schedule| &schedule.id == id)
    }

    fn in_loaded_range(&self, date: NaiveDate) -> bool {
        self.loaded.map_or(true, |range| range.contains(date))
    }

    fn reindex(&mut self) {
        self.index = ScheduleIndex::build(&self.schedules);
    }
}

/// Backend failures on writes surface as remote errors; a backend that
/// reports the row missing keeps its not-found meaning.
pub fn into_remote_error(err: Error) -> Error {
    match err {
        Error::NotFound(_) | Error::Remote(_) => err,
        other => Error::Remote(other.to_string()),
    }
}
