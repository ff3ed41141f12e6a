#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use congregation_calendar::components::schedule::models::{
    NewSchedule, Schedule, ScheduleId, ScheduleTime, ScheduleUpdate,
};
use congregation_calendar::components::schedule::repository::{
    InMemoryScheduleRepository, ScheduleRepository,
};
use congregation_calendar::error::{remote_error, CalendarResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A stored schedule; `time` is form input such as "14:00" or ""
pub fn schedule(id: &str, on: NaiveDate, time: &str, description: &str) -> Schedule {
    let now = Utc::now();
    Schedule {
        id: ScheduleId::new(id),
        date: on,
        time: ScheduleTime::parse(time).unwrap(),
        description: description.to_string(),
        location: None,
        leader: None,
        detail_info: None,
        created_at: now,
        updated_at: now,
        created_by: None,
        updated_by: None,
    }
}

/// Repository double that counts calls and can fail or stall on demand
#[derive(Debug, Default)]
pub struct MockScheduleRepository {
    inner: InMemoryScheduleRepository,
    list_calls: AtomicUsize,
    insert_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_lists: AtomicBool,
    fail_writes: AtomicBool,
    list_delays: Mutex<HashMap<NaiveDate, Duration>>,
    write_delay: Mutex<Option<Duration>>,
}

impl MockScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedules(schedules: Vec<Schedule>) -> Self {
        Self {
            inner: InMemoryScheduleRepository::with_schedules(schedules),
            ..Default::default()
        }
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Answer loads whose range starts on `start` late; rows are read when
    /// the request arrives, so writes committed meanwhile are missing
    pub fn delay_list(&self, start: NaiveDate, delay: Duration) {
        self.list_delays.lock().unwrap().insert(start, delay);
    }

    pub fn delay_writes(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = Some(delay);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub async fn stored(&self) -> Vec<Schedule> {
        self.inner.all().await
    }

    async fn before_write(&self) -> CalendarResult<()> {
        let delay = *self.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(remote_error("backend unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for MockScheduleRepository {
    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CalendarResult<Vec<Schedule>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_lists.load(Ordering::SeqCst) {
            Err(remote_error("backend unavailable"))
        } else {
            self.inner.list_by_date_range(start, end).await
        };
        let delay = self.list_delays.lock().unwrap().get(&start).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn insert(&self, schedule: &NewSchedule) -> CalendarResult<Schedule> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.before_write().await?;
        self.inner.insert(schedule).await
    }

    async fn update(&self, id: &ScheduleId, changes: &ScheduleUpdate) -> CalendarResult<Schedule> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.before_write().await?;
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: &ScheduleId) -> CalendarResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.before_write().await?;
        self.inner.delete(id).await
    }
}
