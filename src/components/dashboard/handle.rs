use super::actor::{DashboardActor, DashboardActorHandle, DashboardRequest};
use super::snapshot::DashboardSnapshot;
use super::DashboardSettings;
use crate::components::calendar::{Direction, MonthKey};
use crate::components::schedule::models::{ScheduleField, ScheduleId};
use crate::components::schedule::store::ScheduleStore;
use crate::error::CalendarResult;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with a session's dashboard actor
#[derive(Clone)]
pub struct DashboardHandle {
    actor_handle: DashboardActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl DashboardHandle {
    /// Spawn a dashboard actor around `store`; it starts loading the current month
    pub fn new(store: ScheduleStore, settings: DashboardSettings) -> Self {
        let (mut actor, handle) = DashboardActor::new(store, settings);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    pub async fn request(&self, request: DashboardRequest) -> CalendarResult<DashboardSnapshot> {
        self.actor_handle.request(request).await
    }

    pub async fn snapshot(&self) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::Snapshot).await
    }

    pub async fn show_month(&self, month: MonthKey) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::ShowMonth(month)).await
    }

    pub async fn navigate(&self, direction: Direction) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::Navigate(direction)).await
    }

    pub async fn today(&self) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::Today).await
    }

    pub async fn reload(&self) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::Reload).await
    }

    pub async fn select_date(&self, date: NaiveDate) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::SelectDate(date)).await
    }

    pub async fn open_add(&self, seed: Option<NaiveDate>) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::OpenAdd(seed)).await
    }

    pub async fn open_edit(&self, id: ScheduleId) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::OpenEdit(id)).await
    }

    pub async fn set_field(
        &self,
        field: ScheduleField,
        value: impl Into<String>,
    ) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::SetField(field, value.into())).await
    }

    pub async fn submit(&self) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::Submit).await
    }

    pub async fn cancel(&self) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::Cancel).await
    }

    pub async fn request_delete(&self) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::RequestDelete).await
    }

    pub async fn cancel_delete(&self) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::CancelDelete).await
    }

    pub async fn confirm_delete(&self) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::ConfirmDelete).await
    }

    pub async fn dismiss_alert(&self) -> CalendarResult<DashboardSnapshot> {
        self.request(DashboardRequest::DismissAlert).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        self.actor_handle.shutdown().await
    }
}
