use super::snapshot::DashboardSnapshot;
use super::DashboardSettings;
use crate::components::calendar::{CalendarView, Direction, LoadTag, MonthKey};
use crate::components::editor::{
    completion, Alert, AlertKind, EditorAction, EditorEffect, EditorOutcome,
    ScheduleEditorController,
};
use crate::components::schedule::models::{
    NewSchedule, Schedule, ScheduleField, ScheduleId, ScheduleUpdate,
};
use crate::components::schedule::store::{fetch_month, into_remote_error, ScheduleStore};
use crate::error::{component_error, transition_error, CalendarResult, Error};
use crate::utils::time::today_in;
use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

type Reply = mpsc::Sender<CalendarResult<DashboardSnapshot>>;

/// User actions a session can send to its dashboard
#[derive(Debug, Clone)]
pub enum DashboardRequest {
    Snapshot,
    ShowMonth(MonthKey),
    Navigate(Direction),
    Today,
    Reload,
    SelectDate(NaiveDate),
    OpenAdd(Option<NaiveDate>),
    OpenEdit(ScheduleId),
    SetField(ScheduleField, String),
    Submit,
    Cancel,
    RequestDelete,
    CancelDelete,
    ConfirmDelete,
    DismissAlert,
}

/// Result of a background write, fed back into the mailbox
pub enum RemoteResult {
    Created(CalendarResult<Schedule>),
    Updated(CalendarResult<Schedule>),
    Deleted(ScheduleId, CalendarResult<()>),
}

/// Commands that can be sent to the dashboard actor
pub enum DashboardCommand {
    Request(DashboardRequest, Reply),
    MonthLoaded(LoadTag, CalendarResult<Vec<Schedule>>),
    RemoteDone(RemoteResult),
    Shutdown,
}

enum PendingWrite {
    Create(NewSchedule),
    Update(ScheduleId, ScheduleUpdate),
    Delete(ScheduleId),
}

/// Handle for communicating with a dashboard actor
#[derive(Clone)]
pub struct DashboardActorHandle {
    command_tx: mpsc::Sender<DashboardCommand>,
}

impl DashboardActorHandle {
    /// Send a request and wait for the resulting snapshot
    pub async fn request(&self, request: DashboardRequest) -> CalendarResult<DashboardSnapshot> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(DashboardCommand::Request(request, response_tx))
            .await
            .map_err(|e| component_error(&format!("Dashboard mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        let _ = self.command_tx.send(DashboardCommand::Shutdown).await;
        Ok(())
    }
}

/// One session's calendar, store and editor.
///
/// Commands are processed one at a time. Loads and writes run as spawned
/// tasks and report back through the mailbox, so the actor keeps answering
/// while they are in flight.
pub struct DashboardActor {
    view: CalendarView,
    store: ScheduleStore,
    editor: ScheduleEditorController,
    loading: bool,
    alert: Option<Alert>,
    settings: DashboardSettings,
    command_rx: mpsc::Receiver<DashboardCommand>,
    self_tx: mpsc::WeakSender<DashboardCommand>,
}

impl DashboardActor {
    /// Create a new actor and return its handle
    pub fn new(store: ScheduleStore, settings: DashboardSettings) -> (Self, DashboardActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let today = today_in(&settings.timezone);

        let actor = Self {
            view: CalendarView::new(today),
            store,
            editor: ScheduleEditorController::new(),
            loading: false,
            alert: None,
            settings,
            command_rx,
            self_tx: command_tx.downgrade(),
        };

        (actor, DashboardActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Dashboard actor started on {}", self.view.displayed());

        let tag = self.view.reload();
        self.start_load(tag);

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                DashboardCommand::Request(request, response_tx) => {
                    let result = self.handle(request).map(|_| self.snapshot());
                    let _ = response_tx.send(result).await;
                }
                DashboardCommand::MonthLoaded(tag, result) => self.finish_load(tag, result),
                DashboardCommand::RemoteDone(result) => self.finish_write(result),
                DashboardCommand::Shutdown => {
                    info!("Dashboard actor shutting down");
                    break;
                }
            }
        }

        info!("Dashboard actor shut down");
    }

    fn handle(&mut self, request: DashboardRequest) -> CalendarResult<()> {
        match request {
            DashboardRequest::Snapshot => {}
            DashboardRequest::ShowMonth(month) => {
                let tag = self.view.show(month);
                self.start_load(tag);
            }
            DashboardRequest::Navigate(direction) => {
                let tag = self.view.navigate(direction);
                self.start_load(tag);
            }
            DashboardRequest::Today => {
                let tag = self.view.go_to_today(self.today());
                self.start_load(tag);
            }
            DashboardRequest::Reload => {
                let tag = self.view.reload();
                self.start_load(tag);
            }
            DashboardRequest::SelectDate(date) => self.view.select(date),
            DashboardRequest::OpenAdd(seed) => self.editor.open_add(seed, self.view.selected())?,
            DashboardRequest::OpenEdit(id) => {
                let schedule = self
                    .store
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| Error::NotFound(id.to_string()))?;
                self.editor.open_edit(schedule)?;
            }
            DashboardRequest::SetField(field, value) => self.editor.set_field(field, value)?,
            DashboardRequest::Submit => match self.editor.dispatch(EditorAction::Submit)? {
                Some(effect) => self.start_write(effect)?,
                None => {
                    return Err(Error::Validation(
                        self.editor.state().field_errors().clone(),
                    ))
                }
            },
            DashboardRequest::Cancel => self.editor.cancel()?,
            DashboardRequest::RequestDelete => self.editor.request_delete()?,
            DashboardRequest::CancelDelete => self.editor.cancel_delete()?,
            DashboardRequest::ConfirmDelete => {
                match self.editor.dispatch(EditorAction::ConfirmDelete)? {
                    Some(effect) => self.start_write(effect)?,
                    None => return Err(transition_error("nothing to delete")),
                }
            }
            DashboardRequest::DismissAlert => {
                self.alert = None;
                self.editor.dismiss_alert()?;
            }
        }
        Ok(())
    }

    fn start_load(&mut self, tag: LoadTag) {
        let Some(tx) = self.self_tx.upgrade() else {
            return;
        };
        self.loading = true;
        let repository = self.store.repository();

        tokio::spawn(async move {
            let result = fetch_month(repository, tag.month.range()).await;
            let _ = tx.send(DashboardCommand::MonthLoaded(tag, result)).await;
        });
    }

    fn finish_load(&mut self, tag: LoadTag, result: CalendarResult<Vec<Schedule>>) {
        if !self.view.accepts(&tag) {
            debug!("Discarding stale load for {}", tag.month);
            return;
        }
        self.loading = false;

        match result {
            Ok(schedules) => {
                self.store.replace_month(tag.month.range(), schedules);
                if self.alert.as_ref().is_some_and(|alert| alert.kind == AlertKind::Load) {
                    self.alert = None;
                }
            }
            Err(err) => {
                error!("Failed to load {}: {}", tag.month, err);
                self.store.reset_month(tag.month.range());
                self.alert = Some(Alert::from_error(&err));
            }
        }
    }

    /// Build the remote payload and run the write in the background.
    ///
    /// Local rejections (not found, validation) complete the editor at once.
    fn start_write(&mut self, effect: EditorEffect) -> CalendarResult<()> {
        let prepared = match effect {
            EditorEffect::Create(input) => self.store.prepare_create(&input).map(PendingWrite::Create),
            EditorEffect::Update(id, input) => self
                .store
                .prepare_update(&id, &input)
                .map(|changes| PendingWrite::Update(id, changes)),
            EditorEffect::Delete(id) => self
                .store
                .prepare_delete(&id)
                .map(|_| PendingWrite::Delete(id)),
        };

        let pending = match prepared {
            Ok(pending) => pending,
            Err(err) => {
                let failed: CalendarResult<EditorOutcome> = Err(err);
                self.editor.dispatch(completion(&failed))?;
                return failed.map(|_| ());
            }
        };

        let tx = self
            .self_tx
            .upgrade()
            .ok_or_else(|| component_error("Dashboard mailbox closed"))?;
        let repository = self.store.repository();

        tokio::spawn(async move {
            let result = match pending {
                PendingWrite::Create(payload) => RemoteResult::Created(
                    repository.insert(&payload).await.map_err(into_remote_error),
                ),
                PendingWrite::Update(id, changes) => RemoteResult::Updated(
                    repository.update(&id, &changes).await.map_err(into_remote_error),
                ),
                PendingWrite::Delete(id) => {
                    let result = repository.delete(&id).await.map_err(into_remote_error);
                    RemoteResult::Deleted(id, result)
                }
            };
            let _ = tx.send(DashboardCommand::RemoteDone(result)).await;
        });

        Ok(())
    }

    fn finish_write(&mut self, result: RemoteResult) {
        let outcome = match result {
            RemoteResult::Created(result) => result.map(|record| {
                info!("Created schedule {} on {}", record.id, record.date);
                self.store.apply_created(record.clone());
                EditorOutcome::Saved(record)
            }),
            RemoteResult::Updated(result) => result.map(|record| {
                info!("Updated schedule {}", record.id);
                self.store.apply_updated(record.clone());
                EditorOutcome::Saved(record)
            }),
            RemoteResult::Deleted(id, result) => result.map(|_| {
                info!("Deleted schedule {}", id);
                self.store.apply_deleted(&id);
                EditorOutcome::Deleted(id)
            }),
        };

        match &outcome {
            // The pending load may have read the table before this write
            Ok(_) if self.loading => {
                debug!(
                    "Write confirmed while {} was loading, reloading",
                    self.view.displayed()
                );
                let tag = self.view.reload();
                self.start_load(tag);
            }
            Ok(_) => {}
            Err(err) => warn!("Schedule change failed: {}", err),
        }
        if let Err(err) = self.editor.dispatch(completion(&outcome)) {
            error!("Editor rejected write completion: {}", err);
        }
    }

    fn today(&self) -> NaiveDate {
        today_in(&self.settings.timezone)
    }

    fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::capture(
            &self.view,
            &self.store,
            self.editor.state(),
            self.loading,
            self.alert.as_ref(),
            &self.settings,
            self.today(),
        )
    }
}
