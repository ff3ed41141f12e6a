use super::handle::DashboardHandle;
use super::DashboardSettings;
use crate::components::schedule::repository::ScheduleRepository;
use crate::components::schedule::store::ScheduleStore;
use crate::components::session::models::{Session, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Dashboards unused for this long are stopped by `evict_idle`
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

struct Entry {
    handle: DashboardHandle,
    last_used: Instant,
}

/// Live dashboards keyed by session
#[derive(Clone)]
pub struct DashboardRegistry {
    repository: Arc<dyn ScheduleRepository>,
    settings: DashboardSettings,
    idle_timeout: Duration,
    dashboards: Arc<RwLock<HashMap<SessionId, Entry>>>,
}

impl DashboardRegistry {
    pub fn new(repository: Arc<dyn ScheduleRepository>, settings: DashboardSettings) -> Self {
        Self {
            repository,
            settings,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            dashboards: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Stop dashboards after `idle_timeout` without a request
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Dashboard of `session`, spawning one on first use
    pub async fn open(&self, session: &Session) -> DashboardHandle {
        let mut dashboards = self.dashboards.write().await;
        let entry = dashboards.entry(session.id.clone()).or_insert_with(|| {
            info!("Opening dashboard for {}", session.user_id);
            let store = ScheduleStore::new(Arc::clone(&self.repository), Arc::new(session.clone()));
            Entry {
                handle: DashboardHandle::new(store, self.settings.clone()),
                last_used: Instant::now(),
            }
        });
        entry.last_used = Instant::now();
        entry.handle.clone()
    }

    pub async fn get(&self, id: &SessionId) -> Option<DashboardHandle> {
        self.dashboards
            .read()
            .await
            .get(id)
            .map(|entry| entry.handle.clone())
    }

    /// Stop and forget the dashboard of a session
    pub async fn close(&self, id: &SessionId) {
        let removed = self.dashboards.write().await.remove(id);
        if let Some(entry) = removed {
            if let Err(e) = entry.handle.shutdown().await {
                warn!("Failed to stop dashboard {}: {}", id, e);
            }
        }
    }

    /// Stop every dashboard idle for longer than the timeout; returns how many
    pub async fn evict_idle(&self) -> usize {
        let idle: Vec<(SessionId, DashboardHandle)> = {
            let mut dashboards = self.dashboards.write().await;
            let expired: Vec<SessionId> = dashboards
                .iter()
                .filter(|(_, entry)| entry.last_used.elapsed() >= self.idle_timeout)
                .map(|(id, _)| id.clone())
                .collect();
            expired
                .into_iter()
                .filter_map(|id| dashboards.remove(&id).map(|entry| (id, entry.handle)))
                .collect()
        };

        for (id, handle) in &idle {
            debug!("Stopping idle dashboard {}", id);
            if let Err(e) = handle.shutdown().await {
                warn!("Failed to stop dashboard {}: {}", id, e);
            }
        }
        if !idle.is_empty() {
            info!("Stopped {} idle dashboards", idle.len());
        }
        idle.len()
    }

    /// Run `evict_idle` every `every` until the task is aborted
    pub fn start_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            loop {
                sleep(every).await;
                registry.evict_idle().await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.dashboards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.dashboards.read().await.is_empty()
    }

    pub async fn shutdown_all(&self) {
        let entries: Vec<(SessionId, Entry)> = self.dashboards.write().await.drain().collect();
        info!("Shutting down {} dashboards", entries.len());
        for (id, entry) in entries {
            if let Err(e) = entry.handle.shutdown().await {
                warn!("Failed to stop dashboard {}: {}", id, e);
            }
        }
    }
}
