use crate::components::schedule::repository::{InMemoryScheduleRepository, ScheduleRepository};
use crate::components::schedule::supabase::SupabaseScheduleRepository;
use crate::components::session::repository::{
    InMemorySessionRepository, RedisSessionRepository, SessionRepository,
};
use crate::config::Config;
use crate::error::{CalendarResult, Error};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// How often idle dashboards are looked for
#[cfg(feature = "web-interface")]
const DASHBOARD_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Supabase when configured, otherwise an in-memory store
pub fn build_schedule_repository(config: &Config) -> CalendarResult<Arc<dyn ScheduleRepository>> {
    match config.supabase() {
        Some((url, key)) => {
            let repository = SupabaseScheduleRepository::new(url, key, &config.schedule_table)?;
            info!("Using schedules at {}", repository.endpoint());
            Ok(Arc::new(repository))
        }
        None => {
            warn!("SUPABASE_URL or SUPABASE_ANON_KEY not set, schedules are kept in memory");
            Ok(Arc::new(InMemoryScheduleRepository::new()))
        }
    }
}

/// Redis when configured and reachable, otherwise in-memory sessions
pub fn build_session_repository(config: &Config) -> Arc<dyn SessionRepository> {
    let Some(redis_url) = config.redis_url.as_deref() else {
        info!("REDIS_URL not set, sessions are kept in memory");
        return Arc::new(InMemorySessionRepository::with_expiry(config.session_ttl()));
    };

    match RedisSessionRepository::new(redis_url, config.session_ttl()) {
        Ok(repository) => {
            info!("Storing sessions in Redis");
            Arc::new(repository)
        }
        Err(e) => {
            error!("Failed to set up Redis sessions: {}", e);
            info!("Using in-memory sessions as fallback");
            Arc::new(InMemorySessionRepository::with_expiry(config.session_ttl()))
        }
    }
}

/// Start whatever front end this build carries
pub async fn run(config: Config) -> miette::Result<()> {
    crate::utils::i18n::set_locale(&config.locale);
    info!("Setting locale to {}", config.locale);

    #[cfg(feature = "web-interface")]
    let result = start_server(config).await;

    #[cfg(not(feature = "web-interface"))]
    let result = {
        let _ = config;
        warn!("Web interface feature not enabled. Please compile with --features web-interface");
        Ok(())
    };

    result
}

/// Serve the HTTP API until a shutdown signal arrives
#[cfg(feature = "web-interface")]
pub async fn start_server(config: Config) -> miette::Result<()> {
    use crate::components::dashboard::DashboardRegistry;
    use crate::web::auth::{AuthConfig, AuthService};
    use crate::web::{router, AppState};
    use std::net::SocketAddr;
    use tokio::sync::oneshot;

    let repository = build_schedule_repository(&config)?;
    let sessions = build_session_repository(&config);
    let dashboards = DashboardRegistry::new(repository, config.dashboard_settings()?)
        .with_idle_timeout(config.session_ttl());
    let sweeper = dashboards.start_sweeper(DASHBOARD_SWEEP_INTERVAL);

    let auth_config = AuthConfig::from(&config);
    info!(
        "Using admin credentials from environment: username={}",
        auth_config.admin_username
    );

    let state = AppState {
        auth_service: Arc::new(AuthService::new(auth_config)),
        sessions,
        dashboards: dashboards.clone(),
    };

    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(crate::shutdown::handle_signals(shutdown_send, dashboards));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(Error::from)?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = shutdown_recv.await;
        })
        .await
        .map_err(Error::from)?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}
