use super::models::{Session, SessionId};
use crate::error::{session_error, CalendarResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Redis keys
mod keys {
    pub const SESSION_PREFIX: &str = "congregation_calendar:session:";
}

/// Storage for login sessions
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Get a session by id
    async fn load(&self, id: &SessionId) -> CalendarResult<Option<Session>>;

    /// Store or replace a session
    async fn save(&self, session: &Session) -> CalendarResult<()>;

    /// Forget a session
    async fn clear(&self, id: &SessionId) -> CalendarResult<()>;
}

/// In-memory implementation of the session store.
///
/// Entries older than the expiry are dropped on read and whenever a new
/// session is saved.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, (Session, Instant)>>,
    expiry: Option<Duration>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions are forgotten `expiry` after they were last saved
    pub fn with_expiry(expiry: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            expiry: Some(expiry),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn is_expired(&self, saved_at: Instant) -> bool {
        self.expiry.is_some_and(|expiry| saved_at.elapsed() >= expiry)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load(&self, id: &SessionId) -> CalendarResult<Option<Session>> {
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get(id) {
            Some((_, saved_at)) => self.is_expired(*saved_at),
            None => return Ok(None),
        };
        if expired {
            debug!("Session {} expired", id);
            sessions.remove(id);
            return Ok(None);
        }
        Ok(sessions.get(id).map(|(session, _)| session.clone()))
    }

    async fn save(&self, session: &Session) -> CalendarResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, saved_at)| !self.is_expired(*saved_at));
        sessions.insert(session.id.clone(), (session.clone(), Instant::now()));
        Ok(())
    }

    async fn clear(&self, id: &SessionId) -> CalendarResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        Ok(())
    }
}

/// Redis-backed session store
pub struct RedisSessionRepository {
    client: RedisClient,
    expiry_seconds: u64,
}

impl RedisSessionRepository {
    /// Create a new Redis session store; sessions expire after `expiry`
    pub fn new(redis_url: &str, expiry: Duration) -> CalendarResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = RedisClient::open(redis_url)
            .map_err(|e| session_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self {
            client,
            expiry_seconds: expiry.as_secs().max(1),
        })
    }

    /// Get a Redis connection from the client
    async fn get_connection(&self) -> CalendarResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| session_error(&format!("Failed to connect to Redis: {}", e)))
    }

    fn key(id: &SessionId) -> String {
        format!("{}{}", keys::SESSION_PREFIX, id)
    }

    /// Value and expiry in one SETEX
    fn save_command(&self, session: &Session) -> CalendarResult<redis::Cmd> {
        let json = serde_json::to_string(session)?;
        Ok(redis::Cmd::set_ex(
            Self::key(&session.id),
            json,
            self.expiry_seconds,
        ))
    }
}

#[async_trait]
impl SessionRepository for RedisSessionRepository {
    async fn load(&self, id: &SessionId) -> CalendarResult<Option<Session>> {
        let mut conn = self.get_connection().await?;

        let data: Option<String> = conn.get(Self::key(id)).await?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> CalendarResult<()> {
        let mut conn = self.get_connection().await?;

        self.save_command(session)?
            .query_async::<()>(&mut conn)
            .await?;

        info!("Stored session {} for {}", session.id, session.user_id);
        Ok(())
    }

    async fn clear(&self, id: &SessionId) -> CalendarResult<()> {
        let mut conn = self.get_connection().await?;
        conn.del::<_, ()>(Self::key(id)).await?;
        info!("Cleared session {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::session::models::Role;

    #[tokio::test]
    async fn test_in_memory_session_lifecycle() {
        let repo = InMemorySessionRepository::new();
        let session = Session::start("member-7", Some("Kim".to_string()), Role::User);

        assert!(repo.load(&session.id).await.unwrap().is_none());

        repo.save(&session).await.unwrap();
        let loaded = repo.load(&session.id).await.unwrap();
        assert_eq!(loaded, Some(session.clone()));

        repo.clear(&session.id).await.unwrap();
        assert!(repo.load(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_sessions_expire() {
        let repo = InMemorySessionRepository::with_expiry(Duration::from_millis(50));
        let first = Session::start("member-1", None, Role::User);
        repo.save(&first).await.unwrap();
        assert!(repo.load(&first.id).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(repo.load(&first.id).await.unwrap().is_none());
        assert!(repo.is_empty().await);

        // Saving sweeps out sessions nobody read again
        let stale = Session::start("member-2", None, Role::User);
        repo.save(&stale).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        let fresh = Session::start("member-3", None, Role::User);
        repo.save(&fresh).await.unwrap();
        assert_eq!(repo.len().await, 1);
    }

    #[test]
    fn test_redis_save_sets_value_and_expiry_together() {
        let repo =
            RedisSessionRepository::new("redis://127.0.0.1/", Duration::from_secs(3600)).unwrap();
        let session = Session::start("member-7", None, Role::User);

        let packed = repo.save_command(&session).unwrap().get_packed_command();
        let packed = String::from_utf8_lossy(&packed);

        assert!(packed.starts_with("*4\r\n$5\r\nSETEX\r\n"));
        assert!(packed.contains(&RedisSessionRepository::key(&session.id)));
        assert!(packed.contains("\r\n3600\r\n"));
    }

    #[test]
    fn test_redis_key_layout() {
        let id = SessionId::new("abc");
        assert_eq!(
            RedisSessionRepository::key(&id),
            "congregation_calendar:session:abc"
        );
    }
}
