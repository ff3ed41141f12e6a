pub mod models;
pub mod repository;

pub use models::{Anonymous, Role, Session, SessionContext, SessionId};
pub use repository::{InMemorySessionRepository, RedisSessionRepository, SessionRepository};
