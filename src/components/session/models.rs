use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one login session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// An authenticated member's session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Start a new session for a member
    pub fn start(user_id: impl Into<String>, display_name: Option<String>, role: Role) -> Self {
        Self {
            id: SessionId::generate(),
            user_id: user_id.into(),
            display_name,
            role,
            started_at: Utc::now(),
        }
    }
}

/// Who is acting, used to stamp `created_by` / `updated_by`
pub trait SessionContext: Send + Sync + 'static {
    fn current_user_id(&self) -> Option<String>;
}

impl SessionContext for Session {
    fn current_user_id(&self) -> Option<String> {
        Some(self.user_id.clone())
    }
}

/// Context without an authenticated member
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl SessionContext for Anonymous {
    fn current_user_id(&self) -> Option<String> {
        None
    }
}
