use crate::components::session::models::{Role, Session};
use crate::config::Config;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Cookie carrying the JWT
pub const AUTH_COOKIE: &str = "auth_token";

/// User credentials structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Name (username)
    pub name: Option<String>,
    /// Role (admin, user)
    pub role: String,
    /// Session the token belongs to
    pub sid: String,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    pub iat: usize,
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT secret for signing/verifying tokens
    pub jwt_secret: String,
    /// Token expiration time in minutes
    pub token_expiration_minutes: i64,
    pub admin_username: String,
    pub admin_password: String,
}

impl From<&Config> for AuthConfig {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_expiration_minutes: config.token_expiration_minutes,
            admin_username: config.admin_username.clone(),
            admin_password: config.admin_password.clone(),
        }
    }
}

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    /// Token is missing
    MissingToken,
    /// Token is invalid or its session is gone
    InvalidToken,
    /// Token is expired
    TokenExpired,
    /// Wrong username or password
    InvalidCredentials,
    /// Some other error
    Other(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "token_expired"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AuthError::Other(err) => {
                error!("Auth error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        (status, Json(serde_json::json!({ "error": code }))).into_response()
    }
}

/// Authenticated request data inserted by the middleware
#[derive(Debug, Clone)]
pub struct JwtAuth {
    pub claims: Claims,
}

/// Extract the JWT from the auth cookie or the Authorization header
pub fn extract_token(parts: &Parts) -> Result<String, AuthError> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        if !cookie.value().is_empty() {
            return Ok(cookie.value().to_string());
        }
    }

    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;
    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidToken)?;

    auth_str
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidToken)
}

/// Auth service for token operations
pub struct AuthService {
    config: Arc<AuthConfig>,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> Arc<AuthConfig> {
        self.config.clone()
    }

    /// Check credentials and start a session for the member
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if username == self.config.admin_username && password == self.config.admin_password {
            Ok(Session::start(username, Some(username.to_string()), Role::Admin))
        } else {
            debug!("Rejected login for {}", username);
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Generate a JWT for a session
    pub fn generate_token(&self, session: &Session) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.config.token_expiration_minutes);

        let claims = Claims {
            sub: session.user_id.clone(),
            name: session.display_name.clone(),
            role: session.role.as_str().to_string(),
            sid: session.id.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Other(format!("Failed to generate token: {}", e)))
    }

    /// Validate a JWT
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => {
                debug!("JWT validation error: {:?}", e);
                AuthError::InvalidToken
            }
        })
    }
}
