pub mod auth;
pub mod handlers;

use crate::components::dashboard::DashboardRegistry;
use crate::components::session::models::SessionId;
use crate::components::session::repository::SessionRepository;
use auth::{AuthError, AuthService, JwtAuth};
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use handlers::*;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    /// Auth service for JWT operations
    pub auth_service: Arc<AuthService>,
    /// Where logged-in sessions live
    pub sessions: Arc<dyn SessionRepository>,
    /// One dashboard per session
    pub dashboards: DashboardRegistry,
}

/// Resolve the JWT into a live session for protected routes
async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let (parts, body) = req.into_parts();
    let token = auth::extract_token(&parts)?;
    let claims = state.auth_service.validate_token(&token)?;

    let session_id = SessionId::new(claims.sid.clone());
    let session = state
        .sessions
        .load(&session_id)
        .await
        .map_err(|e| AuthError::Other(e.to_string()))?;
    let Some(session) = session else {
        // Expired or cleared elsewhere; its dashboard has no owner left
        state.dashboards.close(&session_id).await;
        return Err(AuthError::InvalidToken);
    };

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(JwtAuth { claims });
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Build the HTTP API
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/logout", post(logout_handler))
        .route("/api/calendar", get(calendar_handler))
        .route("/api/calendar/month", post(show_month_handler))
        .route("/api/calendar/navigate", post(navigate_handler))
        .route("/api/calendar/today", post(today_handler))
        .route("/api/calendar/select", post(select_handler))
        .route("/api/calendar/reload", post(reload_handler))
        .route("/api/editor/add", post(open_add_handler))
        .route("/api/editor/edit/{id}", post(open_edit_handler))
        .route("/api/editor/field", post(set_field_handler))
        .route("/api/editor/submit", post(submit_handler))
        .route("/api/editor/cancel", post(cancel_handler))
        .route("/api/editor/delete", post(request_delete_handler))
        .route("/api/editor/delete/cancel", post(cancel_delete_handler))
        .route("/api/editor/delete/confirm", post(confirm_delete_handler))
        .route("/api/alert/dismiss", post(dismiss_alert_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(login_handler))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
