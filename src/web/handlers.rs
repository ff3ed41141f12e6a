use super::auth::{AuthError, Credentials, AUTH_COOKIE};
use super::AppState;
use crate::components::calendar::{Direction, MonthKey};
use crate::components::dashboard::{DashboardRequest, DashboardSnapshot};
use crate::components::schedule::models::{ScheduleField, ScheduleId};
use crate::components::session::models::Session;
use crate::error::Error;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

/// Errors returned by the JSON API
#[derive(Debug)]
pub enum ApiError {
    Calendar(Error),
    Auth(AuthError),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Calendar(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

/// HTTP status for a dashboard error
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Busy | Error::InvalidTransition(_) => StatusCode::CONFLICT,
        Error::Load(_) | Error::Remote(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(err) => err.into_response(),
            ApiError::Calendar(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    error!("Request failed: {}", err);
                }
                let body = match &err {
                    Error::Validation(errors) => json!({
                        "error": "validation",
                        "message": err.to_string(),
                        "field_errors": errors,
                    }),
                    _ => json!({
                        "error": error_code(&err),
                        "message": err.to_string(),
                    }),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

fn error_code(err: &Error) -> &'static str {
    match err {
        Error::Validation(_) => "validation",
        Error::NotFound(_) => "not_found",
        Error::Busy => "busy",
        Error::InvalidTransition(_) => "invalid_transition",
        Error::Load(_) => "load",
        Error::Remote(_) => "remote",
        _ => "internal",
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct MonthBody {
    pub month: MonthKey,
}

#[derive(Debug, Deserialize)]
pub struct NavigateBody {
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct SelectBody {
    pub date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddBody {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct FieldBody {
    pub field: ScheduleField,
    pub value: String,
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Log in, start a session and hand out its token
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let session = state
        .auth_service
        .authenticate(&credentials.username, &credentials.password)?;
    let token = state.auth_service.generate_token(&session)?;
    state.sessions.save(&session).await?;
    info!("{} logged in", session.user_id);

    let cookie = Cookie::build((AUTH_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            user_id: session.user_id.clone(),
            role: session.role.as_str().to_string(),
        }),
    ))
}

/// End the session and drop its dashboard
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, StatusCode)> {
    state.dashboards.close(&session.id).await;
    state.sessions.clear(&session.id).await?;
    info!("{} logged out", session.user_id);

    let cookie = Cookie::build((AUTH_COOKIE, "")).path("/");
    Ok((jar.remove(cookie), StatusCode::NO_CONTENT))
}

async fn dispatch(
    state: &AppState,
    session: &Session,
    request: DashboardRequest,
) -> ApiResult<Json<DashboardSnapshot>> {
    let dashboard = state.dashboards.open(session).await;
    Ok(Json(dashboard.request(request).await?))
}

pub async fn calendar_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::Snapshot).await
}

pub async fn show_month_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<MonthBody>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::ShowMonth(body.month)).await
}

pub async fn navigate_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<NavigateBody>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::Navigate(body.direction)).await
}

pub async fn today_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::Today).await
}

pub async fn select_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<SelectBody>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::SelectDate(body.date)).await
}

pub async fn reload_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::Reload).await
}

pub async fn open_add_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<AddBody>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::OpenAdd(body.date)).await
}

pub async fn open_edit_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::OpenEdit(ScheduleId::new(id))).await
}

pub async fn set_field_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<FieldBody>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(
        &state,
        &session,
        DashboardRequest::SetField(body.field, body.value),
    )
    .await
}

pub async fn submit_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::Submit).await
}

pub async fn cancel_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::Cancel).await
}

pub async fn request_delete_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::RequestDelete).await
}

pub async fn cancel_delete_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::CancelDelete).await
}

pub async fn confirm_delete_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::ConfirmDelete).await
}

pub async fn dismiss_alert_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DashboardSnapshot>> {
    dispatch(&state, &session, DashboardRequest::DismissAlert).await
}
