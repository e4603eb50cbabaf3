use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        AccumulateRequest, CreateLogRequest, LogDetailsResponse, LogsResponse, MarkStatusRequest,
        Pagination, UpdateLogRequest,
    },
    repo_types::{CalorieKind, CalorieLog},
    services,
};
use crate::{
    auth::services::AuthUser,
    dates::{parse_date, today_utc},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn logs_routes() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list_logs).post(create_log))
        .route(
            "/logs/:date",
            get(get_log).patch(update_log).delete(delete_log),
        )
        .route("/logs/:date/consumed", post(add_consumed))
        .route("/logs/:date/burnt", post(add_burnt))
        .route("/logs/:date/status", put(mark_status))
}

/// The body is optional; a request without one logs today.
#[instrument(skip(state, payload))]
pub async fn create_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateLogRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CalorieLog>)> {
    let payload = match payload {
        Ok(Json(p)) => p,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateLogRequest::default(),
        Err(e) => return Err(AppError::validation(e.body_text())),
    };
    let log = services::create_log(&state, user_id, payload.log_date, today_utc()).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> AppResult<Json<LogsResponse>> {
    let (limit, offset) = p.clamped();
    let logs = services::list_logs(&state, user_id, limit, offset).await?;
    Ok(Json(LogsResponse { logs }))
}

#[instrument(skip(state))]
pub async fn get_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> AppResult<Json<LogDetailsResponse>> {
    let details = services::get_log(&state, user_id, parse_date(&date)?).await?;
    Ok(Json(LogDetailsResponse {
        log: details.log,
        caloric_balance: details.caloric_balance,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(payload): Json<UpdateLogRequest>,
) -> AppResult<Json<CalorieLog>> {
    let log_date = parse_date(&date)?;
    let log = services::update_log(&state, user_id, log_date, payload.delta()?).await?;
    Ok(Json(log))
}

#[instrument(skip(state, payload))]
pub async fn add_consumed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(payload): Json<AccumulateRequest>,
) -> AppResult<Json<CalorieLog>> {
    let log_date = parse_date(&date)?;
    let log = services::accumulate(
        &state,
        user_id,
        log_date,
        CalorieKind::Consumed,
        payload.delta,
    )
    .await?;
    Ok(Json(log))
}

#[instrument(skip(state, payload))]
pub async fn add_burnt(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(payload): Json<AccumulateRequest>,
) -> AppResult<Json<CalorieLog>> {
    let log_date = parse_date(&date)?;
    let log =
        services::accumulate(&state, user_id, log_date, CalorieKind::Burnt, payload.delta).await?;
    Ok(Json(log))
}

#[instrument(skip(state, payload))]
pub async fn mark_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(payload): Json<MarkStatusRequest>,
) -> AppResult<Json<CalorieLog>> {
    let log_date = parse_date(&date)?;
    let log = services::mark_status(&state, user_id, log_date, payload.status()?).await?;
    Ok(Json(log))
}

#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> AppResult<StatusCode> {
    services::delete_log(&state, user_id, parse_date(&date)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
