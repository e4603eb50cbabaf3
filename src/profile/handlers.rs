use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{
        parse_goal, BodyDetailsExistResponse, SetWeightGoalRequest, UpsertBodyDetailsRequest,
        WeightGoalResponse,
    },
    repo_types::BodyDetails,
    services,
};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile/body-details",
            get(get_body_details).put(upsert_body_details),
        )
        .route("/profile/body-details/exists", get(body_details_exist))
        .route(
            "/profile/weight-goal",
            get(get_weight_goal).put(set_weight_goal),
        )
}

#[instrument(skip(state, payload))]
pub async fn upsert_body_details(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpsertBodyDetailsRequest>,
) -> AppResult<Json<BodyDetails>> {
    let patch = payload.patch().inspect_err(|e| {
        warn!(%user_id, error = %e, "rejected body details");
    })?;
    let goal = parse_goal(&payload.goal)?;

    let details = services::upsert_body_details(&state, user_id, &patch).await?;
    if goal.is_some() {
        services::set_weight_goal(&state, user_id, goal).await?;
    }
    Ok(Json(details))
}

#[instrument(skip(state))]
pub async fn get_body_details(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<BodyDetails>> {
    Ok(Json(services::body_details(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn body_details_exist(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<BodyDetailsExistResponse>> {
    let exists = services::body_details_exist(&state, user_id).await?;
    Ok(Json(BodyDetailsExistResponse { exists }))
}

#[instrument(skip(state, payload))]
pub async fn set_weight_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SetWeightGoalRequest>,
) -> AppResult<Json<WeightGoalResponse>> {
    let goal = parse_goal(&payload.goal)?;
    let goal = services::set_weight_goal(&state, user_id, goal).await?;
    Ok(Json(WeightGoalResponse { goal }))
}

#[instrument(skip(state))]
pub async fn get_weight_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<WeightGoalResponse>> {
    services::weight_goal(&state, user_id)
        .await?
        .map(|goal| Json(WeightGoalResponse { goal }))
        .ok_or_else(|| AppError::not_found("Weight goal not set"))
}
