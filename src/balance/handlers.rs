use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use super::services;
use crate::{auth::services::AuthUser, error::AppResult, state::AppState};

#[derive(Debug, Serialize)]
pub struct NetCaloricBalanceResponse {
    pub net_caloric_balance: f64,
}

pub fn balance_routes() -> Router<AppState> {
    Router::new().route("/balance", get(get_net_caloric_balance))
}

#[instrument(skip(state))]
pub async fn get_net_caloric_balance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<NetCaloricBalanceResponse>> {
    let net_caloric_balance = services::net_caloric_balance(&state, user_id).await?;
    Ok(Json(NetCaloricBalanceResponse {
        net_caloric_balance,
    }))
}
