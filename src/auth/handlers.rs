use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, SignupRequest},
        repo_types::User,
        services::{
            hash_password, is_valid_username, verify_password, AuthUser, MIN_PASSWORD_LEN,
        },
        tokens::{JwtKeys, TokenKind},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        access_token: keys.sign(user.id, TokenKind::Access)?,
        refresh_token: keys.sign(user.id, TokenKind::Refresh)?,
        user: user.into(),
    })
}

fn bad_credentials() -> AppError {
    AppError::unauthenticated("Username or password is incorrect")
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> AppResult<Json<AuthResponse>> {
    let username = payload.username.trim().to_lowercase();
    let name = payload.name.trim();

    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if !is_valid_username(&username) {
        warn!(%username, "invalid username");
        return Err(AppError::validation("Invalid username"));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }

    if state.users.find_by_username(&username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(AppError::conflict("Username already exists"));
    }

    let hash = hash_password(&payload.password)?;
    let user = state
        .users
        .create(name, &username, &hash)
        .await?
        .ok_or_else(|| {
            warn!(%username, "username taken during signup");
            AppError::conflict("Username already exists")
        })?;

    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let username = payload.username.trim().to_lowercase();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Please enter correct details"));
    }

    let Some(user) = state.users.find_by_username(&username).await? else {
        warn!(%username, "login for unknown username");
        return Err(bad_credentials());
    };
    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(bad_credentials());
    }

    info!(user_id = %user.id, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user_id = JwtKeys::from_ref(&state)
        .verify(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            AppError::unauthenticated("Invalid or expired refresh token")
        })?;

    let user = load_user(&state, user_id).await?;
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(load_user(&state, user_id).await?.into()))
}

/// A valid token whose user no longer exists is treated as unauthenticated.
async fn load_user(state: &AppState, user_id: Uuid) -> AppResult<User> {
    state.users.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(%user_id, "token for unknown user");
        AppError::unauthenticated("User not found")
    })
}
