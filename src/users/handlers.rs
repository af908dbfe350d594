use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateUserRequest, UserResponse};
use super::password::hash_password;
use crate::{error::ApiError, state::AppState, store::NewUser};

const MIN_PASSWORD_LEN: usize = 8;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// POST /users
///
/// The store does not enforce unique usernames, so this handler checks
/// before inserting.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<UserResponse>), ApiError> {
    let Json(mut payload) = payload?;
    payload.username = payload.username.trim().to_string();

    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(ApiError::Validation(
            "Username must be 3-32 letters, digits, '.', '_' or '-'".into(),
        ));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }

    if state.store.get_user_by_username(&payload.username)?.is_some() {
        warn!(username = %payload.username, "username already taken");
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let password = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e.to_string())
    })?;

    let user = state.store.create_user(NewUser {
        username: payload.username,
        password,
    })?;

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/api/users/{}", user.id))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    headers.insert(header::LOCATION, location);

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(UserResponse {
            success: true,
            user: user.into(),
        }),
    ))
}

/// GET /users/:id
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(id) = id?;
    let user = state
        .store
        .get_user(id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse {
        success: true,
        user: user.into(),
    }))
}
