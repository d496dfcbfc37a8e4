//! User and auth handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use roster_core::{DomainError, NewUser, TokenPayload, User, UserRole, UserUpdate};
use serde::{Deserialize, Serialize};

use crate::http::auth::ensure_admin;
use crate::http::error::ApiError;
use crate::http::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginReply {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<SignupBody>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .users
        .register(NewUser {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role.unwrap_or(UserRole::Basic),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginReply>, ApiError> {
    let bytes = state.auth.login(&body.email, &body.password).await?;
    let token = String::from_utf8(bytes).map_err(|_| DomainError::Internal)?;
    Ok(Json(LoginReply { token }))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .users
        .list_users(params.offset.unwrap_or(1), params.limit.unwrap_or(10))
        .await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get_user(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<TokenPayload>,
    Path(id): Path<u64>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<User>, ApiError> {
    ensure_admin(&caller)?;
    let user = state
        .users
        .update_user(UserUpdate {
            id,
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
        })
        .await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<TokenPayload>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&caller)?;
    state.users.delete_user(id).await?;
    Ok(StatusCode::OK)
}
