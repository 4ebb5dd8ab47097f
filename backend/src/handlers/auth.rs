use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::constants::SESSION_COOKIE_NAME;
use crate::error::{AppError, Result};
use crate::handlers::extract::{ApiJson, CurrentUser};
use crate::handlers::response::Envelope;
use crate::models::User;
use crate::services::profiles::{self, SignupInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub user: User,
    pub token: String,
}

fn session_cookie(token: &str, max_age_secs: i64) -> Result<HeaderValue> {
    let cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.into()))
}

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignupInput>,
) -> Result<(StatusCode, Json<Envelope<User>>)> {
    let user = profiles::signup(state.store.as_ref(), input).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("User added successfully!", user)),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response> {
    let (user, session) = profiles::login(
        state.store.as_ref(),
        &req.email,
        &req.password,
        state.config.session_ttl(),
    )
    .await?;

    let max_age = (session.expires_at - session.created_at).num_seconds();
    let cookie = session_cookie(&session.token, max_age)?;
    let body = Envelope::success(
        "Login successful!",
        LoginData {
            user,
            token: session.token,
        },
    );

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Response> {
    profiles::logout(state.store.as_ref(), &current.token).await?;

    let cookie = session_cookie("", 0)?;
    let body = Envelope::success("Logout successful!", ());

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}
