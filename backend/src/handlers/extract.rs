use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;

use crate::constants::SESSION_COOKIE_NAME;
use crate::error::{AppError, Rejection};
use crate::models::User;
use crate::services::sessions;
use crate::state::AppState;

/// The authenticated caller, resolved from the session token. Handlers take
/// this as an argument and pass the identity down explicitly.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(AppError::unauthorized)?;

        let user_id = sessions::resolve(state.store.as_ref(), &token)
            .await?
            .ok_or_else(AppError::unauthorized)?;

        let user = state
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(AppError::unauthorized)?;

        Ok(CurrentUser { user, token })
    }
}

/// `Authorization: Bearer <token>` first, then the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Json` whose rejection is rendered in the error envelope
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(AppError::InvalidArgument(Rejection::new(
                "Invalid request body",
                "body",
                rejection.body_text(),
            ))),
        }
    }
}
