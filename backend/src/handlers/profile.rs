use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::handlers::extract::{ApiJson, CurrentUser};
use crate::handlers::response::Envelope;
use crate::models::User;
use crate::services::profiles;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn view_profile(current: CurrentUser) -> Json<Envelope<User>> {
    Json(Envelope::success("Profile fetched successfully", current.user))
}

pub async fn edit_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<Envelope<User>>> {
    let user = profiles::edit_profile(state.store.as_ref(), &current.user, &body).await?;
    let message = format!("{}, your profile was updated successfully", user.first_name);

    Ok(Json(Envelope::success(message, user)))
}

pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<Json<Envelope<User>>> {
    let user = profiles::change_password(
        state.store.as_ref(),
        &current.user,
        &req.current_password,
        &req.new_password,
    )
    .await?;

    Ok(Json(Envelope::success("Password updated successfully", user)))
}
