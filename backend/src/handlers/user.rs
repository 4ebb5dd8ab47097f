use axum::{extract::State, Json};

use crate::error::Result;
use crate::handlers::extract::CurrentUser;
use crate::handlers::response::Envelope;
use crate::models::{IncomingRequest, PublicProfile};
use crate::services::{feed as feed_service, requests};
use crate::state::AppState;

pub async fn requests_received(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<Vec<IncomingRequest>>>> {
    let pending = requests::list_incoming_pending(state.store.as_ref(), current.user.id).await?;

    let message = if pending.is_empty() {
        "No pending connection requests"
    } else {
        "Pending connection requests fetched successfully"
    };

    Ok(Json(Envelope::success(message, pending)))
}

pub async fn connections(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<Vec<PublicProfile>>>> {
    let connections = requests::list_connections(state.store.as_ref(), current.user.id).await?;

    let message = if connections.is_empty() {
        "No connections found"
    } else {
        "Connections fetched successfully"
    };

    Ok(Json(Envelope::success(message, connections)))
}

pub async fn feed(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<Vec<PublicProfile>>>> {
    let profiles = feed_service::build_feed(state.store.as_ref(), current.user.id).await?;

    let message = if profiles.is_empty() {
        "No new profiles to show"
    } else {
        "Feed fetched successfully"
    };

    Ok(Json(Envelope::success(message, profiles)))
}
