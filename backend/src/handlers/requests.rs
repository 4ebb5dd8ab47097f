use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Rejection, Result};
use crate::handlers::extract::{ApiJson, CurrentUser};
use crate::handlers::response::Envelope;
use crate::models::{ConnectionRequest, ConnectionStatus};
use crate::services::requests;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    #[serde(default)]
    pub receiver_id: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub status: String,
}

fn parse_id(raw: &str, field: &'static str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        AppError::InvalidArgument(Rejection::new(
            format!("Invalid {field}"),
            field,
            format!("'{raw}' is not a valid id"),
        ))
    })
}

fn parse_status(raw: &str) -> Result<ConnectionStatus> {
    raw.parse::<ConnectionStatus>().map_err(|e| {
        AppError::InvalidArgument(Rejection::new("Invalid status type", "status", e.to_string()))
    })
}

pub async fn send_request(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<SendRequest>,
) -> Result<(StatusCode, Json<Envelope<ConnectionRequest>>)> {
    let receiver_id = parse_id(&req.receiver_id, "receiverId")?;
    // An unknown receiver is reported before an unreadable status
    let status = match parse_status(&req.status) {
        Ok(status) => status,
        Err(e) => {
            requests::ensure_receiver_exists(state.store.as_ref(), receiver_id).await?;
            return Err(e);
        }
    };

    let request =
        requests::create_request(state.store.as_ref(), current.user.id, receiver_id, status).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(requests::status_message(status), request)),
    ))
}

pub async fn review_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(request_id): Path<String>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> Result<Json<Envelope<ConnectionRequest>>> {
    let request_id = parse_id(&request_id, "requestId")?;
    let status = parse_status(&req.status)?;

    let request =
        requests::transition_request(state.store.as_ref(), request_id, current.user.id, status).await?;

    Ok(Json(Envelope::success(requests::status_message(status), request)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_and_statuses_are_invalid_arguments() {
        assert!(matches!(parse_id("not-a-uuid", "receiverId"), Err(AppError::InvalidArgument(ref r)) if r.field == "receiverId"));
        assert!(parse_id(&Uuid::new_v4().to_string(), "receiverId").is_ok());

        assert!(matches!(parse_status("MAYBE"), Err(AppError::InvalidArgument(ref r)) if r.field == "status"));
        assert_eq!(parse_status("IGNORED").unwrap(), ConnectionStatus::Ignored);
    }
}
