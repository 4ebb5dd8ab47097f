use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::PublicProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "connection_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Interested,
    Ignored,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    /// Statuses a sender may create a request with
    pub fn is_creation_status(self) -> bool {
        matches!(self, ConnectionStatus::Interested | ConnectionStatus::Ignored)
    }

    /// Statuses a receiver may move a pending request to
    pub fn is_review_status(self) -> bool {
        matches!(self, ConnectionStatus::Accepted | ConnectionStatus::Rejected)
    }

    /// Only INTERESTED can still change
    pub fn is_terminal(self) -> bool {
        !matches!(self, ConnectionStatus::Interested)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Interested => "INTERESTED",
            ConnectionStatus::Ignored => "IGNORED",
            ConnectionStatus::Accepted => "ACCEPTED",
            ConnectionStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a valid status")]
pub struct UnknownStatus(pub String);

impl FromStr for ConnectionStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "INTERESTED" => Ok(ConnectionStatus::Interested),
            "IGNORED" => Ok(ConnectionStatus::Ignored),
            "ACCEPTED" => Ok(ConnectionStatus::Accepted),
            "REJECTED" => Ok(ConnectionStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConnectionRequest {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// The party on the record that is not `user_id`
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    /// Unordered pair key, smaller id first
    pub fn pair_key(&self) -> (Uuid, Uuid) {
        normalized_pair(self.sender_id, self.receiver_id)
    }
}

pub fn normalized_pair(user_id_1: Uuid, user_id_2: Uuid) -> (Uuid, Uuid) {
    if user_id_1 < user_id_2 {
        (user_id_1, user_id_2)
    } else {
        (user_id_2, user_id_1)
    }
}

/// A pending request as shown to its receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    pub id: Uuid,
    pub status: ConnectionStatus,
    pub sender: PublicProfile,
    pub created_at: DateTime<Utc>,
}
