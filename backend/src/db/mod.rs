//! Persistence contracts and their two implementations: [`PgStore`] backed by
//! Postgres and [`MemoryStore`] for tests and local runs.
//!
//! Invariants that must survive concurrent callers (pair uniqueness, status
//! compare-and-set, email uniqueness) are enforced here, by the store, and
//! surface as [`StoreError::UniqueViolation`] or an unmatched conditional
//! update.

pub mod connection;
pub mod connection_requests;
pub mod memory;
pub mod migrations;
pub mod sessions;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ConnectionRequest, ConnectionStatus, NewUser, ProfilePatch, PublicProfile, Session, User,
};

pub use connection::{get_db_pool, DatabaseConfig, PgStore};
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fails with `UniqueViolation` when the email is taken
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    /// `email` must already be normalized
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Public profiles of the given users (in-set filter)
    async fn find_profiles_by_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<PublicProfile>>;

    /// Public profiles of everyone not in `hidden` (not-in-set filter), in
    /// store iteration order
    async fn find_profiles_excluding(&self, hidden: &[Uuid]) -> StoreResult<Vec<PublicProfile>>;

    async fn update_profile(&self, user_id: Uuid, patch: &ProfilePatch) -> StoreResult<Option<User>>;

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Fails with `UniqueViolation` when any request already exists for the
    /// unordered pair
    async fn insert_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        status: ConnectionStatus,
    ) -> StoreResult<ConnectionRequest>;

    async fn find_request_by_id(&self, request_id: Uuid) -> StoreResult<Option<ConnectionRequest>>;

    /// Looks up both directions
    async fn find_request_between(
        &self,
        user_id_1: Uuid,
        user_id_2: Uuid,
    ) -> StoreResult<Option<ConnectionRequest>>;

    /// Every request where the user is sender or receiver, any status
    async fn find_requests_involving(&self, user_id: Uuid) -> StoreResult<Vec<ConnectionRequest>>;

    async fn find_requests_received(
        &self,
        receiver_id: Uuid,
        status: ConnectionStatus,
    ) -> StoreResult<Vec<ConnectionRequest>>;

    async fn find_requests_with_status(
        &self,
        user_id: Uuid,
        status: ConnectionStatus,
    ) -> StoreResult<Vec<ConnectionRequest>>;

    /// Compare-and-set: moves the request to `to` only while it is still in
    /// `from`. `None` means the request is gone or no longer in `from`.
    async fn update_request_status(
        &self,
        request_id: Uuid,
        from: ConnectionStatus,
        to: ConnectionStatus,
    ) -> StoreResult<Option<ConnectionRequest>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Session>;

    async fn find_session(&self, token: &str) -> StoreResult<Option<Session>>;

    async fn delete_session(&self, token: &str) -> StoreResult<bool>;
}

/// Everything the service needs from persistence
pub trait Store: IdentityStore + ConnectionStore + SessionStore {}

impl<T> Store for T where T: IdentityStore + ConnectionStore + SessionStore {}
