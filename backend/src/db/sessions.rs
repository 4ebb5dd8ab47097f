use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{PgStore, SessionStore, StoreResult};
use crate::models::Session;

#[async_trait]
impl SessionStore for PgStore {
    async fn insert_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, created_at, expires_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    async fn find_session(&self, token: &str) -> StoreResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT token, user_id, created_at, expires_at
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn delete_session(&self, token: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
