use async_trait::async_trait;
use uuid::Uuid;

use super::{ConnectionStore, PgStore, StoreResult};
use crate::models::{ConnectionRequest, ConnectionStatus};

#[async_trait]
impl ConnectionStore for PgStore {
    async fn insert_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        status: ConnectionStatus,
    ) -> StoreResult<ConnectionRequest> {
        // connection_requests_pair_key rejects a second row for the same pair
        let request = sqlx::query_as::<_, ConnectionRequest>(
            r#"
            INSERT INTO connection_requests (id, sender_id, receiver_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sender_id, receiver_id, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sender_id)
        .bind(receiver_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_request_by_id(&self, request_id: Uuid) -> StoreResult<Option<ConnectionRequest>> {
        let request = sqlx::query_as::<_, ConnectionRequest>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM connection_requests
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_request_between(
        &self,
        user_id_1: Uuid,
        user_id_2: Uuid,
    ) -> StoreResult<Option<ConnectionRequest>> {
        let request = sqlx::query_as::<_, ConnectionRequest>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM connection_requests
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            LIMIT 1
            "#,
        )
        .bind(user_id_1)
        .bind(user_id_2)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_requests_involving(&self, user_id: Uuid) -> StoreResult<Vec<ConnectionRequest>> {
        let requests = sqlx::query_as::<_, ConnectionRequest>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM connection_requests
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn find_requests_received(
        &self,
        receiver_id: Uuid,
        status: ConnectionStatus,
    ) -> StoreResult<Vec<ConnectionRequest>> {
        let requests = sqlx::query_as::<_, ConnectionRequest>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM connection_requests
            WHERE receiver_id = $1 AND status = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(receiver_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn find_requests_with_status(
        &self,
        user_id: Uuid,
        status: ConnectionStatus,
    ) -> StoreResult<Vec<ConnectionRequest>> {
        let requests = sqlx::query_as::<_, ConnectionRequest>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at, updated_at
            FROM connection_requests
            WHERE (sender_id = $1 OR receiver_id = $1) AND status = $2
            ORDER BY updated_at ASC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn update_request_status(
        &self,
        request_id: Uuid,
        from: ConnectionStatus,
        to: ConnectionStatus,
    ) -> StoreResult<Option<ConnectionRequest>> {
        let request = sqlx::query_as::<_, ConnectionRequest>(
            r#"
            UPDATE connection_requests
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, sender_id, receiver_id, status, created_at, updated_at
            "#,
        )
        .bind(request_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }
}
