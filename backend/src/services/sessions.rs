use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::SESSION_TOKEN_BYTES;
use crate::db::SessionStore;
use crate::error::Result;
use crate::models::Session;

/// 32 random bytes, hex encoded
pub fn generate_token() -> String {
    let bytes: [u8; SESSION_TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

pub async fn issue<S>(store: &S, user_id: Uuid, ttl: Duration) -> Result<Session>
where
    S: SessionStore + ?Sized,
{
    let token = generate_token();
    let session = store.insert_session(&token, user_id, Utc::now() + ttl).await?;
    info!(user_id = %user_id, expires_at = %session.expires_at, "Issued session");
    Ok(session)
}

/// Unknown and expired tokens both resolve to `None`; expired ones are
/// dropped on the way.
pub async fn resolve<S>(store: &S, token: &str) -> Result<Option<Uuid>>
where
    S: SessionStore + ?Sized,
{
    let Some(session) = store.find_session(token).await? else {
        debug!("Unknown session token");
        return Ok(None);
    };

    if session.is_expired(Utc::now()) {
        debug!(user_id = %session.user_id, "Session expired");
        store.delete_session(token).await?;
        return Ok(None);
    }

    Ok(Some(session.user_id))
}

pub async fn revoke<S>(store: &S, token: &str) -> Result<bool>
where
    S: SessionStore + ?Sized,
{
    Ok(store.delete_session(token).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn tokens_are_long_and_unique() {
        let first = generate_token();
        assert_eq!(first.len(), SESSION_TOKEN_BYTES * 2);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, generate_token());
    }

    #[tokio::test]
    async fn issue_resolve_revoke() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();

        let session = issue(&store, user_id, Duration::hours(1)).await.unwrap();
        assert_eq!(resolve(&store, &session.token).await.unwrap(), Some(user_id));

        assert!(revoke(&store, &session.token).await.unwrap());
        assert_eq!(resolve(&store, &session.token).await.unwrap(), None);
        assert!(!revoke(&store, &session.token).await.unwrap());
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let store = MemoryStore::new();
        let session = issue(&store, Uuid::new_v4(), Duration::hours(-1)).await.unwrap();

        assert_eq!(resolve(&store, &session.token).await.unwrap(), None);
        assert!(store.find_session(&session.token).await.unwrap().is_none());
    }
}
