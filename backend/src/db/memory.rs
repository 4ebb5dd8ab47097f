//! In-process store with the same guarantees as the Postgres schema: unique
//! lowercase emails, one request per unordered pair and compare-and-set
//! status updates. Each check and its write happen under one write lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ConnectionStore, IdentityStore, SessionStore, StoreError, StoreResult};
use crate::constants::{
    DEFAULT_ABOUT, DEFAULT_PHOTO_URL, EMAIL_UNIQUE_CONSTRAINT, PAIR_UNIQUE_CONSTRAINT,
};
use crate::models::{
    connection_requests::normalized_pair, ConnectionRequest, ConnectionStatus, NewUser,
    ProfilePatch, PublicProfile, Session, User,
};

#[derive(Default)]
struct Requests {
    // Insertion order doubles as iteration order
    records: Vec<ConnectionRequest>,
    pairs: HashSet<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    requests: RwLock<Requests>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|user| user.email == new_user.email) {
            return Err(StoreError::UniqueViolation(EMAIL_UNIQUE_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            age: None,
            gender: None,
            photo_url: DEFAULT_PHOTO_URL.to_string(),
            about: DEFAULT_ABOUT.to_string(),
            skills: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_profiles_by_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<PublicProfile>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|user| user_ids.contains(&user.id))
            .map(User::public_profile)
            .collect())
    }

    async fn find_profiles_excluding(&self, hidden: &[Uuid]) -> StoreResult<Vec<PublicProfile>> {
        let hidden: HashSet<&Uuid> = hidden.iter().collect();
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|user| !hidden.contains(&user.id))
            .map(User::public_profile)
            .collect())
    }

    async fn update_profile(&self, user_id: Uuid, patch: &ProfilePatch) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|user| user.id == user_id) else {
            return Ok(None);
        };

        patch.apply_to(user);
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|user| user.id == user_id) else {
            return Ok(None);
        };

        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl ConnectionStore for MemoryStore {
    async fn insert_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        status: ConnectionStatus,
    ) -> StoreResult<ConnectionRequest> {
        let mut requests = self.requests.write().await;
        let pair = normalized_pair(sender_id, receiver_id);
        if !requests.pairs.insert(pair) {
            return Err(StoreError::UniqueViolation(PAIR_UNIQUE_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let request = ConnectionRequest {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            status,
            created_at: now,
            updated_at: now,
        };
        requests.records.push(request.clone());

        Ok(request)
    }

    async fn find_request_by_id(&self, request_id: Uuid) -> StoreResult<Option<ConnectionRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.records.iter().find(|request| request.id == request_id).cloned())
    }

    async fn find_request_between(
        &self,
        user_id_1: Uuid,
        user_id_2: Uuid,
    ) -> StoreResult<Option<ConnectionRequest>> {
        let pair = normalized_pair(user_id_1, user_id_2);
        let requests = self.requests.read().await;
        Ok(requests
            .records
            .iter()
            .find(|request| request.pair_key() == pair)
            .cloned())
    }

    async fn find_requests_involving(&self, user_id: Uuid) -> StoreResult<Vec<ConnectionRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .records
            .iter()
            .filter(|request| request.involves(user_id))
            .cloned()
            .collect())
    }

    async fn find_requests_received(
        &self,
        receiver_id: Uuid,
        status: ConnectionStatus,
    ) -> StoreResult<Vec<ConnectionRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .records
            .iter()
            .filter(|request| request.receiver_id == receiver_id && request.status == status)
            .cloned()
            .collect())
    }

    async fn find_requests_with_status(
        &self,
        user_id: Uuid,
        status: ConnectionStatus,
    ) -> StoreResult<Vec<ConnectionRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .records
            .iter()
            .filter(|request| request.involves(user_id) && request.status == status)
            .cloned()
            .collect())
    }

    async fn update_request_status(
        &self,
        request_id: Uuid,
        from: ConnectionStatus,
        to: ConnectionStatus,
    ) -> StoreResult<Option<ConnectionRequest>> {
        let mut requests = self.requests.write().await;
        let Some(request) = requests
            .records
            .iter_mut()
            .find(|request| request.id == request_id && request.status == from)
        else {
            return Ok(None);
        };

        request.status = to;
        request.updated_at = Utc::now();

        Ok(Some(request.clone()))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Session> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(token) {
            return Err(StoreError::UniqueViolation("sessions_pkey".to_string()));
        }

        let session = Session {
            token: token.to_string(),
            user_id,
            created_at: Utc::now(),
            expires_at,
        };
        sessions.insert(token.to_string(), session.clone());

        Ok(session)
    }

    async fn find_session(&self, token: &str) -> StoreResult<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> StoreResult<bool> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(token).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a@example.com")).await.unwrap();

        let err = store.insert_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(name) if name == EMAIL_UNIQUE_CONSTRAINT));
    }

    #[tokio::test]
    async fn reverse_direction_hits_the_pair_constraint() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.insert_request(a, b, ConnectionStatus::Interested).await.unwrap();
        let err = store
            .insert_request(b, a, ConnectionStatus::Ignored)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(name) if name == PAIR_UNIQUE_CONSTRAINT));
    }

    #[tokio::test]
    async fn concurrent_inserts_for_one_pair_keep_a_single_record() {
        let store = Arc::new(MemoryStore::new());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let (sender, receiver) = if i % 2 == 0 { (a, b) } else { (b, a) };
            handles.push(tokio::spawn(async move {
                store
                    .insert_request(sender, receiver, ConnectionStatus::Interested)
                    .await
                    .is_ok()
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.find_requests_involving(a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_update_is_compare_and_set() {
        let store = MemoryStore::new();
        let request = store
            .insert_request(Uuid::new_v4(), Uuid::new_v4(), ConnectionStatus::Interested)
            .await
            .unwrap();

        let accepted = store
            .update_request_status(request.id, ConnectionStatus::Interested, ConnectionStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(accepted.map(|r| r.status), Some(ConnectionStatus::Accepted));

        let rejected = store
            .update_request_status(request.id, ConnectionStatus::Interested, ConnectionStatus::Rejected)
            .await
            .unwrap();
        assert!(rejected.is_none());

        let stored = store.find_request_by_id(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ConnectionStatus::Accepted);
    }

    #[tokio::test]
    async fn feed_filter_keeps_insertion_order() {
        let store = MemoryStore::new();
        let a = store.insert_user(new_user("a@example.com")).await.unwrap();
        let b = store.insert_user(new_user("b@example.com")).await.unwrap();
        let c = store.insert_user(new_user("c@example.com")).await.unwrap();

        let profiles = store.find_profiles_excluding(&[b.id]).await.unwrap();
        let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }
}
