//! Connection request lifecycle: create (INTERESTED | IGNORED), review
//! (INTERESTED -> ACCEPTED | REJECTED, receiver only), and the two read-side
//! listings built on top of it.
//!
//! Every check here is repeated by the store where it matters under
//! concurrency: the pair lookup is backed by a unique index, and the review
//! is a compare-and-set on INTERESTED.

use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::PAIR_UNIQUE_CONSTRAINT;
use crate::db::{ConnectionStore, IdentityStore, StoreError};
use crate::error::{AppError, Rejection, Result};
use crate::models::{ConnectionRequest, ConnectionStatus, IncomingRequest, PublicProfile};

fn duplicate_pair() -> AppError {
    AppError::Conflict(Rejection::new(
        "Connection request already exists",
        "receiverId",
        "A connection request already exists between the users",
    ))
}

/// Success message for a request that now holds `status`
pub fn status_message(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Interested => "Connection request sent successfully!",
        ConnectionStatus::Ignored => "Profile ignored successfully!",
        ConnectionStatus::Accepted => "Connection request accepted!",
        ConnectionStatus::Rejected => "Connection request rejected!",
    }
}

/// The receiver of a new request must exist before anything else about the
/// request is judged.
pub async fn ensure_receiver_exists<S>(store: &S, receiver_id: Uuid) -> Result<()>
where
    S: IdentityStore + ?Sized,
{
    if store.find_user_by_id(receiver_id).await?.is_none() {
        return Err(AppError::NotFound(Rejection::new(
            "User not found",
            "receiverId",
            "No user found with the provided receiverId",
        )));
    }
    Ok(())
}

pub async fn create_request<S>(
    store: &S,
    sender_id: Uuid,
    receiver_id: Uuid,
    status: ConnectionStatus,
) -> Result<ConnectionRequest>
where
    S: IdentityStore + ConnectionStore + ?Sized,
{
    ensure_receiver_exists(store, receiver_id).await?;

    if !status.is_creation_status() {
        return Err(AppError::InvalidArgument(Rejection::new(
            "Invalid status type",
            "status",
            "Status must be either 'IGNORED' or 'INTERESTED'",
        )));
    }

    if sender_id == receiver_id {
        return Err(AppError::InvalidArgument(Rejection::new(
            "Invalid receiverId",
            "receiverId",
            "Cannot send a connection request to yourself",
        )));
    }

    if let Some(existing) = store.find_request_between(sender_id, receiver_id).await? {
        debug!(request_id = %existing.id, "Pair already has a connection request");
        return Err(duplicate_pair());
    }

    // A concurrent create for the same pair can pass the lookup above; the
    // pair index catches it.
    let request = match store.insert_request(sender_id, receiver_id, status).await {
        Ok(request) => request,
        Err(StoreError::UniqueViolation(constraint)) if constraint == PAIR_UNIQUE_CONSTRAINT => {
            warn!(sender_id = %sender_id, receiver_id = %receiver_id, "Lost race creating connection request");
            return Err(duplicate_pair());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        request_id = %request.id,
        sender_id = %sender_id,
        receiver_id = %receiver_id,
        status = %status,
        "Created connection request"
    );

    Ok(request)
}

pub async fn transition_request<S>(
    store: &S,
    request_id: Uuid,
    acting_user_id: Uuid,
    new_status: ConnectionStatus,
) -> Result<ConnectionRequest>
where
    S: ConnectionStore + ?Sized,
{
    if !new_status.is_review_status() {
        return Err(AppError::InvalidArgument(Rejection::new(
            "Invalid status type",
            "status",
            "Status must be either 'ACCEPTED' or 'REJECTED'",
        )));
    }

    let Some(request) = store.find_request_by_id(request_id).await? else {
        return Err(AppError::NotFound(Rejection::new(
            "Connection request not found",
            "requestId",
            "No connection request found with the provided requestId",
        )));
    };

    if request.receiver_id != acting_user_id {
        return Err(AppError::Forbidden(Rejection::new(
            "Not allowed to review this request",
            "requestId",
            "Only the receiver can review a connection request",
        )));
    }

    let already_reviewed = || {
        AppError::Conflict(Rejection::new(
            "Connection request already reviewed",
            "status",
            "Only INTERESTED requests can be accepted or rejected",
        ))
    };

    if request.status.is_terminal() {
        debug!(request_id = %request_id, status = %request.status, "Request is already terminal");
        return Err(already_reviewed());
    }

    let Some(updated) = store
        .update_request_status(request_id, ConnectionStatus::Interested, new_status)
        .await?
    else {
        warn!(request_id = %request_id, "Lost race reviewing connection request");
        return Err(already_reviewed());
    };

    info!(
        request_id = %request_id,
        receiver_id = %acting_user_id,
        status = %new_status,
        "Reviewed connection request"
    );

    Ok(updated)
}

async fn profiles_by_id<S>(store: &S, user_ids: &[Uuid]) -> Result<HashMap<Uuid, PublicProfile>>
where
    S: IdentityStore + ?Sized,
{
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let profiles = store.find_profiles_by_ids(user_ids).await?;
    Ok(profiles.into_iter().map(|profile| (profile.id, profile)).collect())
}

/// INTERESTED requests addressed to the caller, with each sender's public profile
pub async fn list_incoming_pending<S>(store: &S, caller_id: Uuid) -> Result<Vec<IncomingRequest>>
where
    S: IdentityStore + ConnectionStore + ?Sized,
{
    let requests = store
        .find_requests_received(caller_id, ConnectionStatus::Interested)
        .await?;

    let sender_ids: Vec<Uuid> = requests.iter().map(|r| r.sender_id).collect();
    let senders = profiles_by_id(store, &sender_ids).await?;

    Ok(requests
        .into_iter()
        .filter_map(|request| {
            let Some(sender) = senders.get(&request.sender_id) else {
                warn!(request_id = %request.id, "Sender of pending request no longer exists");
                return None;
            };
            Some(IncomingRequest {
                id: request.id,
                status: request.status,
                sender: sender.clone(),
                created_at: request.created_at,
            })
        })
        .collect())
}

/// Public profiles of the other party on every ACCEPTED request
pub async fn list_connections<S>(store: &S, caller_id: Uuid) -> Result<Vec<PublicProfile>>
where
    S: IdentityStore + ConnectionStore + ?Sized,
{
    let requests = store
        .find_requests_with_status(caller_id, ConnectionStatus::Accepted)
        .await?;

    let counterpart_ids: Vec<Uuid> = requests.iter().map(|r| r.counterpart(caller_id)).collect();
    let mut profiles = profiles_by_id(store, &counterpart_ids).await?;

    Ok(counterpart_ids
        .iter()
        .filter_map(|id| profiles.remove(id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::test_support::seed_user;
    use std::sync::Arc;

    const ALL_STATUSES: [ConnectionStatus; 4] = [
        ConnectionStatus::Interested,
        ConnectionStatus::Ignored,
        ConnectionStatus::Accepted,
        ConnectionStatus::Rejected,
    ];

    #[tokio::test]
    async fn create_persists_the_given_status() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;

        let request = create_request(&store, a, b, ConnectionStatus::Ignored).await.unwrap();
        assert_eq!(request.sender_id, a);
        assert_eq!(request.receiver_id, b);
        assert_eq!(request.status, ConnectionStatus::Ignored);
        assert_eq!(store.find_request_by_id(request.id).await.unwrap(), Some(request));
    }

    #[tokio::test]
    async fn create_rejects_unknown_receiver() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;

        let err = create_request(&store, a, Uuid::new_v4(), ConnectionStatus::Interested)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref r) if r.field == "receiverId"));
    }

    #[test]
    fn every_status_has_its_own_message() {
        let messages: std::collections::HashSet<_> =
            ALL_STATUSES.into_iter().map(status_message).collect();
        assert_eq!(messages.len(), ALL_STATUSES.len());
        assert_eq!(status_message(ConnectionStatus::Ignored), "Profile ignored successfully!");
        assert_eq!(status_message(ConnectionStatus::Accepted), "Connection request accepted!");
    }

    #[tokio::test]
    async fn create_rejects_review_statuses() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;

        for status in [ConnectionStatus::Accepted, ConnectionStatus::Rejected] {
            let err = create_request(&store, a, b, status).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(ref r) if r.field == "status"));
        }
    }

    #[tokio::test]
    async fn create_to_self_is_invalid_for_every_status() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;

        for status in ALL_STATUSES {
            let err = create_request(&store, a, a, status).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)), "status {status}");
        }
        assert!(store.find_requests_involving(a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_in_either_direction_conflicts() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;

        create_request(&store, a, b, ConnectionStatus::Interested).await.unwrap();

        for (sender, receiver) in [(a, b), (b, a)] {
            for status in [ConnectionStatus::Interested, ConnectionStatus::Ignored] {
                let err = create_request(&store, sender, receiver, status).await.unwrap_err();
                assert!(matches!(err, AppError::Conflict(_)));
            }
        }
    }

    #[tokio::test]
    async fn concurrent_creates_produce_one_record() {
        let store = Arc::new(MemoryStore::new());
        let a = seed_user(store.as_ref(), "a").await;
        let b = seed_user(store.as_ref(), "b").await;

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                let (sender, receiver) = if i % 2 == 0 { (a, b) } else { (b, a) };
                tokio::spawn(async move {
                    create_request(store.as_ref(), sender, receiver, ConnectionStatus::Interested).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, AppError::Conflict(_))),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.find_requests_involving(a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn receiver_accepts_once() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;
        let request = create_request(&store, a, b, ConnectionStatus::Interested).await.unwrap();

        let accepted = transition_request(&store, request.id, b, ConnectionStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(accepted.status, ConnectionStatus::Accepted);

        for status in [ConnectionStatus::Rejected, ConnectionStatus::Accepted] {
            let err = transition_request(&store, request.id, b, status).await.unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
        }

        let stored = store.find_request_by_id(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ConnectionStatus::Accepted);
    }

    #[tokio::test]
    async fn ignored_requests_cannot_be_reviewed() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;
        let request = create_request(&store, a, b, ConnectionStatus::Ignored).await.unwrap();

        let err = transition_request(&store, request.id, b, ConnectionStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn sender_is_always_forbidden() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;
        let c = seed_user(&store, "c").await;

        let pending = create_request(&store, a, b, ConnectionStatus::Interested).await.unwrap();
        let ignored = create_request(&store, a, c, ConnectionStatus::Ignored).await.unwrap();

        for request_id in [pending.id, ignored.id] {
            for status in [ConnectionStatus::Accepted, ConnectionStatus::Rejected] {
                let err = transition_request(&store, request_id, a, status).await.unwrap_err();
                assert!(matches!(err, AppError::Forbidden(_)));
            }
        }

        transition_request(&store, pending.id, b, ConnectionStatus::Rejected).await.unwrap();
        let err = transition_request(&store, pending.id, a, ConnectionStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn outsiders_are_forbidden_and_unknown_ids_not_found() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;
        let c = seed_user(&store, "c").await;
        let request = create_request(&store, a, b, ConnectionStatus::Interested).await.unwrap();

        let err = transition_request(&store, request.id, c, ConnectionStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = transition_request(&store, Uuid::new_v4(), b, ConnectionStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn review_rejects_creation_statuses() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;
        let request = create_request(&store, a, b, ConnectionStatus::Interested).await.unwrap();

        for status in [ConnectionStatus::Interested, ConnectionStatus::Ignored] {
            let err = transition_request(&store, request.id, b, status).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)));
        }
    }

    #[tokio::test]
    async fn concurrent_reviews_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let a = seed_user(store.as_ref(), "a").await;
        let b = seed_user(store.as_ref(), "b").await;
        let request = create_request(store.as_ref(), a, b, ConnectionStatus::Interested)
            .await
            .unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = store.clone();
                let status = if i % 2 == 0 {
                    ConnectionStatus::Accepted
                } else {
                    ConnectionStatus::Rejected
                };
                tokio::spawn(async move { transition_request(store.as_ref(), request.id, b, status).await })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(updated) => winners.push(updated.status),
                Err(err) => assert!(matches!(err, AppError::Conflict(_))),
            }
        }

        assert_eq!(winners.len(), 1);
        let stored = store.find_request_by_id(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, winners[0]);
    }

    #[tokio::test]
    async fn listings_follow_the_lifecycle() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a").await;
        let b = seed_user(&store, "b").await;
        let c = seed_user(&store, "c").await;

        let ab = create_request(&store, a, b, ConnectionStatus::Interested).await.unwrap();
        create_request(&store, c, b, ConnectionStatus::Ignored).await.unwrap();

        let pending = list_incoming_pending(&store, b).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, ab.id);
        assert_eq!(pending[0].sender.id, a);
        assert!(list_incoming_pending(&store, a).await.unwrap().is_empty());

        transition_request(&store, ab.id, b, ConnectionStatus::Accepted).await.unwrap();

        assert!(list_incoming_pending(&store, b).await.unwrap().is_empty());
        let ids = |profiles: Vec<PublicProfile>| profiles.into_iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids(list_connections(&store, a).await.unwrap()), vec![b]);
        assert_eq!(ids(list_connections(&store, b).await.unwrap()), vec![a]);
        assert!(list_connections(&store, c).await.unwrap().is_empty());
    }
}
