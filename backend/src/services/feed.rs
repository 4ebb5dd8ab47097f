use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use crate::db::{ConnectionStore, IdentityStore};
use crate::error::Result;
use crate::models::PublicProfile;

/// The caller plus everyone they share a request with, in any status.
/// IGNORED counts too: once two users have interacted they never resurface.
pub async fn hidden_user_ids<S>(store: &S, caller_id: Uuid) -> Result<Vec<Uuid>>
where
    S: ConnectionStore + ?Sized,
{
    let requests = store.find_requests_involving(caller_id).await?;

    let mut hidden = HashSet::with_capacity(requests.len() * 2 + 1);
    hidden.insert(caller_id);
    for request in &requests {
        hidden.insert(request.sender_id);
        hidden.insert(request.receiver_id);
    }

    Ok(hidden.into_iter().collect())
}

/// Every user the caller has not interacted with yet. No paging, and the
/// order is whatever the store iterates in.
pub async fn build_feed<S>(store: &S, caller_id: Uuid) -> Result<Vec<PublicProfile>>
where
    S: IdentityStore + ConnectionStore + ?Sized,
{
    let hidden = hidden_user_ids(store, caller_id).await?;
    let feed = store.find_profiles_excluding(&hidden).await?;

    debug!(caller_id = %caller_id, hidden = hidden.len(), shown = feed.len(), "Built feed");

    Ok(feed)
}
