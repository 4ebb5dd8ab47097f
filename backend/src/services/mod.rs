pub mod credentials;
pub mod feed;
pub mod profiles;
pub mod requests;
pub mod sessions;

#[cfg(test)]
pub(crate) mod test_support {
    use uuid::Uuid;

    use crate::db::IdentityStore;
    use crate::models::NewUser;

    /// Inserts `<name>-user` with email `<name>@example.com` and returns its id
    pub async fn seed_user<S>(store: &S, name: &str) -> Uuid
    where
        S: IdentityStore + ?Sized,
    {
        store
            .insert_user(NewUser {
                first_name: format!("{name}-user"),
                last_name: "Test".to_string(),
                email: format!("{name}@example.com"),
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap()
            .id
    }
}
