use async_trait::async_trait;
use uuid::Uuid;

use super::{IdentityStore, PgStore, StoreResult};
use crate::models::{NewUser, ProfilePatch, PublicProfile, User};
use crate::constants::{DEFAULT_ABOUT, DEFAULT_PHOTO_URL};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, age, gender, \
     photo_url, about, skills, created_at, updated_at";

const PROFILE_COLUMNS: &str = "id, first_name, last_name, age, about, photo_url, skills";

#[async_trait]
impl IdentityStore for PgStore {
    async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, photo_url, about)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(DEFAULT_PHOTO_URL)
        .bind(DEFAULT_ABOUT)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_profiles_by_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<PublicProfile>> {
        let profiles = sqlx::query_as::<_, PublicProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn find_profiles_excluding(&self, hidden: &[Uuid]) -> StoreResult<Vec<PublicProfile>> {
        let profiles = sqlx::query_as::<_, PublicProfile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM users
            WHERE NOT (id = ANY($1))
            ORDER BY created_at, id
            "#
        ))
        .bind(hidden)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn update_profile(&self, user_id: Uuid, patch: &ProfilePatch) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET age = COALESCE($2, age),
                gender = COALESCE($3, gender),
                photo_url = COALESCE($4, photo_url),
                about = COALESCE($5, about),
                skills = COALESCE($6, skills),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(patch.age)
        .bind(patch.gender)
        .bind(patch.photo_url.as_deref())
        .bind(patch.about.as_deref())
        .bind(patch.skills.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
