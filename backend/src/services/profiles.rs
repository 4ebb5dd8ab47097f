use chrono::Duration;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::EMAIL_UNIQUE_CONSTRAINT;
use crate::db::{IdentityStore, SessionStore, StoreError};
use crate::error::{AppError, Rejection, Result};
use crate::models::{NewUser, Session, User};
use crate::services::{credentials, sessions};
use crate::utils::validation::{self, FieldError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized(Rejection::new(
        "Invalid credentials!",
        "credentials",
        "Email or password is incorrect",
    ))
}

fn user_gone(user_id: Uuid) -> AppError {
    AppError::NotFound(Rejection::new(
        "User not found",
        "userId",
        format!("No user found with id {user_id}"),
    ))
}

fn validate_signup(input: &SignupInput) -> Result<(), FieldError> {
    validation::validate_first_name(&input.first_name)?;
    validation::validate_last_name(&input.last_name)?;
    validation::validate_email(&input.email)?;
    validation::validate_password_strength(&input.password)?;
    Ok(())
}

pub async fn signup<S>(store: &S, input: SignupInput) -> Result<User>
where
    S: IdentityStore + ?Sized,
{
    validate_signup(&input).map_err(|e| e.into_app_error("Invalid signup data"))?;

    let new_user = NewUser {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email: validation::normalize_email(&input.email),
        password_hash: credentials::hash_password(&input.password)?,
    };

    let user = match store.insert_user(new_user).await {
        Ok(user) => user,
        Err(StoreError::UniqueViolation(constraint)) if constraint == EMAIL_UNIQUE_CONSTRAINT => {
            return Err(AppError::Conflict(Rejection::new(
                "Email already registered",
                "email",
                "An account with this email already exists",
            )));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, "User signed up");
    Ok(user)
}

pub async fn login<S>(store: &S, email: &str, password: &str, ttl: Duration) -> Result<(User, Session)>
where
    S: IdentityStore + SessionStore + ?Sized,
{
    let email = validation::normalize_email(email);
    let Some(user) = store.find_user_by_email(&email).await? else {
        debug!("Login attempt for unknown email");
        return Err(invalid_credentials());
    };

    if !credentials::verify_password(&user.password_hash, password)? {
        debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(invalid_credentials());
    }

    let session = sessions::issue(store, user.id, ttl).await?;
    info!(user_id = %user.id, "User logged in");
    Ok((user, session))
}

pub async fn logout<S>(store: &S, token: &str) -> Result<()>
where
    S: SessionStore + ?Sized,
{
    if sessions::revoke(store, token).await? {
        info!("User logged out");
    }
    Ok(())
}

pub async fn edit_profile<S>(store: &S, caller: &User, body: &Map<String, Value>) -> Result<User>
where
    S: IdentityStore + ?Sized,
{
    let patch = validation::parse_profile_edit(body)
        .map_err(|e| e.into_app_error("Update not allowed!"))?;

    if patch.is_empty() {
        return Ok(caller.clone());
    }

    let user = store
        .update_profile(caller.id, &patch)
        .await?
        .ok_or_else(|| user_gone(caller.id))?;

    info!(user_id = %user.id, "Profile updated");
    Ok(user)
}

pub async fn change_password<S>(
    store: &S,
    caller: &User,
    current_password: &str,
    new_password: &str,
) -> Result<User>
where
    S: IdentityStore + ?Sized,
{
    if !credentials::verify_password(&caller.password_hash, current_password)? {
        return Err(AppError::Unauthorized(Rejection::new(
            "Invalid credentials!",
            "currentPassword",
            "Current password is incorrect",
        )));
    }

    validation::validate_password_strength(new_password)
        .map_err(|e| FieldError::new("newPassword", e.reason).into_app_error("Invalid password"))?;

    let password_hash = credentials::hash_password(new_password)?;
    let user = store
        .update_password_hash(caller.id, &password_hash)
        .await?
        .ok_or_else(|| user_gone(caller.id))?;

    info!(user_id = %user.id, "Password changed");
    Ok(user)
}
