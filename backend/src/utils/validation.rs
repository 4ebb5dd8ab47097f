//! Per-field validators. Each one is pure and answers pass or fail with a
//! reason; signup and profile edit compose them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::constants::{
    EDITABLE_PROFILE_FIELDS, FIRST_NAME_MIN_LEN, MIN_AGE, MIN_PASSWORD_LEN, NAME_MAX_LEN,
};
use crate::error::{AppError, Rejection};
use crate::models::{Gender, ProfilePatch};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    pub fn into_app_error(self, message: &str) -> AppError {
        AppError::InvalidArgument(Rejection::new(message, self.field, self.reason))
    }
}

pub type Validation<T = ()> = Result<T, FieldError>;

/// Emails compare case-insensitively, so they are stored trimmed and lowercase
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_first_name(first_name: &str) -> Validation {
    let len = first_name.trim().chars().count();
    if len == 0 {
        return Err(FieldError::new("firstName", "First name is required"));
    }
    if !(FIRST_NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(FieldError::new(
            "firstName",
            format!("First name must be {FIRST_NAME_MIN_LEN} to {NAME_MAX_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_last_name(last_name: &str) -> Validation {
    let len = last_name.trim().chars().count();
    if len == 0 {
        return Err(FieldError::new("lastName", "Last name is required"));
    }
    if len > NAME_MAX_LEN {
        return Err(FieldError::new(
            "lastName",
            format!("Last name must be at most {NAME_MAX_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Validation {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(FieldError::new("email", "Invalid email address"))
    }
}

/// At least 8 characters with a lowercase, an uppercase, a digit and a symbol
pub fn validate_password_strength(password: &str) -> Validation {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if long_enough && has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(FieldError::new("password", "Password is not strong enough!"))
    }
}

pub fn validate_age(age: i32) -> Validation {
    if age >= MIN_AGE {
        Ok(())
    } else {
        Err(FieldError::new("age", format!("Age must be at least {MIN_AGE}")))
    }
}

pub fn parse_gender(raw: &str) -> Validation<Gender> {
    raw.parse::<Gender>()
        .map_err(|_| FieldError::new("gender", "Invalid gender!"))
}

pub fn validate_photo_url(url: &str) -> Validation {
    if HTTP_URL_RE.is_match(url) {
        Ok(())
    } else {
        Err(FieldError::new("photoUrl", "Photo URL must be an http(s) URL"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditProfileFields {
    age: Option<i32>,
    gender: Option<String>,
    photo_url: Option<String>,
    about: Option<String>,
    skills: Option<Vec<String>>,
}

/// Turns a raw edit body into a patch. Any key outside
/// [`EDITABLE_PROFILE_FIELDS`] fails the whole edit.
pub fn parse_profile_edit(body: &Map<String, Value>) -> Validation<ProfilePatch> {
    if let Some(key) = body
        .keys()
        .find(|key| !EDITABLE_PROFILE_FIELDS.contains(&key.as_str()))
    {
        return Err(FieldError::new(
            "general",
            format!("Field '{key}' cannot be edited"),
        ));
    }

    let fields: EditProfileFields = serde_json::from_value(Value::Object(body.clone()))
        .map_err(|e| FieldError::new("general", e.to_string()))?;

    if let Some(age) = fields.age {
        validate_age(age)?;
    }
    let gender = fields.gender.as_deref().map(parse_gender).transpose()?;
    if let Some(photo_url) = &fields.photo_url {
        validate_photo_url(photo_url)?;
    }
    let skills = fields.skills.map(|skills| {
        skills
            .into_iter()
            .map(|skill| skill.trim().to_string())
            .filter(|skill| !skill.is_empty())
            .collect()
    });

    Ok(ProfilePatch {
        age: fields.age,
        gender,
        photo_url: fields.photo_url,
        about: fields.about,
        skills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn first_name_length_bounds() {
        assert!(validate_first_name("Al").is_ok());
        assert_eq!(validate_first_name("A").unwrap_err().field, "firstName");
        assert!(validate_first_name("   ").is_err());
        assert!(validate_first_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("dev@match.io").is_ok());
        assert!(validate_email("  dev@match.io ").is_ok());
        assert!(validate_email("dev@match").is_err());
        assert!(validate_email("no spaces@match.io").is_err());
        assert_eq!(normalize_email("  Dev@Match.IO "), "dev@match.io");
    }

    #[test]
    fn password_strength() {
        assert!(validate_password_strength("Str0ng!pass").is_ok());
        assert!(validate_password_strength("Sh0rt!").is_err());
        assert!(validate_password_strength("alllower1!").is_err());
        assert!(validate_password_strength("NoDigits!!").is_err());
        assert!(validate_password_strength("NoSymbol123").is_err());
    }

    #[test]
    fn age_and_gender() {
        assert!(validate_age(18).is_ok());
        assert!(validate_age(17).is_err());
        assert_eq!(parse_gender("MALE"), Ok(Gender::Male));
        assert_eq!(parse_gender("unknown").unwrap_err().reason, "Invalid gender!");
    }

    #[test]
    fn photo_url_must_be_http() {
        assert!(validate_photo_url("https://cdn.example.com/me.png").is_ok());
        assert!(validate_photo_url("ftp://example.com/me.png").is_err());
        assert!(validate_photo_url("not a url").is_err());
    }

    #[test]
    fn profile_edit_accepts_allowed_fields() {
        let patch = parse_profile_edit(&body(json!({
            "age": 30,
            "gender": "Female",
            "about": "Rustacean",
            "skills": ["rust", "  ", " sql "]
        })))
        .unwrap();

        assert_eq!(patch.age, Some(30));
        assert_eq!(patch.gender, Some(Gender::Female));
        assert_eq!(patch.about.as_deref(), Some("Rustacean"));
        assert_eq!(patch.skills, Some(vec!["rust".to_string(), "sql".to_string()]));
        assert_eq!(patch.photo_url, None);
    }

    #[test]
    fn profile_edit_rejects_protected_fields() {
        let err = parse_profile_edit(&body(json!({ "about": "hi", "email": "x@y.z" }))).unwrap_err();
        assert!(err.reason.contains("email"));

        assert!(parse_profile_edit(&body(json!({ "age": 12 }))).is_err());
        assert!(parse_profile_edit(&body(json!({ "age": "old" }))).is_err());
    }
}
