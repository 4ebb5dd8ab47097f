use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "others" => Ok(Gender::Others),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Others => "others",
        };
        f.write_str(value)
    }
}

/// Full identity document. Serializes without the credential hash, so it is
/// safe to hand back to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub photo_url: String,
    pub about: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age,
            about: self.about.clone(),
            photo_url: self.photo_url.clone(),
            skills: self.skills.clone(),
        }
    }
}

/// What other users get to see: no email, no credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i32>,
    pub about: String,
    pub photo_url: String,
    pub skills: Vec<String>,
}

/// Validated signup data, email already normalized and password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Owner-editable fields. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub photo_url: Option<String>,
    pub about: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == ProfilePatch::default()
    }

    pub fn apply_to(&self, user: &mut User) {
        if let Some(age) = self.age {
            user.age = Some(age);
        }
        if let Some(gender) = self.gender {
            user.gender = Some(gender);
        }
        if let Some(photo_url) = &self.photo_url {
            user.photo_url = photo_url.clone();
        }
        if let Some(about) = &self.about {
            user.about = about.clone();
        }
        if let Some(skills) = &self.skills {
            user.skills = skills.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_parses_case_insensitively() {
        assert_eq!("Female".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!(" OTHERS ".parse::<Gender>(), Ok(Gender::Others));
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn serialized_user_hides_password_hash() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            age: Some(36),
            gender: Some(Gender::Female),
            photo_url: "https://example.com/ada.png".into(),
            about: "Analyst".into(),
            skills: vec!["math".into()],
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["firstName"], "Ada");

        let public = serde_json::to_value(user.public_profile()).unwrap();
        assert!(public.get("email").is_none());
        assert!(public.get("gender").is_none());
    }
}
