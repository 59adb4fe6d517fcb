use serde::{Deserialize, Deserializer, Serialize};

use super::repo_types::User;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Absent keeps the stored profile, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub profile: Option<Option<serde_json::Value>>,
}

fn present<'de, D>(d: D) -> Result<Option<Option<serde_json::Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<serde_json::Value>::deserialize(d).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct PasswordResetSubmitRequest {
    pub token: String,
    pub new_password: String,
}

/// Public part of the user returned on registration.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            profile: u.profile,
        }
    }
}
