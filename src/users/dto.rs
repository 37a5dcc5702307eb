use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{users::repo_types::User, validation::Validate};

/// Request body for signup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub password: Option<String>,
}

impl Validate for CreateUserRequest {
    fn required_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("firstName", self.first_name.as_deref()),
            ("lastName", self.last_name.as_deref()),
            ("emailAddress", self.email_address.as_deref()),
            ("password", self.password.as_deref()),
        ]
    }
}

/// User as returned to clients; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email_address: user.email_address,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
