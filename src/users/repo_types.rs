use sqlx::FromRow;
use time::OffsetDateTime;

/// Row of the `Users` table.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password: String, // argon2 PHC string
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for inserting a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password_hash: String,
}
