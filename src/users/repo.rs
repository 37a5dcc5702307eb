use axum::async_trait;
use time::OffsetDateTime;

use crate::{
    db::{RepoError, SqliteStore},
    users::repo_types::{NewUser, User},
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError>;
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, firstName, lastName, emailAddress, password, createdAt, updatedAt
            FROM Users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, firstName, lastName, emailAddress, password, createdAt, updatedAt
            FROM Users
            WHERE emailAddress = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let now = OffsetDateTime::now_utc();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO Users (firstName, lastName, emailAddress, password, createdAt, updatedAt)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, firstName, lastName, emailAddress, password, createdAt, updatedAt
            "#,
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email_address)
        .bind(&new_user.password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::unique_on(e, "emailAddress", &new_user.email_address))
    }
}
