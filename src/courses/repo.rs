use axum::async_trait;
use time::OffsetDateTime;

use crate::{
    courses::repo_types::{Course, CourseFields, CourseWithOwnerRow},
    db::{RepoError, SqliteStore},
};

#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// All courses with their owners, ascending by id.
    async fn list(&self) -> Result<Vec<CourseWithOwnerRow>, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<CourseWithOwnerRow>, RepoError>;
    async fn create(&self, owner_id: i64, fields: CourseFields) -> Result<Course, RepoError>;
    /// `false` when no course has that id.
    async fn update(&self, id: i64, fields: CourseFields) -> Result<bool, RepoError>;
    /// `false` when no course has that id.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

#[async_trait]
impl CourseRepository for SqliteStore {
    async fn list(&self) -> Result<Vec<CourseWithOwnerRow>, RepoError> {
        let rows = sqlx::query_as::<_, CourseWithOwnerRow>(
            r#"
            SELECT c.id, c.title, c.description, c.estimatedTime, c.materialsNeeded,
                   c.userId, c.createdAt, c.updatedAt,
                   u.firstName AS ownerFirstName, u.lastName AS ownerLastName,
                   u.emailAddress AS ownerEmailAddress,
                   u.createdAt AS ownerCreatedAt, u.updatedAt AS ownerUpdatedAt
            FROM Courses c
            JOIN Users u ON u.id = c.userId
            ORDER BY c.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CourseWithOwnerRow>, RepoError> {
        let row = sqlx::query_as::<_, CourseWithOwnerRow>(
            r#"
            SELECT c.id, c.title, c.description, c.estimatedTime, c.materialsNeeded,
                   c.userId, c.createdAt, c.updatedAt,
                   u.firstName AS ownerFirstName, u.lastName AS ownerLastName,
                   u.emailAddress AS ownerEmailAddress,
                   u.createdAt AS ownerCreatedAt, u.updatedAt AS ownerUpdatedAt
            FROM Courses c
            JOIN Users u ON u.id = c.userId
            WHERE c.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, owner_id: i64, fields: CourseFields) -> Result<Course, RepoError> {
        let now = OffsetDateTime::now_utc();
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO Courses
                (title, description, estimatedTime, materialsNeeded, userId, createdAt, updatedAt)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, description, estimatedTime, materialsNeeded,
                      userId, createdAt, updatedAt
            "#,
        )
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.estimated_time)
        .bind(fields.materials_needed)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    async fn update(&self, id: i64, fields: CourseFields) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE Courses
            SET title = ?, description = ?, estimatedTime = ?, materialsNeeded = ?, updatedAt = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.estimated_time)
        .bind(fields.materials_needed)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM Courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
