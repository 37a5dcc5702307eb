use sqlx::FromRow;
use time::OffsetDateTime;

/// Row of the `Courses` table.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Course joined with the columns of its owning user.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct CourseWithOwnerRow {
    #[sqlx(flatten)]
    pub course: Course,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub owner_email_address: String,
    pub owner_created_at: OffsetDateTime,
    pub owner_updated_at: OffsetDateTime,
}

/// Writable course columns; the owner is set separately.
#[derive(Debug, Clone)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
}
