use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    courses::repo_types::{CourseFields, CourseWithOwnerRow},
    users::dto::PublicUser,
    validation::Validate,
};

/// Body of course create and update requests. An owner sent by the client is
/// ignored; ownership comes from the credentials.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
}

impl Validate for CourseRequest {
    fn required_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("title", self.title.as_deref()),
            ("description", self.description.as_deref()),
        ]
    }
}

impl From<CourseRequest> for CourseFields {
    fn from(req: CourseRequest) -> Self {
        Self {
            title: req.title.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
            estimated_time: req.estimated_time,
            materials_needed: req.materials_needed,
        }
    }
}

/// Course with its owner embedded, as served by the read endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub user: PublicUser,
}

impl From<CourseWithOwnerRow> for CourseDetails {
    fn from(row: CourseWithOwnerRow) -> Self {
        let c = row.course;
        Self {
            user: PublicUser {
                id: c.user_id,
                first_name: row.owner_first_name,
                last_name: row.owner_last_name,
                email_address: row.owner_email_address,
                created_at: row.owner_created_at,
                updated_at: row.owner_updated_at,
            },
            id: c.id,
            title: c.title,
            description: c.description,
            estimated_time: c.estimated_time,
            materials_needed: c.materials_needed,
            user_id: c.user_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
