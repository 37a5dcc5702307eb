use std::sync::Arc;

use crate::{
    config::AppConfig, courses::repo::CourseRepository, db::SqliteStore,
    users::repo::UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let store = SqliteStore::connect(&config.database_url).await?;
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: SqliteStore) -> Self {
        let store = Arc::new(store);
        Self::from_parts(store.clone(), store)
    }

    pub fn from_parts(users: Arc<dyn UserRepository>, courses: Arc<dyn CourseRepository>) -> Self {
        Self { users, courses }
    }
}
