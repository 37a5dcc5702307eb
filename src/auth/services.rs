use thiserror::Error;

use crate::{
    auth::{basic::Credentials, password::verify_password_async},
    db::RepoError,
    users::{repo::UserRepository, repo_types::User},
};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization header not found")]
    MissingCredentials,

    #[error("User not found for email address: {0}")]
    UnknownUser(String),

    #[error("Authentication failed for user: {0}")]
    WrongPassword(String),

    #[error(transparent)]
    Store(#[from] RepoError),

    #[error(transparent)]
    Hash(anyhow::Error),
}

/// Resolve Basic credentials to the user they belong to.
pub async fn authenticate(
    users: &dyn UserRepository,
    credentials: Option<Credentials>,
) -> Result<User, AuthError> {
    let Credentials { name, pass } = credentials.ok_or(AuthError::MissingCredentials)?;

    let user = users
        .find_by_email(&name)
        .await?
        .ok_or_else(|| AuthError::UnknownUser(name.clone()))?;

    let matched = verify_password_async(pass, user.password.clone())
        .await
        .map_err(AuthError::Hash)?;
    if !matched {
        return Err(AuthError::WrongPassword(name));
    }
    Ok(user)
}
