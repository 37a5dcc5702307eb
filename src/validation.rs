use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Declares which fields of a request body must carry a non-empty value.
pub trait Validate {
    /// Required fields, in the order their messages are reported.
    fn required_fields(&self) -> Vec<(&'static str, Option<&str>)>;

    fn validate(&self) -> Result<(), ApiError> {
        let errors: Vec<String> = self
            .required_fields()
            .into_iter()
            .filter(|(_, value)| value.map_or(true, str::is_empty))
            .map(|(field, _)| format!("Please provide a value for \"{field}\""))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

/// JSON body that has passed [`Validate`].
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = match Json::<T>::from_request(req, state).await {
            Ok(Json(body)) => body,
            // Bodies that are not declared as JSON are read as an empty object.
            Err(JsonRejection::MissingJsonContentType(_)) => serde_json::from_str("{}")
                .map_err(|e| ApiError::MalformedBody(e.to_string()))?,
            Err(rejection) => return Err(ApiError::MalformedBody(rejection.body_text())),
        };
        body.validate()?;
        Ok(Self(body))
    }
}
