use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use service_core::error::AppError;
use validator::Validate;

/// JSON body that has passed its `validator` rules. Any failure is a 400.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {}", e.body_text())))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Like `ValidatedJson`, but also keeps the body as it arrived so it can be
/// passed on untouched.
pub struct ValidatedJsonWithRaw<T>(pub T, pub Value);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJsonWithRaw<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {}", e.body_text())))?;

        let value = T::deserialize(&raw)
            .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {}", e)))?;
        value.validate()?;

        Ok(ValidatedJsonWithRaw(value, raw))
    }
}
