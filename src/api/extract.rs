use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// `axum::Json` whose rejections render as the usual `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// JSON body where an absent or blank body means `T::default()`.
///
/// `Content-Type` is not required. Anything non-blank must still parse.
#[derive(Debug)]
pub struct JsonOrEmpty<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonOrEmpty<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!("Failed to read request body: {}", rejection.body_text());
            AppError::Validation("Invalid request body".to_string())
        })?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonOrEmpty(T::default()));
        }

        serde_json::from_slice(&body).map(JsonOrEmpty).map_err(|e| {
            tracing::debug!("Rejected request body: {}", e);
            AppError::Validation("Invalid request body".to_string())
        })
    }
}
