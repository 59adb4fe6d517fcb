use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

/// JSON body decoded regardless of `Content-Type`; decode failures become a
/// plain 400 instead of axum's 415/422.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            warn!(error = %rejection.body_text(), "unreadable request body");
            ApiError::bad_request("invalid request body")
        })?;
        serde_json::from_slice::<T>(&bytes)
            .map(JsonBody)
            .map_err(|e| {
                warn!(error = %e, "rejected request body");
                ApiError::bad_request("invalid request body")
            })
    }
}

/// Reads an integer query parameter, distinguishing missing from malformed.
pub fn required_id(params: &HashMap<String, String>, name: &str) -> Result<i32, ApiError> {
    let raw = params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("missing {name} parameter")))?;
    raw.parse::<i32>()
        .map_err(|_| ApiError::bad_request(format!("invalid {name} parameter")))
}
