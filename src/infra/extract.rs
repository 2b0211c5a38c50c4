//! Custom axum extractors.

use super::error::{ApiError, ClientError};
use axum::{async_trait, extract::FromRequestParts};
use http::request::Parts;
use serde::de::DeserializeOwned;

/// A custom Query extractor since axum's does not let us customize the
/// rejection. Failures become an [`ApiError`] so they share the standard
/// error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T> AsRef<T> for Query<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let res = axum::extract::Query::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::from(ClientError::from(e)))?;
        Ok(Query(res.0))
    }
}
