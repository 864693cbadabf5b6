//! Request body extraction
//!
//! Browse handlers read their bodies through [`BrowseJson`] so a malformed
//! body (bad JSON, wrong shape, an undecodable page token) is answered with
//! the same error body as every other browse failure.

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::browse::BrowseError;

/// `Json<T>` whose rejection is a [`BrowseError`]
#[derive(Debug, Clone)]
pub struct BrowseJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for BrowseJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BrowseError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
