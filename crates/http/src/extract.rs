//! Extractors that reject with problem-details bodies instead of plain text.

use axum::{
    extract::{FromRequest, FromRequestParts, OriginalUri, Path, Request},
    http::request::Parts,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppError;

/// JSON request body; malformed input becomes a 400 problem.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = request_path(req.extensions().get::<OriginalUri>(), req.uri().path());
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(AppError::from(rejection).at(instance)),
        }
    }
}

/// Path parameters; unparsable segments become a 400 problem.
#[derive(Debug, Clone)]
pub struct ResourcePath<T>(pub T);

impl<S, T> FromRequestParts<S> for ResourcePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let instance = request_path(parts.extensions.get::<OriginalUri>(), parts.uri.path());
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ResourcePath(value)),
            Err(rejection) => Err(AppError::from(rejection).at(instance)),
        }
    }
}

/// Full request path, used as the problem `instance`.
#[derive(Debug, Clone)]
pub struct RequestPath(pub String);

impl<S> FromRequestParts<S> for RequestPath
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestPath(request_path(
            parts.extensions.get::<OriginalUri>(),
            parts.uri.path(),
        )))
    }
}

fn request_path(original: Option<&OriginalUri>, fallback: &str) -> String {
    original
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// 201 response carrying a `Location` reference to the new resource.
pub fn created<T: Serialize>(location: impl AsRef<str>, body: T) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location.as_ref().to_string())],
        Json(body),
    )
        .into_response()
}
