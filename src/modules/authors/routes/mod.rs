//! Handlers for `/api/authors`.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use courselib_db::AuthorsResourceParameters;
use courselib_http::{
    error::AppError,
    extract::{created, Payload, RequestPath, ResourcePath},
};
use serde::Deserialize;
use uuid::Uuid;

use super::models::{AuthorDto, AuthorForCreationDto};
use crate::modules::SharedStore;

/// Methods advertised by `OPTIONS /api/authors`.
pub const ALLOWED_METHODS: &str = "GET,HEAD,OPTIONS,POST";

#[derive(Debug, Deserialize)]
pub struct AuthorPath {
    pub author_id: Uuid,
}

pub fn author_location(author_id: Uuid) -> String {
    format!("/api/authors/{author_id}")
}

/// GET and HEAD; HEAD shares the handler and the body is dropped.
pub async fn list_authors(
    State(store): State<SharedStore>,
    Query(parameters): Query<AuthorsResourceParameters>,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    let authors = store.repository().find_authors(&parameters).await?;
    Ok(Json(authors.iter().map(AuthorDto::from).collect()))
}

pub async fn get_author(
    State(store): State<SharedStore>,
    ResourcePath(path): ResourcePath<AuthorPath>,
    RequestPath(instance): RequestPath,
) -> Result<Json<AuthorDto>, AppError> {
    let author = store
        .repository()
        .get_author(path.author_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("author {} was not found", path.author_id)).at(&instance)
        })?;
    Ok(Json(AuthorDto::from(&author)))
}

pub async fn create_author(
    State(store): State<SharedStore>,
    RequestPath(instance): RequestPath,
    Payload(dto): Payload<AuthorForCreationDto>,
) -> Result<Response, AppError> {
    let violations = dto.violations();
    if !violations.is_empty() {
        return Err(AppError::validation(violations).at(instance));
    }

    let mut repo = store.repository();
    let course_count = dto.courses.len();
    let author = dto.stage(repo.as_mut());
    repo.save().await.map_err(|e| AppError::from(e).at(&instance))?;

    tracing::info!(author_id = %author.id, courses = course_count, "author created");
    Ok(created(author_location(author.id), AuthorDto::from(&author)))
}

/// Removes the author together with every course they own.
pub async fn delete_author(
    State(store): State<SharedStore>,
    ResourcePath(path): ResourcePath<AuthorPath>,
    RequestPath(instance): RequestPath,
) -> Result<StatusCode, AppError> {
    let mut repo = store.repository();
    let author = repo.get_author(path.author_id).await?.ok_or_else(|| {
        AppError::not_found(format!("author {} was not found", path.author_id)).at(&instance)
    })?;

    repo.delete_author(&author);
    repo.save().await.map_err(|e| AppError::from(e).at(&instance))?;

    tracing::info!(author_id = %author.id, "author deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn authors_options() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, ALLOWED_METHODS)])
}
