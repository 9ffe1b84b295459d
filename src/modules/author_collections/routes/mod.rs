//! Handlers for `/api/authorcollections`.

use axum::{extract::State, response::Response, Json};
use courselib_http::{
    error::AppError,
    extract::{created, Payload, RequestPath, ResourcePath},
};
use courselib_kernel::validation::FieldErrors;
use serde::Deserialize;

use super::models::{IdList, IdListError};
use crate::modules::authors::models::{AuthorDto, AuthorForCreationDto};
use crate::modules::SharedStore;

#[derive(Debug, Deserialize)]
pub struct CollectionPath {
    pub ids: String,
}

pub fn collection_location(ids: &IdList) -> String {
    format!("/api/authorcollections/{ids}")
}

/// Every requested author must exist; a short result is a 404.
pub async fn get_author_collection(
    State(store): State<SharedStore>,
    ResourcePath(path): ResourcePath<CollectionPath>,
    RequestPath(instance): RequestPath,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    let ids: IdList = path
        .ids
        .parse()
        .map_err(|e: IdListError| {
            AppError::bad_input("ids", e.to_string()).at(&instance)
        })?;

    let authors = store.repository().get_authors_by_ids(ids.ids()).await?;
    if authors.len() != ids.ids().len() {
        return Err(AppError::not_found(format!(
            "{} of {} requested authors were found",
            authors.len(),
            ids.ids().len()
        ))
        .at(instance));
    }

    Ok(Json(authors.iter().map(AuthorDto::from).collect()))
}

/// Create several authors in one unit of work.
pub async fn create_author_collection(
    State(store): State<SharedStore>,
    RequestPath(instance): RequestPath,
    Payload(dtos): Payload<Vec<AuthorForCreationDto>>,
) -> Result<Response, AppError> {
    if dtos.is_empty() {
        return Err(AppError::bad_input("$", "At least one author is required.").at(instance));
    }

    let mut errors = FieldErrors::new();
    for (index, dto) in dtos.iter().enumerate() {
        errors.extend_prefixed(&format!("[{index}]."), dto.violations());
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors).at(instance));
    }

    let mut repo = store.repository();
    let authors: Vec<_> = dtos
        .into_iter()
        .map(|dto| dto.stage(repo.as_mut()))
        .collect();
    repo.save().await.map_err(|e| AppError::from(e).at(&instance))?;

    let ids = IdList::new(authors.iter().map(|author| author.id).collect());
    tracing::info!(count = authors.len(), ids = %ids, "author collection created");

    let body: Vec<AuthorDto> = authors.iter().map(AuthorDto::from).collect();
    Ok(created(collection_location(&ids), body))
}
