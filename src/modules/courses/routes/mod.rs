//! Handlers for `/api/authors/{author_id}/courses`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use courselib_db::{Course, CourseLibraryRepository};
use courselib_http::{
    error::AppError,
    extract::{created, Payload, RequestPath, ResourcePath},
};
use courselib_kernel::{patch::PatchDocument, validation::FieldErrors};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::models::{CourseDto, CourseForCreationDto, CourseForUpdateDto};
use crate::modules::{ensure_author, SharedStore};

#[derive(Debug, Deserialize)]
pub struct AuthorPath {
    pub author_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CoursePath {
    pub author_id: Uuid,
    pub course_id: Uuid,
}

pub fn course_location(author_id: Uuid, course_id: Uuid) -> String {
    format!("/api/authors/{author_id}/courses/{course_id}")
}

async fn find_course(
    repo: &dyn CourseLibraryRepository,
    path: &CoursePath,
    instance: &str,
) -> Result<Course, AppError> {
    repo.get_course(path.author_id, path.course_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("course {} was not found", path.course_id)).at(instance)
        })
}

pub async fn list_courses(
    State(store): State<SharedStore>,
    ResourcePath(path): ResourcePath<AuthorPath>,
    RequestPath(instance): RequestPath,
) -> Result<Json<Vec<CourseDto>>, AppError> {
    let repo = store.repository();
    ensure_author(repo.as_ref(), path.author_id, &instance).await?;

    let courses = repo.get_courses(path.author_id).await?;
    Ok(Json(courses.iter().map(CourseDto::from).collect()))
}

pub async fn get_course(
    State(store): State<SharedStore>,
    ResourcePath(path): ResourcePath<CoursePath>,
    RequestPath(instance): RequestPath,
) -> Result<Json<CourseDto>, AppError> {
    let repo = store.repository();
    ensure_author(repo.as_ref(), path.author_id, &instance).await?;

    let course = find_course(repo.as_ref(), &path, &instance).await?;
    Ok(Json(CourseDto::from(&course)))
}

pub async fn create_course(
    State(store): State<SharedStore>,
    ResourcePath(path): ResourcePath<AuthorPath>,
    RequestPath(instance): RequestPath,
    Payload(dto): Payload<CourseForCreationDto>,
) -> Result<Response, AppError> {
    let mut repo = store.repository();
    ensure_author(repo.as_ref(), path.author_id, &instance).await?;
    dto.validate()
        .map_err(|errors| AppError::from(errors).at(&instance))?;

    let mut course = dto.into_entity();
    repo.add_course(path.author_id, &mut course);
    repo.save().await.map_err(|e| AppError::from(e).at(&instance))?;

    tracing::info!(author_id = %path.author_id, course_id = %course.id, "course created");
    Ok(created(
        course_location(path.author_id, course.id),
        CourseDto::from(&course),
    ))
}

/// Full replacement; an unknown course id is created under that id.
pub async fn upsert_course(
    State(store): State<SharedStore>,
    ResourcePath(path): ResourcePath<CoursePath>,
    RequestPath(instance): RequestPath,
    Payload(dto): Payload<CourseForUpdateDto>,
) -> Result<Response, AppError> {
    let mut repo = store.repository();
    ensure_author(repo.as_ref(), path.author_id, &instance).await?;
    dto.validate()
        .map_err(|errors| AppError::from(errors).at(&instance))?;

    match repo.get_course(path.author_id, path.course_id).await? {
        Some(mut course) => {
            dto.apply_to(&mut course);
            repo.update_course(&course);
            repo.save().await.map_err(|e| AppError::from(e).at(&instance))?;

            tracing::info!(author_id = %path.author_id, course_id = %course.id, "course updated");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        None => {
            let mut course = dto.into_entity();
            course.id = path.course_id;
            repo.add_course(path.author_id, &mut course);
            // A course id owned by another author fails here as a duplicate key
            repo.save().await.map_err(|e| AppError::from(e).at(&instance))?;

            tracing::info!(author_id = %path.author_id, course_id = %course.id, "course created by upsert");
            Ok(created(
                course_location(path.author_id, course.id),
                CourseDto::from(&course),
            ))
        }
    }
}

/// Apply a patch document to the course's update projection.
///
/// Patch failures and validation failures are reported together in a single
/// 422; nothing is written unless both pass.
pub async fn patch_course(
    State(store): State<SharedStore>,
    ResourcePath(path): ResourcePath<CoursePath>,
    RequestPath(instance): RequestPath,
    Payload(patch): Payload<PatchDocument>,
) -> Result<StatusCode, AppError> {
    let mut repo = store.repository();
    ensure_author(repo.as_ref(), path.author_id, &instance).await?;
    let mut course = find_course(repo.as_ref(), &path, &instance).await?;

    let mut draft = CourseForUpdateDto::from(&course);
    let mut errors = FieldErrors::new();
    if let Err(patch_errors) = patch.apply_to(&mut draft) {
        for error in patch_errors {
            errors.insert(error.field(), error.to_string());
        }
    }
    if let Err(violations) = draft.validate() {
        errors.extend_prefixed("", FieldErrors::from(violations));
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors).at(instance));
    }

    draft.apply_to(&mut course);
    repo.update_course(&course);
    repo.save().await.map_err(|e| AppError::from(e).at(&instance))?;

    tracing::info!(
        author_id = %path.author_id,
        course_id = %course.id,
        operations = patch.operations().len(),
        "course patched"
    );
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_course(
    State(store): State<SharedStore>,
    ResourcePath(path): ResourcePath<CoursePath>,
    RequestPath(instance): RequestPath,
) -> Result<StatusCode, AppError> {
    let mut repo = store.repository();
    ensure_author(repo.as_ref(), path.author_id, &instance).await?;
    let course = find_course(repo.as_ref(), &path, &instance).await?;

    repo.delete_course(&course);
    repo.save().await.map_err(|e| AppError::from(e).at(&instance))?;

    tracing::info!(author_id = %path.author_id, course_id = %course.id, "course deleted");
    Ok(StatusCode::NO_CONTENT)
}
