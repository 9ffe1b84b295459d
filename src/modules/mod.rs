pub mod author_collections;
pub mod authors;
pub mod courses;

use std::sync::Arc;

use courselib_db::{CourseLibraryRepository, CourseLibraryStore};
use courselib_http::error::AppError;
use courselib_kernel::ModuleRegistry;
use uuid::Uuid;

/// Store handle shared as router state by every module
pub type SharedStore = Arc<dyn CourseLibraryStore>;

/// Register the core store module and every resource module with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: SharedStore) {
    registry.register_core(courselib_db::create_module(store.clone()));
    registry.register_custom(authors::create_module(store.clone()));
    registry.register_custom(courses::create_module(store.clone()));
    registry.register_custom(author_collections::create_module(store));
}

/// Fail with 404 unless the author exists.
pub(crate) async fn ensure_author(
    repo: &dyn CourseLibraryRepository,
    author_id: Uuid,
    instance: &str,
) -> Result<(), AppError> {
    if repo.author_exists(author_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found(format!("author {author_id} was not found")).at(instance))
    }
}

/// JSON schema of a payload type for the module OpenAPI fragments.
pub(crate) fn schema_of<T: utoipa::PartialSchema>() -> serde_json::Value {
    serde_json::to_value(T::schema()).unwrap_or_else(|e| {
        tracing::warn!(
            schema = std::any::type_name::<T>(),
            error = %e,
            "failed to encode OpenAPI schema"
        );
        serde_json::Value::Null
    })
}
