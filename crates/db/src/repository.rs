use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{Author, AuthorsResourceParameters, Course};
use crate::error::StoreError;

/// Request-scoped unit of work over the course library.
///
/// Reads observe committed state. `add_*`, `update_*` and `delete_*` only
/// stage changes; nothing is visible to other repositories until [`save`]
/// commits the whole batch.
///
/// [`save`]: CourseLibraryRepository::save
#[async_trait]
pub trait CourseLibraryRepository: Send + Sync {
    /// Courses owned by `author_id`, ordered by title.
    async fn get_courses(&self, author_id: Uuid) -> Result<Vec<Course>, StoreError>;

    async fn get_course(
        &self,
        author_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Course>, StoreError>;

    /// Stage a new course under `author_id`, assigning an id when it is nil.
    fn add_course(&mut self, author_id: Uuid, course: &mut Course);

    fn update_course(&mut self, course: &Course);

    fn delete_course(&mut self, course: &Course);

    /// Authors matching `parameters`, ordered by first then last name.
    async fn find_authors(
        &self,
        parameters: &AuthorsResourceParameters,
    ) -> Result<Vec<Author>, StoreError>;

    /// Authors whose id appears in `author_ids`, ordered by first then last name.
    async fn get_authors_by_ids(&self, author_ids: &[Uuid]) -> Result<Vec<Author>, StoreError>;

    async fn get_author(&self, author_id: Uuid) -> Result<Option<Author>, StoreError>;

    /// Stage a new author, assigning an id when it is nil.
    fn add_author(&mut self, author: &mut Author);

    /// Stage removal of an author together with all of its courses.
    fn delete_author(&mut self, author: &Author);

    async fn author_exists(&self, author_id: Uuid) -> Result<bool, StoreError>;

    /// Commit every staged change atomically; returns how many were applied.
    /// On failure nothing is applied and the staged changes are discarded.
    async fn save(&mut self) -> Result<usize, StoreError>;
}

/// Shared store handle that opens repositories.
pub trait CourseLibraryStore: Send + Sync + 'static {
    fn repository(&self) -> Box<dyn CourseLibraryRepository>;
}
