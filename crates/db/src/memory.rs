use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::{Author, AuthorsResourceParameters, Course};
use crate::error::StoreError;
use crate::repository::{CourseLibraryRepository, CourseLibraryStore};

#[derive(Debug, Clone, Default)]
struct Tables {
    authors: BTreeMap<Uuid, Author>,
    courses: BTreeMap<Uuid, Course>,
}

#[derive(Debug, Clone)]
enum Change {
    InsertAuthor(Author),
    DeleteAuthor(Uuid),
    InsertCourse(Course),
    UpdateCourse(Course),
    DeleteCourse(Uuid),
}

impl Tables {
    fn apply(&mut self, change: Change) -> Result<(), StoreError> {
        match change {
            Change::InsertAuthor(author) => {
                if self.authors.contains_key(&author.id) {
                    return Err(StoreError::DuplicateKey {
                        entity: "author",
                        id: author.id,
                    });
                }
                self.authors.insert(author.id, author);
            }
            Change::DeleteAuthor(id) => {
                if self.authors.remove(&id).is_none() {
                    return Err(StoreError::NotFound {
                        entity: "author",
                        id,
                    });
                }
                self.courses.retain(|_, course| course.author_id != id);
            }
            Change::InsertCourse(course) => {
                if !self.authors.contains_key(&course.author_id) {
                    return Err(StoreError::MissingAuthor(course.author_id));
                }
                if self.courses.contains_key(&course.id) {
                    return Err(StoreError::DuplicateKey {
                        entity: "course",
                        id: course.id,
                    });
                }
                self.courses.insert(course.id, course);
            }
            Change::UpdateCourse(course) => match self.courses.get_mut(&course.id) {
                Some(stored) => *stored = course,
                None => {
                    return Err(StoreError::NotFound {
                        entity: "course",
                        id: course.id,
                    })
                }
            },
            Change::DeleteCourse(id) => {
                if self.courses.remove(&id).is_none() {
                    return Err(StoreError::NotFound {
                        entity: "course",
                        id,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Process-local store; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CourseLibraryStore for InMemoryStore {
    fn repository(&self) -> Box<dyn CourseLibraryRepository> {
        Box::new(InMemoryRepository {
            tables: Arc::clone(&self.tables),
            pending: Vec::new(),
        })
    }
}

/// Unit of work over an [`InMemoryStore`].
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
    pending: Vec<Change>,
}

fn by_name(a: &Author, b: &Author) -> std::cmp::Ordering {
    a.first_name
        .cmp(&b.first_name)
        .then_with(|| a.last_name.cmp(&b.last_name))
}

#[async_trait]
impl CourseLibraryRepository for InMemoryRepository {
    async fn get_courses(&self, author_id: Uuid) -> Result<Vec<Course>, StoreError> {
        let tables = self.tables.read().await;
        let mut courses: Vec<Course> = tables
            .courses
            .values()
            .filter(|course| course.author_id == author_id)
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    async fn get_course(
        &self,
        author_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Course>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .get(&course_id)
            .filter(|course| course.author_id == author_id)
            .cloned())
    }

    fn add_course(&mut self, author_id: Uuid, course: &mut Course) {
        if course.id.is_nil() {
            course.id = Uuid::now_v7();
        }
        course.author_id = author_id;
        self.pending.push(Change::InsertCourse(course.clone()));
    }

    fn update_course(&mut self, course: &Course) {
        self.pending.push(Change::UpdateCourse(course.clone()));
    }

    fn delete_course(&mut self, course: &Course) {
        self.pending.push(Change::DeleteCourse(course.id));
    }

    async fn find_authors(
        &self,
        parameters: &AuthorsResourceParameters,
    ) -> Result<Vec<Author>, StoreError> {
        let tables = self.tables.read().await;
        let mut authors: Vec<Author> = tables
            .authors
            .values()
            .filter(|author| parameters.matches(author))
            .cloned()
            .collect();
        authors.sort_by(by_name);
        Ok(authors)
    }

    async fn get_authors_by_ids(&self, author_ids: &[Uuid]) -> Result<Vec<Author>, StoreError> {
        let tables = self.tables.read().await;
        let mut authors: Vec<Author> = tables
            .authors
            .values()
            .filter(|author| author_ids.contains(&author.id))
            .cloned()
            .collect();
        authors.sort_by(by_name);
        Ok(authors)
    }

    async fn get_author(&self, author_id: Uuid) -> Result<Option<Author>, StoreError> {
        Ok(self.tables.read().await.authors.get(&author_id).cloned())
    }

    fn add_author(&mut self, author: &mut Author) {
        if author.id.is_nil() {
            author.id = Uuid::now_v7();
        }
        self.pending.push(Change::InsertAuthor(author.clone()));
    }

    fn delete_author(&mut self, author: &Author) {
        self.pending.push(Change::DeleteAuthor(author.id));
    }

    async fn author_exists(&self, author_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.authors.contains_key(&author_id))
    }

    async fn save(&mut self) -> Result<usize, StoreError> {
        let changes = std::mem::take(&mut self.pending);
        let count = changes.len();

        let mut tables = self.tables.write().await;
        let mut next = tables.clone();
        for change in changes {
            next.apply(change)?;
        }
        *tables = next;

        tracing::debug!(target: "courselib-db", changes = count, "unit of work committed");
        Ok(count)
    }
}
