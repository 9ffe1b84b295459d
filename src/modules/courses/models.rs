use courselib_db::Course;
use courselib_kernel::validation::{finish, max_length, must_differ, required};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 1500;

/// Key under which the title/description business rule is reported.
pub const COURSE_RULE_KEY: &str = "course";

/// Course as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Uuid,
}

impl From<&Course> for CourseDto {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            author_id: course.author_id,
        }
    }
}

/// Payload for `POST /courses` and for courses nested in a new author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseForCreationDto {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CourseForCreationDto {
    /// Unowned entity with a nil id; the repository assigns both.
    pub fn into_entity(self) -> Course {
        Course {
            id: Uuid::nil(),
            title: self.title.unwrap_or_default(),
            description: self.description,
            author_id: Uuid::nil(),
        }
    }
}

impl Validate for CourseForCreationDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        manipulation_rules(
            &mut errors,
            self.title.as_deref(),
            self.description.as_deref(),
        );
        finish(errors)
    }
}

/// Payload for `PUT` and the projection a `PATCH` document is applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseForUpdateDto {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CourseForUpdateDto {
    /// Unowned entity with a nil id, used when `PUT` creates the course.
    pub fn into_entity(self) -> Course {
        Course {
            id: Uuid::nil(),
            title: self.title.unwrap_or_default(),
            description: self.description,
            author_id: Uuid::nil(),
        }
    }

    /// Merge into an existing entity. `id` and `author_id` are never touched.
    pub fn apply_to(&self, course: &mut Course) {
        course.title = self.title.clone().unwrap_or_default();
        course.description = self.description.clone();
    }
}

impl From<&Course> for CourseForUpdateDto {
    fn from(course: &Course) -> Self {
        Self {
            title: Some(course.title.clone()),
            description: course.description.clone(),
        }
    }
}

impl Validate for CourseForUpdateDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        manipulation_rules(
            &mut errors,
            self.title.as_deref(),
            self.description.as_deref(),
        );
        required(
            &mut errors,
            "description",
            self.description.as_deref(),
            "Course description is required.",
        );
        finish(errors)
    }
}

/// Rules shared by every payload that writes a course.
fn manipulation_rules(
    errors: &mut ValidationErrors,
    title: Option<&str>,
    description: Option<&str>,
) {
    required(errors, "title", title, "Course title is required.");
    max_length(
        errors,
        "title",
        title,
        TITLE_MAX,
        "Course title cannot be greater than 100 chars.",
    );
    max_length(
        errors,
        "description",
        description,
        DESCRIPTION_MAX,
        "Course description cannot be greater than 1,500 chars.",
    );
    must_differ(
        errors,
        COURSE_RULE_KEY,
        title,
        description,
        "Course title cannot match description.",
    );
}
