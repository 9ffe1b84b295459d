use courselib_db::{Author, Course, CourseLibraryRepository};
use courselib_kernel::validation::FieldErrors;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::courses::models::CourseForCreationDto;

/// Author as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: Uuid,
    /// First and last name separated by a space
    pub name: String,
    /// Whole years since the date of birth
    pub age: i32,
    pub main_category: String,
}

impl AuthorDto {
    pub fn from_entity(author: &Author, now: OffsetDateTime) -> Self {
        Self {
            id: author.id,
            name: format!("{} {}", author.first_name, author.last_name),
            age: current_age(author.date_of_birth, now),
            main_category: author.main_category.clone(),
        }
    }
}

impl From<&Author> for AuthorDto {
    fn from(author: &Author) -> Self {
        Self::from_entity(author, OffsetDateTime::now_utc())
    }
}

/// Completed years between `date_of_birth` and `now`.
pub fn current_age(date_of_birth: OffsetDateTime, now: OffsetDateTime) -> i32 {
    let mut age = now.year() - date_of_birth.year();
    if now < add_years(date_of_birth, age) {
        age -= 1;
    }
    age
}

// Feb 29 lands on Feb 28 in non-leap years.
fn add_years(date: OffsetDateTime, years: i32) -> OffsetDateTime {
    let year = date.year() + years;
    date.replace_year(year)
        .or_else(|_| date.replace_day(28).and_then(|d| d.replace_year(year)))
        .unwrap_or(date)
}

/// Payload for creating an author, optionally with their first courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorForCreationDto {
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub date_of_birth: OffsetDateTime,
    pub main_category: String,
    #[serde(default)]
    pub courses: Vec<CourseForCreationDto>,
}

impl AuthorForCreationDto {
    /// Violations of the nested courses, keyed `courses[i].field`.
    pub fn violations(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (index, course) in self.courses.iter().enumerate() {
            if let Err(violations) = course.validate() {
                errors.extend_prefixed(&format!("courses[{index}]."), violations.into());
            }
        }
        errors
    }

    /// Unsaved author with a nil id plus its unowned courses.
    pub fn into_entities(self) -> (Author, Vec<Course>) {
        let author = Author {
            id: Uuid::nil(),
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            main_category: self.main_category,
        };
        let courses = self
            .courses
            .into_iter()
            .map(CourseForCreationDto::into_entity)
            .collect();
        (author, courses)
    }

    /// Stage the author and its courses on `repo`; returns the staged author.
    pub fn stage(self, repo: &mut dyn CourseLibraryRepository) -> Author {
        let (mut author, courses) = self.into_entities();
        repo.add_author(&mut author);
        for mut course in courses {
            repo.add_course(author.id, &mut course);
        }
        author
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn author(date_of_birth: OffsetDateTime) -> Author {
        Author {
            id: Uuid::now_v7(),
            first_name: "Nancy".to_string(),
            last_name: "Swashbuckler Rye".to_string(),
            date_of_birth,
            main_category: "Rum".to_string(),
        }
    }

    #[test]
    fn age_counts_completed_years() {
        let dob = datetime!(1990-06-15 0:00 UTC);
        assert_eq!(current_age(dob, datetime!(2020-06-14 23:59 UTC)), 29);
        assert_eq!(current_age(dob, datetime!(2020-06-15 0:00 UTC)), 30);
        assert_eq!(current_age(dob, datetime!(2020-12-31 0:00 UTC)), 30);
    }

    #[test]
    fn leap_day_birthday_matures_on_feb_28() {
        let dob = datetime!(2000-02-29 0:00 UTC);
        assert_eq!(current_age(dob, datetime!(2021-02-27 0:00 UTC)), 20);
        assert_eq!(current_age(dob, datetime!(2021-02-28 0:00 UTC)), 21);
        assert_eq!(current_age(dob, datetime!(2024-02-29 0:00 UTC)), 24);
    }

    #[test]
    fn dto_joins_names_and_computes_age() {
        let dto = AuthorDto::from_entity(
            &author(datetime!(1668-05-21 0:00 UTC)),
            datetime!(2019-05-21 0:00 UTC),
        );
        assert_eq!(dto.name, "Nancy Swashbuckler Rye");
        assert_eq!(dto.age, 351);
        assert_eq!(dto.main_category, "Rum");
    }

    #[test]
    fn creation_payload_uses_camel_case_and_optional_courses() {
        let dto: AuthorForCreationDto = serde_json::from_value(serde_json::json!({
            "firstName": "Jane",
            "lastName": "Skewers",
            "dateOfBirth": "1968-03-04T00:00:00+00:00",
            "mainCategory": "Rum"
        }))
        .unwrap();
        assert!(dto.courses.is_empty());
        assert!(dto.violations().is_empty());

        let (entity, courses) = dto.into_entities();
        assert!(entity.id.is_nil());
        assert_eq!(entity.date_of_birth, datetime!(1968-03-04 0:00 UTC));
        assert!(courses.is_empty());
    }

    #[test]
    fn nested_course_violations_are_prefixed() {
        let dto = AuthorForCreationDto {
            first_name: "Jane".to_string(),
            last_name: "Skewers".to_string(),
            date_of_birth: datetime!(1968-03-04 0:00 UTC),
            main_category: "Rum".to_string(),
            courses: vec![
                CourseForCreationDto {
                    title: Some("Fine".to_string()),
                    description: None,
                },
                CourseForCreationDto::default(),
            ],
        };
        let errors = dto.violations();
        assert!(errors.get("courses[0].title").is_none());
        assert_eq!(
            errors.get("courses[1].title"),
            Some(&["Course title is required.".to_string()][..])
        );
    }
}
