//! Sample authors and courses for local runs.

use anyhow::Context;
use time::macros::datetime;
use uuid::{uuid, Uuid};

use crate::entities::{Author, Course};
use crate::repository::CourseLibraryStore;

const BERRY: Uuid = uuid!("d28888e9-2ba9-473a-a40f-e38cb54f9b35");
const NANCY: Uuid = uuid!("da2fd609-d754-4feb-8acd-c4f9ff13ba96");
const ELI: Uuid = uuid!("2902b665-1190-4c70-9915-b9c2d7680450");
const ARNOLD: Uuid = uuid!("102b566b-ba1f-404c-b2df-e2cde39ade09");

pub fn authors() -> Vec<Author> {
    vec![
        Author {
            id: BERRY,
            first_name: "Berry".to_string(),
            last_name: "Griffin Beak Eldritch".to_string(),
            date_of_birth: datetime!(1650-07-23 0:00 UTC),
            main_category: "Ships".to_string(),
        },
        Author {
            id: NANCY,
            first_name: "Nancy".to_string(),
            last_name: "Swashbuckler Rye".to_string(),
            date_of_birth: datetime!(1668-05-21 0:00 UTC),
            main_category: "Rum".to_string(),
        },
        Author {
            id: ELI,
            first_name: "Eli".to_string(),
            last_name: "Ivory Bones Sweet".to_string(),
            date_of_birth: datetime!(1701-12-16 0:00 UTC),
            main_category: "Singing".to_string(),
        },
        Author {
            id: ARNOLD,
            first_name: "Arnold".to_string(),
            last_name: "The Unseen Stafford".to_string(),
            date_of_birth: datetime!(1702-03-06 0:00 UTC),
            main_category: "Singing".to_string(),
        },
    ]
}

pub fn courses() -> Vec<Course> {
    let course = |id: Uuid, author_id: Uuid, title: &str, description: &str| Course {
        id,
        title: title.to_string(),
        description: Some(description.to_string()),
        author_id,
    };

    vec![
        course(
            uuid!("5b1c2b4d-48c7-402a-80c3-cc796ad49c6b"),
            BERRY,
            "Commandeering a Ship Without Getting Caught",
            "Commandeering a ship in rough waters isn't easy. Learn how to do it quietly.",
        ),
        course(
            uuid!("d8663e5e-7494-4f81-8739-6e0de1bea7ee"),
            BERRY,
            "Overthrowing Mutiny",
            "In this course, the author provides tips to avoid, or, if needed, overthrow pirate mutiny.",
        ),
        course(
            uuid!("d173e20d-159e-4127-9ce9-b0ac2564ad97"),
            NANCY,
            "Avoiding Brawls While Drinking as Much Rum as You Desire",
            "Every good pirate loves rum, but it also has a tendency to get you into trouble.",
        ),
        course(
            uuid!("40ff5488-fdab-45b5-bc3a-14302d59869a"),
            ELI,
            "Singalong Pirate Hits",
            "In this course you'll learn how to sing all-time favourite pirate songs without sounding like you actually know the words or how to hold a note.",
        ),
    ]
}

/// Write the sample data through a regular unit of work.
pub async fn load(store: &dyn CourseLibraryStore) -> anyhow::Result<usize> {
    let mut repo = store.repository();
    for mut author in authors() {
        if repo.author_exists(author.id).await? {
            continue;
        }
        repo.add_author(&mut author);
        for mut course in courses().into_iter().filter(|c| c.author_id == author.id) {
            repo.add_course(author.id, &mut course);
        }
    }
    repo.save().await.context("failed to save sample data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    #[tokio::test]
    async fn load_is_idempotent() {
        let store = InMemoryStore::new();
        let first = load(&store).await.unwrap();
        assert_eq!(first, authors().len() + courses().len());
        assert_eq!(load(&store).await.unwrap(), 0);
    }

    #[test]
    fn sample_courses_satisfy_business_rule() {
        for course in courses() {
            assert_ne!(Some(course.title.as_str()), course.description.as_deref());
            assert!(course.title.chars().count() <= 100);
        }
    }
}
