use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Persisted author record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: OffsetDateTime,
    pub main_category: String,
}

/// Persisted course record; `author_id` is the owning author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Uuid,
}

/// Category filter and free-text search applied when listing authors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorsResourceParameters {
    pub main_category: Option<String>,
    pub search_query: Option<String>,
}

impl AuthorsResourceParameters {
    /// Exact (trimmed) category match, then substring search over
    /// category, first name and last name. Blank criteria match everything.
    pub fn matches(&self, author: &Author) -> bool {
        if let Some(category) = non_blank(&self.main_category) {
            if author.main_category != category {
                return false;
            }
        }

        match non_blank(&self.search_query) {
            Some(query) => {
                author.main_category.contains(query)
                    || author.first_name.contains(query)
                    || author.last_name.contains(query)
            }
            None => true,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
