use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Comma-separated author ids as they appear in a collection URL.
///
/// Blank entries are skipped and one pair of surrounding parentheses is
/// tolerated, so `(a, b,)` and `a,b` name the same collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdList(Vec<Uuid>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdListError {
    #[error("At least one author id is required.")]
    Empty,

    #[error("'{0}' is not a valid author id.")]
    Invalid(String),
}

impl IdList {
    pub fn new(ids: Vec<Uuid>) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.0
    }
}

impl FromStr for IdList {
    type Err = IdListError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(trimmed);

        let ids = inner
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Uuid::parse_str(id).map_err(|_| IdListError::Invalid(id.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        if ids.is_empty() {
            return Err(IdListError::Empty);
        }
        Ok(Self(ids))
    }
}

impl fmt::Display for IdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, id) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}
