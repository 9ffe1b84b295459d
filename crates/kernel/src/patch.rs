//! Sparse patch documents (RFC 6902 operations over top-level object members).
//!
//! A [`PatchDocument`] is applied to any serde-round-trippable payload by
//! projecting it into a JSON object, editing members, and reading it back.
//! Each operation either lands whole or is reported as a [`PatchError`];
//! later operations still run.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// One edit. A missing `value` reads as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl PatchOperation {
    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.into(),
            from: None,
            value: value.into(),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            from: None,
            value: Value::Null,
        }
    }

    pub fn copy(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Copy,
            path: path.into(),
            from: Some(from.into()),
            value: Value::Null,
        }
    }

    fn apply(&self, members: &mut Map<String, Value>) -> Result<(), PatchError> {
        let target = resolve(members, &self.path)?;
        match self.op {
            PatchOp::Add | PatchOp::Replace => {
                members.insert(target, self.value.clone());
            }
            PatchOp::Remove => {
                members.insert(target, Value::Null);
            }
            PatchOp::Copy | PatchOp::Move => {
                let from = self.from.as_deref().ok_or_else(|| PatchError::MissingFrom {
                    path: self.path.clone(),
                })?;
                let source = resolve(members, from)?;
                let value = members.get(&source).cloned().unwrap_or(Value::Null);
                if self.op == PatchOp::Move && source != target {
                    members.insert(source, Value::Null);
                }
                members.insert(target, value);
            }
            PatchOp::Test => {
                if members.get(&target) != Some(&self.value) {
                    return Err(PatchError::TestFailed {
                        path: self.path.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("The patch target could not be projected: {0}")]
    Projection(String),

    #[error("The target location specified by path '{path}' was not found.")]
    UnknownPath { path: String },

    #[error("The '{path}' operation requires a 'from' location.")]
    MissingFrom { path: String },

    #[error("The current value at '{path}' is not equal to the test value.")]
    TestFailed { path: String },

    #[error("The value written to '{path}' is invalid for the target location.")]
    InvalidValue { path: String },
}

impl PatchError {
    /// Member name the error refers to, used as the violation key.
    pub fn field(&self) -> &str {
        match self {
            PatchError::Projection(_) => "$",
            PatchError::UnknownPath { path }
            | PatchError::MissingFrom { path }
            | PatchError::TestFailed { path }
            | PatchError::InvalidValue { path } => path.trim_start_matches('/'),
        }
    }
}

/// Ordered list of patch operations; deserializes from a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

impl PatchDocument {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self(operations)
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }

    /// Apply every operation to `target` in order.
    ///
    /// Successful operations are kept in `target` even when others fail;
    /// callers reject the whole payload on `Err`.
    pub fn apply_to<T>(&self, target: &mut T) -> Result<(), Vec<PatchError>>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut current = match serde_json::to_value(&*target) {
            Ok(Value::Object(members)) => members,
            Ok(other) => return Err(vec![PatchError::Projection(format!("not an object: {other}"))]),
            Err(e) => return Err(vec![PatchError::Projection(e.to_string())]),
        };

        let mut errors = Vec::new();
        for operation in &self.0 {
            let mut candidate = current.clone();
            let outcome = operation.apply(&mut candidate).and_then(|()| {
                serde_json::from_value::<T>(Value::Object(candidate.clone()))
                    .map(|_| ())
                    .map_err(|_| PatchError::InvalidValue {
                        path: operation.path.clone(),
                    })
            });
            match outcome {
                Ok(()) => current = candidate,
                Err(e) => errors.push(e),
            }
        }

        match serde_json::from_value(Value::Object(current)) {
            Ok(patched) => *target = patched,
            Err(e) => errors.push(PatchError::Projection(e.to_string())),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Map a JSON Pointer onto an existing top-level member, ignoring case.
fn resolve(members: &Map<String, Value>, pointer: &str) -> Result<String, PatchError> {
    let unknown = || PatchError::UnknownPath {
        path: pointer.to_string(),
    };
    let segment = pointer.strip_prefix('/').ok_or_else(unknown)?;
    if segment.is_empty() || segment.contains('/') {
        return Err(unknown());
    }
    let segment = segment.replace("~1", "/").replace("~0", "~");

    members
        .keys()
        .find(|key| key.eq_ignore_ascii_case(&segment))
        .cloned()
        .ok_or_else(unknown)
}
