use serde::{Serialize, Serializer};
use thiserror::Error;

use liftlog_types::api::Field;

pub type CoreResult<T> = Result<T, CoreError>;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    /// Missing record, or a record owned by someone else. The two are
    /// reported identically so other users' ids are not disclosed.
    #[error("not found")]
    NotFound,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Field path → messages, e.g. `exercises[1].sets`.
///
/// Fields keep the order they were first reported in, so `exercises[2]`
/// comes before `exercises[10]`. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, Vec<String>)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.0.push((field, vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter().map(|(name, messages)| (name, messages))
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> CoreResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }

    /// Value of a field that must be present and not null.
    pub fn required<T>(&mut self, name: &str, field: Field<T>) -> Option<T> {
        match field {
            Field::Value(v) => Some(v),
            Field::Absent => {
                self.add(name, REQUIRED);
                None
            }
            Field::Null => {
                self.add(name, NULL);
                None
            }
            Field::Invalid(message) => {
                self.add(name, message);
                None
            }
        }
    }

    /// Value of a field that may be left out but not set to null.
    pub fn optional<T>(&mut self, name: &str, field: Field<T>) -> Option<T> {
        match field {
            Field::Absent => None,
            other => self.required(name, other),
        }
    }

    /// Nullable field in a partial update: `None` keeps the stored value,
    /// `Some(None)` clears it.
    pub fn nullable<T>(&mut self, name: &str, field: Field<T>) -> Option<Option<T>> {
        match field {
            Field::Absent => None,
            Field::Null => Some(None),
            other => self.required(name, other).map(Some),
        }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
