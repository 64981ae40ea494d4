//! Todo entity, its status enum, and request validation
//!
//! Request bodies are deserialized into all-optional raw structs so that a
//! missing title or an unknown status surfaces as a `ValidationError`
//! (400) instead of a serde rejection. Unknown keys are ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

/// Maximum length for todo titles, in characters
pub const MAX_TITLE_LEN: usize = 255;

/// Todo status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    #[default]
    Pending,
    Done,
}

impl TodoStatus {
    /// Every accepted wire value, in declaration order
    pub const ALLOWED: &'static [&'static str] = &["pending", "done"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            other => Err(ValidationError::InvalidVariant {
                field: "status",
                value: other.to_owned(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl TryFrom<String> for TodoStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Validated todo title (1 to 255 characters)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoTitle(String);

impl TodoTitle {
    /// Create a new title, validating its length.
    ///
    /// # Example
    /// ```
    /// use todoctl_server::models::TodoTitle;
    ///
    /// assert!(TodoTitle::new("Buy milk").is_ok());
    /// assert!(TodoTitle::new("").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }

        if s.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TodoTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Todo record, as stored and as returned over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: TodoStatus,
}

/// A validated todo ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: TodoTitle,
    pub description: String,
    pub status: TodoStatus,
}

/// A validated partial update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<TodoTitle>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
}

impl TodoPatch {
    /// True when the patch would not change any column
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// Create todo request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl CreateTodoRequest {
    pub fn validate(self) -> Result<NewTodo, ValidationError> {
        let title = self
            .title
            .as_deref()
            .ok_or(ValidationError::Missing { field: "title" })
            .and_then(TodoTitle::new)?;

        let status = match self.status.as_deref() {
            Some(s) => s.parse()?,
            None => TodoStatus::default(),
        };

        Ok(NewTodo {
            title,
            description: self.description.unwrap_or_default(),
            status,
        })
    }
}

/// Update todo request body. Keys other than these three are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl UpdateTodoRequest {
    pub fn validate(self) -> Result<TodoPatch, ValidationError> {
        let status = self
            .status
            .as_deref()
            .map(TodoStatus::from_str)
            .transpose()?;

        let title = self.title.as_deref().map(TodoTitle::new).transpose()?;

        Ok(TodoPatch {
            title,
            description: self.description,
            status,
        })
    }
}
