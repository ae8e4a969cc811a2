use chrono::{DateTime, Utc};

use crate::error::{AppError, StoreError};

// Data model representing a Todo item as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Row layout of the `todo` table; timestamps are unix milliseconds
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TodoRow {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) name: String,
    pub(crate) completed: bool,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl TryFrom<TodoRow> for Todo {
    type Error = StoreError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        Ok(Todo {
            created_at: from_millis(row.created_at, &row.id)?,
            updated_at: from_millis(row.updated_at, &row.id)?,
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            completed: row.completed,
        })
    }
}

fn from_millis(millis: i64, id: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::CorruptRow(format!("todo {id} has timestamp {millis}")))
}

/// Insert payload built by the service; the store never picks ids or times.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// The caller resolved by the authorization guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub(crate) user_id: String,
}

impl CurrentUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.user_id
    }
}

/// Which todos a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Completed,
    Incompleted,
}

impl StatusFilter {
    /// Decodes the `status` query parameter. Absent means [`StatusFilter::All`].
    pub fn from_query(status: Option<&str>) -> Result<Self, AppError> {
        match status {
            None => Ok(StatusFilter::All),
            Some("completed") => Ok(StatusFilter::Completed),
            Some("incompleted") => Ok(StatusFilter::Incompleted),
            Some(other) => Err(AppError::Validation(format!(
                "status must be one of completed, incompleted; got {other:?}"
            ))),
        }
    }

    /// The `completed` value rows must carry, if the filter restricts it.
    pub fn completed(self) -> Option<bool> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Completed => Some(true),
            StatusFilter::Incompleted => Some(false),
        }
    }
}
