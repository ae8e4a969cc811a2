//! Todo operations scoped to the authenticated caller.
//!
//! A todo that exists but belongs to someone else is reported exactly like a
//! todo that does not exist.

use std::sync::Arc;

use mockable::Clock;
use uuid::Uuid;

use crate::{
    error::AppError,
    model::{CurrentUser, NewTodo, StatusFilter, Todo},
    repository::TodoRepository,
};

/// Longest accepted name, in UTF-16 code units as browsers count them.
pub const MAX_NAME_UNITS: usize = 255;

pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl TodoService {
    pub fn new(repository: Arc<dyn TodoRepository>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { repository, clock }
    }

    pub async fn list(
        &self,
        user: &CurrentUser,
        filter: StatusFilter,
    ) -> Result<Vec<Todo>, AppError> {
        Ok(self.repository.list(user.id(), filter).await?)
    }

    /// Rejects invalid names before the store is touched.
    pub async fn create(&self, user: &CurrentUser, name: String) -> Result<Todo, AppError> {
        validate_name(&name)?;

        let todo = NewTodo {
            id: Uuid::new_v4().to_string(),
            user_id: user.id().to_owned(),
            name,
            created_at: self.clock.utc(),
        };
        Ok(self.repository.insert(todo).await?)
    }

    pub async fn get(&self, user: &CurrentUser, id: &str) -> Result<Todo, AppError> {
        self.repository
            .find(user.id(), id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, user: &CurrentUser, id: &str) -> Result<(), AppError> {
        self.get(user, id).await?;

        // Gone between the lookup and the delete.
        if !self.repository.delete(user.id(), id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn complete(&self, user: &CurrentUser, id: &str) -> Result<Todo, AppError> {
        self.transition(user, id, true).await
    }

    pub async fn incomplete(&self, user: &CurrentUser, id: &str) -> Result<Todo, AppError> {
        self.transition(user, id, false).await
    }

    /// Moves a todo to `completed`. Already being there is a no-op that
    /// returns the stored todo without writing.
    async fn transition(
        &self,
        user: &CurrentUser,
        id: &str,
        completed: bool,
    ) -> Result<Todo, AppError> {
        let todo = self.get(user, id).await?;
        if todo.completed == completed {
            return Ok(todo);
        }

        self.repository
            .set_completed(user.id(), id, completed, self.clock.utc())
            .await?
            .ok_or(AppError::NotFound)
    }
}

pub fn validate_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    if name.encode_utf16().count() > MAX_NAME_UNITS {
        return Err(AppError::Validation(format!(
            "name must be at most {MAX_NAME_UNITS} characters"
        )));
    }
    Ok(())
}
