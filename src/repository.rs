//! Persistence of todo items.
//!
//! Every query here is filtered by the owning user id, so a repository call
//! can never observe or touch another user's rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, Pool, Sqlite};

use crate::{
    error::StoreError,
    model::{NewTodo, StatusFilter, Todo, TodoRow},
};

#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Owner's todos, incomplete first, then newest first, ties by id.
    async fn list(&self, owner: &str, filter: StatusFilter) -> Result<Vec<Todo>, StoreError>;
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError>;
    async fn find(&self, owner: &str, id: &str) -> Result<Option<Todo>, StoreError>;
    /// Returns whether a row was removed.
    async fn delete(&self, owner: &str, id: &str) -> Result<bool, StoreError>;
    /// Returns the updated row, or `None` if no owned row matched.
    async fn set_completed(
        &self,
        owner: &str,
        id: &str,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Todo>, StoreError>;
}

const TODO_COLUMNS: &str = "id, user_id, name, completed, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteTodoRepository {
    db: Pool<Sqlite>,
}

impl SqliteTodoRepository {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn list(&self, owner: &str, filter: StatusFilter) -> Result<Vec<Todo>, StoreError> {
        let rows = match filter.completed() {
            Some(completed) => {
                query_as::<_, TodoRow>(&format!(
                    "SELECT {TODO_COLUMNS} FROM todo WHERE user_id = ? AND completed = ? \
                     ORDER BY completed ASC, created_at DESC, id ASC"
                ))
                .bind(owner)
                .bind(completed)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                query_as::<_, TodoRow>(&format!(
                    "SELECT {TODO_COLUMNS} FROM todo WHERE user_id = ? \
                     ORDER BY completed ASC, created_at DESC, id ASC"
                ))
                .bind(owner)
                .fetch_all(&self.db)
                .await?
            }
        };

        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let created_at = todo.created_at.timestamp_millis();
        let row = query_as::<_, TodoRow>(&format!(
            "INSERT INTO todo (id, user_id, name, completed, created_at, updated_at) \
             VALUES (?, ?, ?, 0, ?, ?) RETURNING {TODO_COLUMNS}"
        ))
        .bind(todo.id)
        .bind(todo.user_id)
        .bind(todo.name)
        .bind(created_at)
        .bind(created_at)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn find(&self, owner: &str, id: &str) -> Result<Option<Todo>, StoreError> {
        let row = query_as::<_, TodoRow>(&format!(
            "SELECT {TODO_COLUMNS} FROM todo WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;

        row.map(Todo::try_from).transpose()
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<bool, StoreError> {
        let rows_affected = query("DELETE FROM todo WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn set_completed(
        &self,
        owner: &str,
        id: &str,
        completed: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Todo>, StoreError> {
        let row = query_as::<_, TodoRow>(&format!(
            "UPDATE todo SET completed = ?, updated_at = ? WHERE id = ? AND user_id = ? \
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(completed)
        .bind(updated_at.timestamp_millis())
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;

        row.map(Todo::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn repository() -> SqliteTodoRepository {
        let pool = db::connect("sqlite::memory:", 1).await.unwrap();
        for user in ["alice", "bob"] {
            db::insert_user(&pool, user).await.unwrap();
        }
        SqliteTodoRepository::new(pool)
    }

    fn new_todo(id: &str, owner: &str, millis: i64) -> NewTodo {
        NewTodo {
            id: id.into(),
            user_id: owner.into(),
            name: format!("todo {id}"),
            created_at: DateTime::<Utc>::from_timestamp_millis(millis).unwrap(),
        }
    }

    #[tokio::test]
    async fn equal_creation_times_break_ties_by_id() {
        let repo = repository().await;
        repo.insert(new_todo("b", "alice", 1_000)).await.unwrap();
        repo.insert(new_todo("a", "alice", 1_000)).await.unwrap();
        repo.insert(new_todo("c", "alice", 2_000)).await.unwrap();

        let ids: Vec<_> = repo
            .list("alice", StatusFilter::All)
            .await
            .unwrap()
            .into_iter()
            .map(|todo| todo.id)
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn mutations_are_scoped_to_the_owner() {
        let repo = repository().await;
        repo.insert(new_todo("t1", "alice", 1_000)).await.unwrap();

        assert!(repo.find("bob", "t1").await.unwrap().is_none());
        assert!(!repo.delete("bob", "t1").await.unwrap());
        let now = DateTime::<Utc>::from_timestamp_millis(5_000).unwrap();
        assert!(repo
            .set_completed("bob", "t1", true, now)
            .await
            .unwrap()
            .is_none());

        let todo = repo.find("alice", "t1").await.unwrap().unwrap();
        assert!(!todo.completed);
        assert_eq!(todo.updated_at.timestamp_millis(), 1_000);
    }

    #[tokio::test]
    async fn filter_restricts_by_completion() {
        let repo = repository().await;
        repo.insert(new_todo("t1", "alice", 1_000)).await.unwrap();
        repo.insert(new_todo("t2", "alice", 2_000)).await.unwrap();
        let now = DateTime::<Utc>::from_timestamp_millis(3_000).unwrap();
        repo.set_completed("alice", "t1", true, now).await.unwrap();

        let completed = repo.list("alice", StatusFilter::Completed).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, "t1");
        assert_eq!(completed[0].updated_at, now);

        let open = repo.list("alice", StatusFilter::Incompleted).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "t2");
    }

    #[tokio::test]
    async fn closed_pool_surfaces_as_store_error() {
        let repo = repository().await;
        repo.db.close().await;
        assert!(matches!(
            repo.list("alice", StatusFilter::All).await,
            Err(StoreError::Database(_))
        ));
    }
}
