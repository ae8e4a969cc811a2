use crate::model::Todo;

// Struct representing the request body for creating a new Todo
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CreateTodoSchema {
    pub name: String,
}

// Query string accepted when listing todos
#[derive(Debug, serde::Deserialize)]
pub struct ListTodosQuery {
    pub status: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TodoResponse {
    pub todo: Todo,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
}
