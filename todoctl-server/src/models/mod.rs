//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod todo;

pub use validation::ValidationError;
pub use todo::{
    CreateTodoRequest, NewTodo, Todo, TodoPatch, TodoStatus, TodoTitle, UpdateTodoRequest,
    MAX_TITLE_LEN,
};
