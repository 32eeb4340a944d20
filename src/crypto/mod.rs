pub mod token;

pub use token::{generate_todo_id, generate_token};
