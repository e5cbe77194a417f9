//! Task record definition and the fixed list.

use serde::{Deserialize, Serialize};

/// A task we wish to remember.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub completed: bool,
    /// Reference URL; empty when there is none.
    pub url: String,
    /// Ordering rank within the list.
    pub order: i32,
}

/// The list every request is answered with, built fresh per call.
pub fn fixed_list() -> Vec<Todo> {
    vec![Todo {
        id: 42,
        title: "MyTask".to_string(),
        completed: false,
        url: String::new(),
        order: 1,
    }]
}
