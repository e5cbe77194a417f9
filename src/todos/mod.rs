//! Task records served by the API.

pub mod types;

pub use types::{fixed_list, Todo};
