pub mod forms;
pub mod models;

pub use models::{Identity, Owned, is_owner};
