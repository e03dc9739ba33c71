pub mod priority;
pub mod query;

pub use priority::{derive_priority, Priority, TaskSnapshot};
pub use query::{TaskFilter, TaskSort};
