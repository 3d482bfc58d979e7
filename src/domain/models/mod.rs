//! Domain models: task envelope, metadata labels, key families,
//! stored records, and the rich-text node tree for mail bodies.

pub mod key;
pub mod metadata;
pub mod schema;
pub mod slate;
pub mod task;

pub use slate::{Node, Nodes};
pub use task::Task;
