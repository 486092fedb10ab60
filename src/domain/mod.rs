pub mod message;
pub mod types;

pub use message::MessageRecord;
pub use types::{Category, CategoryCounts, CountsSnapshot};
