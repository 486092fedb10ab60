pub mod debounce;
pub mod mutation;
pub mod scanner;

pub use scanner::{InboxWatcher, ScanState, LOADED_MARKER};
