// todostore - Single-list todo manager persisted to a local key-value slot

pub mod config;
pub mod filter;
pub mod shell;
pub mod slot;
pub mod store;
pub mod task;
pub mod view;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use filter::Filter;
pub use slot::{FileSlot, MemorySlot, Slot, SqliteSlot, TODOS_KEY};
pub use store::{Change, Counts, StoreOptions, TaskListStore};
pub use task::Task;
