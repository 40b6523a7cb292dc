pub mod config;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;

pub use config::Config;
pub use model::task::{Priority, Task, TaskDraft};
pub use repository::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use service::task_store::{TaskStore, STORAGE_KEY};
pub use time::{parse_due_date, parse_due_date_local};
