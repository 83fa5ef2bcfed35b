pub mod json_store;
pub mod kv;

pub use json_store::{TASKS_KEY, THEME_KEY, TaskStore, ThemeStore, data_dir};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
