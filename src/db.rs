pub mod state_repo;
pub use state_repo::{keys, load_json, save_json, MemoryStateStore, PgStateStore, StateStore};
