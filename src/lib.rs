pub mod config;
pub mod engine;
pub mod executor;
pub mod planner;
pub mod storage;
pub mod types;
pub mod utils;

pub use config::EngineConfig;
pub use engine::{Engine, Session};
pub use types::error::DatabaseError;
