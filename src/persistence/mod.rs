//! This module contains the state management logic for the application.

pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::PersistenceError;
pub use sqlite::SqliteWatcherRepository;
