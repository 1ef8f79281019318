//! Database layer for TakeIt

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use migrations::CURRENT_VERSION;
pub use repository::{NoteRepository, SqliteNoteRepository};
