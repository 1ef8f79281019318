pub mod add;
pub mod backup;
pub mod common;
pub mod completions;
pub mod delete;
pub mod export;
pub mod list;
pub mod merge;
pub mod restore;
pub mod tag;
pub mod trash;
pub mod upgrade;
