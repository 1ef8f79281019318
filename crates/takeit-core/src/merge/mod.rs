//! Schema-tolerant merge of a backup snapshot into the live store

mod engine;
mod resolver;

pub use engine::MergeEngine;
pub use resolver::resolve;
