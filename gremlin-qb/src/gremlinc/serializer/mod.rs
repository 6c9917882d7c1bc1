//! Lowering of traversals into the forms a Gremlin server accepts.

pub mod bytecode;
pub mod groovy;

pub use bytecode::{Argument, Bytecode, Instruction};
pub use groovy::GroovyScript;

use serde::Serialize;

/// What is handed to a [`crate::query::environment::QueryExecutor`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SerializedQuery {
    Bytecode(Bytecode),
    Groovy(GroovyScript),
}
