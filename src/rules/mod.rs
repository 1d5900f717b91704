//! Rule graphs: document types, canonical hashing, the interpreter, and the
//! static linter.

pub mod error;
pub mod hash;
pub mod interpreter;
pub mod linter;
pub mod model;
pub mod schema;

pub use error::{AuthoringError, LoadError};
pub use hash::canonical_hash;
pub use interpreter::{execute, execute_with_config};
pub use linter::{lint, Diagnostic};
pub use model::{Meta, Node, RawNode, RuleSet, TraceEntry, TraceKind};
