//! A deterministic, auditable rule-execution engine for clinical triage
//! workflows: a boolean condition language, a rule-graph interpreter with
//! safety stops, and a static rule linter.

pub mod config;
pub mod expr;
pub mod rules;
pub mod value;

pub use config::EngineConfig;
pub use expr::{evaluate, CmpOp, Expr, ExprError};
pub use rules::{execute, execute_with_config, lint, AuthoringError, Diagnostic, LoadError, RuleSet};
pub use value::{Case, Value};
