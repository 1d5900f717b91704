//! Error types for rule loading and pre-flight validation.

use thiserror::Error;

/// Fatal, pre-flight errors: the rule set is broken at authoring time and
/// must be fixed before deployment. Never produced once traversal starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthoringError {
    #[error("node at index {index} is missing an id")]
    MissingId { index: usize },

    #[error("node {id} has invalid kind {kind:?}")]
    InvalidKind { id: String, kind: String },

    #[error("decision node {id} must not carry an actions field")]
    DecisionWithActions { id: String },

    #[error("action node {id} must not carry a when field")]
    ActionWithWhen { id: String },

    #[error("duplicate node id: {id}")]
    DuplicateId { id: String },
}

/// Errors from the YAML/JSON document loader. Never seen by `execute`
/// itself — only by the adapter that parses bytes into a `RuleSet`.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
