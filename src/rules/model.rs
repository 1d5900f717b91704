//! RuleSet document types: meta header, nodes, actions, and the trace
//! entries an execution emits.
//!
//! Documents are deserialized permissively into [`RawNode`] — a node that
//! is merely well-formed JSON/YAML, not yet a structurally valid rule. The
//! interpreter's pre-flight pass turns a `RawNode` into a validated [`Node`]
//! or reports an [`AuthoringError`]; a malformed document is a fatal
//! authoring problem, not a deserialization one.

use std::collections::BTreeMap;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::error::{AuthoringError, LoadError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
}

/// A node as it appears on the wire: every field optional, the contract
/// between `type` and the rest unenforced until validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub goto_true: Option<String>,
    #[serde(default)]
    pub goto_false: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<Json>>,
    #[serde(default)]
    pub cite: Option<Vec<String>>,
}

/// A structurally validated node: the enforced `Decision`/`Action`
/// discriminated union.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Decision {
        id: String,
        when: String,
        goto_true: Option<String>,
        goto_false: Option<String>,
        next: Option<String>,
        cite: Vec<String>,
    },
    Action {
        id: String,
        actions: Vec<Json>,
        next: Option<String>,
        cite: Vec<String>,
    },
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Decision { id, .. } | Node::Action { id, .. } => id,
        }
    }

    pub fn cite(&self) -> &[String] {
        match self {
            Node::Decision { cite, .. } | Node::Action { cite, .. } => cite,
        }
    }

    /// Every outgoing edge this node may route to, in no particular order.
    pub fn edges(&self) -> Vec<&str> {
        match self {
            Node::Decision {
                goto_true,
                goto_false,
                next,
                ..
            } => [goto_true, goto_false, next]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect(),
            Node::Action { next, .. } => next.iter().map(String::as_str).collect(),
        }
    }

    /// Validate one raw node's structural contract (§3), without regard to
    /// whether its edges resolve to existing ids.
    pub fn validate(raw: &RawNode, index: usize) -> Result<Node, AuthoringError> {
        let id = match &raw.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => return Err(AuthoringError::MissingId { index }),
        };

        match raw.kind.as_deref() {
            Some("decision") => {
                if raw.actions.is_some() {
                    return Err(AuthoringError::DecisionWithActions { id });
                }
                Ok(Node::Decision {
                    when: raw.when.clone().unwrap_or_default(),
                    goto_true: raw.goto_true.clone(),
                    goto_false: raw.goto_false.clone(),
                    next: raw.next.clone(),
                    cite: raw.cite.clone().unwrap_or_default(),
                    id,
                })
            }
            Some("action") => {
                if raw.when.is_some() {
                    return Err(AuthoringError::ActionWithWhen { id });
                }
                Ok(Node::Action {
                    actions: raw.actions.clone().unwrap_or_default(),
                    next: raw.next.clone(),
                    cite: raw.cite.clone().unwrap_or_default(),
                    id,
                })
            }
            other => Err(AuthoringError::InvalidKind {
                id,
                kind: other.unwrap_or("").to_string(),
            }),
        }
    }
}

/// A declarative decision graph: a meta header plus an ordered list of
/// raw nodes, as loaded verbatim from a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub meta: Meta,
    pub nodes: Vec<RawNode>,
}

impl RuleSet {
    pub fn from_yaml_str(src: &str) -> Result<RuleSet, LoadError> {
        Ok(serde_yaml::from_str(src)?)
    }

    pub fn from_json_str(src: &str) -> Result<RuleSet, LoadError> {
        Ok(serde_json::from_str(src)?)
    }

    /// Validate every node's structural contract and id uniqueness,
    /// returning the validated nodes keyed by id in traversal order.
    pub fn validate_nodes(&self) -> Result<Vec<Node>, AuthoringError> {
        let mut seen = BTreeMap::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (index, raw) in self.nodes.iter().enumerate() {
            let node = Node::validate(raw, index)?;
            if seen.insert(node.id().to_string(), ()).is_some() {
                return Err(AuthoringError::DuplicateId {
                    id: node.id().to_string(),
                });
            }
            nodes.push(node);
        }
        Ok(nodes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Decision,
    Action,
    SafetyStop,
}

/// One entry in an execution trace. Stamped with the rule set's identity
/// (`profile`, `version`, `rule_hash`) so a trace is self-describing once
/// detached from the `RuleSet` that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub node_id: String,
    pub kind: TraceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Json>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cite: Vec<String>,
    pub profile: String,
    pub version: String,
    pub rule_hash: String,
    pub timestamp: String,
}

impl TraceEntry {
    pub fn now_timestamp() -> String {
        Local::now().to_rfc3339()
    }
}

/// The four action types the core recognizes without privileging
/// semantically. Anything else is permitted at runtime and flagged by the
/// linter as `UNKNOWN_ACTION_TYPE`.
pub const KNOWN_ACTION_TYPES: &[&str] =
    &["suggest_referral", "order_test", "set_followup", "abstain"];

pub fn action_type(action: &Json) -> Option<&str> {
    action.get("type").and_then(Json::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_decision_node() {
        let raw = RawNode {
            id: Some("n1".into()),
            kind: Some("decision".into()),
            when: Some("true".into()),
            ..Default::default()
        };
        assert!(matches!(Node::validate(&raw, 0), Ok(Node::Decision { .. })));
    }

    #[test]
    fn rejects_decision_with_actions() {
        let raw = RawNode {
            id: Some("n1".into()),
            kind: Some("decision".into()),
            when: Some("true".into()),
            actions: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            Node::validate(&raw, 0),
            Err(AuthoringError::DecisionWithActions { id: "n1".into() })
        );
    }

    #[test]
    fn rejects_action_with_when() {
        let raw = RawNode {
            id: Some("n1".into()),
            kind: Some("action".into()),
            when: Some("true".into()),
            actions: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            Node::validate(&raw, 0),
            Err(AuthoringError::ActionWithWhen { id: "n1".into() })
        );
    }

    #[test]
    fn rejects_missing_id() {
        let raw = RawNode {
            kind: Some("decision".into()),
            ..Default::default()
        };
        assert_eq!(Node::validate(&raw, 3), Err(AuthoringError::MissingId { index: 3 }));
    }

    #[test]
    fn rejects_invalid_kind() {
        let raw = RawNode {
            id: Some("n1".into()),
            kind: Some("bogus".into()),
            ..Default::default()
        };
        assert!(matches!(Node::validate(&raw, 0), Err(AuthoringError::InvalidKind { .. })));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let ruleset = RuleSet {
            meta: Meta::default(),
            nodes: vec![
                RawNode {
                    id: Some("x".into()),
                    kind: Some("action".into()),
                    actions: Some(vec![serde_json::json!({"type": "abstain"})]),
                    ..Default::default()
                },
                RawNode {
                    id: Some("x".into()),
                    kind: Some("action".into()),
                    actions: Some(vec![serde_json::json!({"type": "abstain"})]),
                    ..Default::default()
                },
            ],
        };
        assert_eq!(
            ruleset.validate_nodes(),
            Err(AuthoringError::DuplicateId { id: "x".into() })
        );
    }

    #[test]
    fn loads_yaml_document() {
        let doc = "
meta:
  profile: demo
nodes:
  - id: a
    type: action
    actions:
      - type: abstain
        reason: test
";
        let ruleset = RuleSet::from_yaml_str(doc).unwrap();
        assert_eq!(ruleset.meta.profile.as_deref(), Some("demo"));
        assert_eq!(ruleset.nodes.len(), 1);
    }
}
