//! Graph traversal: validates a [`RuleSet`], computes its identity, and
//! walks it against a [`Case`] to produce actions and an audit trace
//! (§4.5).

use std::collections::{HashMap, HashSet};

use serde_json::Value as Json;

use crate::config::EngineConfig;
use crate::expr;
use crate::value::Case;

use super::error::AuthoringError;
use super::hash::canonical_hash;
use super::model::{Node, RuleSet, TraceEntry, TraceKind};

/// Run `ruleset` against `case` with the default [`EngineConfig`].
pub fn execute(
    ruleset: &RuleSet,
    case: &Case,
) -> Result<(Vec<Json>, Vec<TraceEntry>), AuthoringError> {
    execute_with_config(ruleset, case, &EngineConfig::default())
}

/// Run `ruleset` against `case`, overriding runtime bounds via `config`.
///
/// Returns `Err` only for pre-flight authoring errors (§7 layer 1). Every
/// runtime condition (missing node, cycle, iteration cap, evaluator
/// failure) is contained as a `SafetyStop` trace entry; this function never
/// raises once pre-flight passes.
pub fn execute_with_config(
    ruleset: &RuleSet,
    case: &Case,
    config: &EngineConfig,
) -> Result<(Vec<Json>, Vec<TraceEntry>), AuthoringError> {
    let nodes = ruleset.validate_nodes()?;
    let by_id: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id(), n)).collect();

    let rule_hash = canonical_hash(ruleset);
    let profile = ruleset.meta.profile.clone().unwrap_or_else(|| "default".to_string());
    let version = ruleset.meta.version.clone().unwrap_or_else(|| "unspecified".to_string());
    tracing::debug!(rule_hash = %rule_hash, node_count = nodes.len(), "executing rule set");

    let mut actions = Vec::new();
    let mut trace = Vec::new();

    let entry_id = match &ruleset.meta.entry {
        Some(entry) => {
            if !by_id.contains_key(entry.as_str()) {
                push_safety_stop(&mut trace, entry, "missing_node", &profile, &version, &rule_hash);
                return Ok((actions, trace));
            }
            entry.clone()
        }
        None => match nodes.first() {
            Some(n) => n.id().to_string(),
            None => return Ok((actions, trace)),
        },
    };

    let mut current_id = entry_id;
    let mut visited: HashSet<String> = HashSet::new();
    let mut iter: usize = 0;

    loop {
        if iter >= config.max_iterations {
            push_safety_stop(
                &mut trace,
                &current_id,
                "max_iterations_exceeded",
                &profile,
                &version,
                &rule_hash,
            );
            break;
        }
        iter += 1;

        if visited.contains(&current_id) {
            push_safety_stop(&mut trace, &current_id, "cycle_detected", &profile, &version, &rule_hash);
            break;
        }
        visited.insert(current_id.clone());

        let node = match by_id.get(current_id.as_str()) {
            Some(node) => *node,
            None => {
                push_safety_stop(&mut trace, &current_id, "missing_node", &profile, &version, &rule_hash);
                break;
            }
        };

        let next_id = match node {
            Node::Decision {
                id,
                when,
                goto_true,
                goto_false,
                next,
                cite,
            } => match expr::evaluate(when, case) {
                Ok(outcome) => {
                    trace.push(TraceEntry {
                        node_id: id.clone(),
                        kind: TraceKind::Decision,
                        outcome: Some(outcome.to_string()),
                        actions: None,
                        cite: cite.clone(),
                        profile: profile.clone(),
                        version: version.clone(),
                        rule_hash: rule_hash.clone(),
                        timestamp: TraceEntry::now_timestamp(),
                    });
                    let branch = if outcome { goto_true.as_ref() } else { goto_false.as_ref() };
                    branch.or(next.as_ref()).cloned()
                }
                Err(err) => {
                    push_safety_stop(
                        &mut trace,
                        id,
                        format!("interpreter_error: {err}"),
                        &profile,
                        &version,
                        &rule_hash,
                    );
                    break;
                }
            },
            Node::Action {
                id,
                actions: node_actions,
                next,
                cite,
            } => {
                trace.push(TraceEntry {
                    node_id: id.clone(),
                    kind: TraceKind::Action,
                    outcome: None,
                    actions: Some(node_actions.clone()),
                    cite: cite.clone(),
                    profile: profile.clone(),
                    version: version.clone(),
                    rule_hash: rule_hash.clone(),
                    timestamp: TraceEntry::now_timestamp(),
                });
                actions.extend(node_actions.iter().cloned());
                next.clone()
            }
        };

        match next_id {
            Some(target) => {
                if !by_id.contains_key(target.as_str()) {
                    push_safety_stop(&mut trace, &target, "missing_node", &profile, &version, &rule_hash);
                    break;
                }
                current_id = target;
            }
            None => break,
        }
    }

    Ok((actions, trace))
}

fn push_safety_stop(
    trace: &mut Vec<TraceEntry>,
    node_id: &str,
    outcome: impl Into<String>,
    profile: &str,
    version: &str,
    rule_hash: &str,
) {
    let outcome = outcome.into();
    tracing::warn!(node_id, outcome = %outcome, "safety stop");
    trace.push(TraceEntry {
        node_id: node_id.to_string(),
        kind: TraceKind::SafetyStop,
        outcome: Some(outcome),
        actions: None,
        cite: Vec::new(),
        profile: profile.to_string(),
        version: version.to_string(),
        rule_hash: rule_hash.to_string(),
        timestamp: TraceEntry::now_timestamp(),
    });
}
