//! Static analysis of a [`RuleSet`], independent of any case (§4.6).

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value as Json;

use super::model::{action_type, Node, RuleSet, KNOWN_ACTION_TYPES};

/// One linter finding: a tag, a human-readable message, and the node it
/// concerns (if any is applicable).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub tag: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl Diagnostic {
    fn new(tag: &str, message: String, node_id: Option<String>) -> Self {
        Self {
            tag: tag.to_string(),
            message,
            node_id,
        }
    }
}

/// Run every structural check against `ruleset`, plus JSON Schema
/// validation when both `schema` and the raw document `raw` are supplied.
pub fn lint(ruleset: &RuleSet, schema: Option<&Json>, raw: Option<&Json>) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut known_ids: HashSet<String> = HashSet::new();

    for node in &ruleset.nodes {
        let label = node.id.clone().filter(|s| !s.is_empty());
        if let Some(id) = &label {
            if !seen_ids.insert(id.clone()) {
                diags.push(Diagnostic::new(
                    "DUPLICATE_ID",
                    format!("id `{id}` appears more than once"),
                    Some(id.clone()),
                ));
            } else {
                known_ids.insert(id.clone());
            }
        }

        let is_decision = node.kind.as_deref() == Some("decision");
        let is_action = node.kind.as_deref() == Some("action");

        if is_decision && node.actions.is_some() {
            diags.push(Diagnostic::new(
                "STRUCTURE_ERROR",
                "decision node carries an actions field".into(),
                label.clone(),
            ));
        }
        if is_action && node.when.is_some() {
            diags.push(Diagnostic::new(
                "STRUCTURE_ERROR",
                "action node carries a when field".into(),
                label.clone(),
            ));
        }
        if is_decision && node.when.is_none() {
            diags.push(Diagnostic::new(
                "MISSING_FIELD",
                "decision node missing when".into(),
                label.clone(),
            ));
        }
        if is_action && node.actions.is_none() {
            diags.push(Diagnostic::new(
                "MISSING_FIELD",
                "action node missing actions".into(),
                label.clone(),
            ));
        }
        if is_action {
            if let Some(actions) = &node.actions {
                if actions.is_empty() {
                    diags.push(Diagnostic::new(
                        "EMPTY_ACTIONS",
                        "action node has an empty action list".into(),
                        label.clone(),
                    ));
                }
                for action in actions {
                    if !action.is_object() {
                        diags.push(Diagnostic::new(
                            "INVALID_ACTION",
                            "action entry is not a mapping".into(),
                            label.clone(),
                        ));
                        continue;
                    }
                    match action_type(action) {
                        Some(t) if !KNOWN_ACTION_TYPES.contains(&t) => {
                            diags.push(Diagnostic::new(
                                "UNKNOWN_ACTION_TYPE",
                                format!("unrecognized action type `{t}`"),
                                label.clone(),
                            ));
                        }
                        None => {
                            diags.push(Diagnostic::new(
                                "INVALID_ACTION",
                                "action entry missing a string type".into(),
                                label.clone(),
                            ));
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    if let Some(entry) = &ruleset.meta.entry {
        if !known_ids.contains(entry) {
            diags.push(Diagnostic::new(
                "MISSING_NODE",
                format!("meta.entry references unknown node `{entry}`"),
                None,
            ));
        }
    }
    for node in &ruleset.nodes {
        let label = node.id.clone().filter(|s| !s.is_empty());
        for (field_name, target) in [
            ("next", &node.next),
            ("goto_true", &node.goto_true),
            ("goto_false", &node.goto_false),
        ] {
            if let Some(target_id) = target {
                if !known_ids.contains(target_id) {
                    diags.push(Diagnostic::new(
                        "MISSING_NODE",
                        format!("{field_name} references unknown node `{target_id}`"),
                        label.clone(),
                    ));
                }
            }
        }
    }

    if let Ok(nodes) = ruleset.validate_nodes() {
        let by_id: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id(), n)).collect();
        let entry_id = ruleset
            .meta
            .entry
            .clone()
            .or_else(|| nodes.first().map(|n| n.id().to_string()));

        if let Some(entry_id) = &entry_id {
            if by_id.contains_key(entry_id.as_str()) {
                let reachable = reachable_from(entry_id, &by_id);
                for node in &nodes {
                    if node.id() != entry_id && !reachable.contains(node.id()) {
                        diags.push(Diagnostic::new(
                            "UNREACHABLE_NODE",
                            format!("node `{}` is not reachable from the entry", node.id()),
                            Some(node.id().to_string()),
                        ));
                    }
                }
            }
        }

        for (cycle_entry, path) in find_cycles(&nodes) {
            diags.push(Diagnostic::new(
                "CYCLE_DETECTED",
                format!("cycle: {}", path.join(" -> ")),
                Some(cycle_entry),
            ));
        }
    }

    if let (Some(schema), Some(raw)) = (schema, raw) {
        diags.extend(super::schema::lint_against_schema(raw, schema));
    }

    diags
}

fn reachable_from(entry: &str, by_id: &HashMap<&str, &Node>) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut stack = vec![entry.to_string()];
    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(node) = by_id.get(id.as_str()) {
            for edge in node.edges() {
                if !seen.contains(edge) {
                    stack.push(edge.to_string());
                }
            }
        }
    }
    seen
}

/// DFS with an explicit recursion stack; a back edge into a gray node is a
/// cycle. Reports the cycle's closing node id and the path that forms it.
fn find_cycles(nodes: &[Node]) -> Vec<(String, Vec<String>)> {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    fn visit(
        id: &str,
        by_id: &HashMap<String, &Node>,
        color: &mut HashMap<String, Color>,
        stack: &mut Vec<String>,
        cycles: &mut Vec<(String, Vec<String>)>,
    ) {
        color.insert(id.to_string(), Color::Gray);
        stack.push(id.to_string());
        if let Some(node) = by_id.get(id) {
            for edge in node.edges() {
                match color.get(edge).copied() {
                    Some(Color::Gray) => {
                        let start = stack.iter().position(|x| x == edge).unwrap();
                        let mut path = stack[start..].to_vec();
                        path.push(edge.to_string());
                        cycles.push((edge.to_string(), path));
                    }
                    Some(Color::White) => visit(edge, by_id, color, stack, cycles),
                    Some(Color::Black) | None => {}
                }
            }
        }
        stack.pop();
        color.insert(id.to_string(), Color::Black);
    }

    let by_id: HashMap<String, &Node> = nodes.iter().map(|n| (n.id().to_string(), n)).collect();
    let mut color: HashMap<String, Color> =
        nodes.iter().map(|n| (n.id().to_string(), Color::White)).collect();
    let mut stack = Vec::new();
    let mut cycles = Vec::new();

    for node in nodes {
        if color.get(node.id()).copied() == Some(Color::White) {
            visit(node.id(), &by_id, &mut color, &mut stack, &mut cycles);
        }
    }
    cycles
}
