//! Universal properties from the testable-properties section: determinism
//! of a single execution, and hash stability/sensitivity at the document
//! loader boundary.

use triage_engine::rules::{canonical_hash, execute, RuleSet};
use triage_engine::value::Case;

const RULESET_YAML: &str = "
meta:
  profile: retina
  version: '1.0'
  entry: check
nodes:
  - id: check
    type: decision
    when: macula.edema_prob >= 0.70
    goto_true: refer
    goto_false: followup
  - id: followup
    type: action
    actions:
      - type: set_followup
        interval: 12m
  - id: refer
    type: action
    actions:
      - type: order_test
        test_type: OCT_macula
";

#[test]
fn two_executions_agree_once_timestamps_are_stripped() {
    let ruleset = RuleSet::from_yaml_str(RULESET_YAML).unwrap();
    let case: Case = serde_yaml::from_str("macula:\n  edema_prob: 0.71\n").unwrap();

    let (actions_a, trace_a) = execute(&ruleset, &case).unwrap();
    let (actions_b, trace_b) = execute(&ruleset, &case).unwrap();

    assert_eq!(actions_a, actions_b);
    assert_eq!(trace_a.len(), trace_b.len());
    for (a, b) in trace_a.iter().zip(trace_b.iter()) {
        let mut a = a.clone();
        let mut b = b.clone();
        a.timestamp.clear();
        b.timestamp.clear();
        assert_eq!(a, b);
    }
}

#[test]
fn hash_is_stable_across_key_order_in_the_source_document() {
    let reordered = "
nodes:
  - type: decision
    id: check
    goto_false: followup
    goto_true: refer
    when: macula.edema_prob >= 0.70
  - actions:
      - interval: 12m
        type: set_followup
    id: followup
    type: action
  - id: refer
    type: action
    actions:
      - test_type: OCT_macula
        type: order_test
meta:
  version: '1.0'
  profile: retina
  entry: check
";
    let a = RuleSet::from_yaml_str(RULESET_YAML).unwrap();
    let b = RuleSet::from_yaml_str(reordered).unwrap();
    assert_eq!(canonical_hash(&a), canonical_hash(&b));
}

#[test]
fn hash_changes_with_a_semantic_edit() {
    let a = RuleSet::from_yaml_str(RULESET_YAML).unwrap();
    let edited = RULESET_YAML.replace("0.70", "0.75");
    let b = RuleSet::from_yaml_str(&edited).unwrap();
    assert_ne!(canonical_hash(&a), canonical_hash(&b));
}

#[test]
fn rule_hash_is_identical_across_all_trace_entries() {
    let ruleset = RuleSet::from_yaml_str(RULESET_YAML).unwrap();
    let case: Case = serde_yaml::from_str("macula:\n  edema_prob: 0.71\n").unwrap();
    let (_actions, trace) = execute(&ruleset, &case).unwrap();
    let hashes: std::collections::HashSet<_> = trace.iter().map(|e| e.rule_hash.clone()).collect();
    assert_eq!(hashes.len(), 1);
}
