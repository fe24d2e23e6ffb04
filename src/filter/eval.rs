//! Evaluator for filter trees against capability attribute maps.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::ast::{CompareOp, FilterNode};
use crate::version::Version;

/// Evaluate a filter against a set of capability attributes.
pub fn evaluate(node: &FilterNode, attrs: &HashMap<String, String>) -> bool {
    match node {
        FilterNode::And(operands) => operands.iter().all(|n| evaluate(n, attrs)),

        FilterNode::Or(operands) => operands.iter().any(|n| evaluate(n, attrs)),

        FilterNode::Not(operand) => !evaluate(operand, attrs),

        FilterNode::Comparison {
            op: CompareOp::Present,
            attribute,
            ..
        } => attrs.contains_key(attribute),

        FilterNode::Comparison {
            op,
            attribute,
            value,
        } => {
            let Some(actual) = attrs.get(attribute) else {
                return false;
            };
            let Some(expected) = value.as_deref() else {
                return false;
            };
            match op {
                CompareOp::Eq => {
                    if expected.contains('*') {
                        glob_match(expected, actual)
                    } else {
                        actual == expected
                    }
                }
                CompareOp::Approx => approx_eq(actual, expected),
                CompareOp::Ge => order_values(actual, expected) != Ordering::Less,
                CompareOp::Le => order_values(actual, expected) != Ordering::Greater,
                CompareOp::Gt => order_values(actual, expected) == Ordering::Greater,
                CompareOp::Lt => order_values(actual, expected) == Ordering::Less,
                CompareOp::Present => unreachable!("handled above"),
            }
        }
    }
}

/// Order two attribute values: as versions when both parse, then as numbers,
/// falling back to plain string ordering.
fn order_values(actual: &str, expected: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (
        actual.trim().parse::<Version>(),
        expected.trim().parse::<Version>(),
    ) {
        return a.cmp(&b);
    }
    if let (Ok(a), Ok(b)) = (actual.trim().parse::<f64>(), expected.trim().parse::<f64>())
        && let Some(ord) = a.partial_cmp(&b)
    {
        return ord;
    }
    actual.cmp(expected)
}

/// Approximate equality: ASCII case and whitespace are ignored.
fn approx_eq(actual: &str, expected: &str) -> bool {
    fn fold(s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }
    fold(actual) == fold(expected)
}

/// Match a `*` pattern: anchored prefix/suffix, inner segments in order.
fn glob_match(pattern: &str, value: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == value;
    }

    let mut remaining = value;

    let first = parts[0];
    if !first.is_empty() {
        if !remaining.starts_with(first) {
            return false;
        }
        remaining = &remaining[first.len()..];
    }

    let last = parts[parts.len() - 1];
    if !last.is_empty() {
        if !remaining.ends_with(last) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last.len()];
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match remaining.find(part) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }

    true
}
