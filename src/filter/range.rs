//! Version-range extraction for requirement display.

use super::ast::{CompareOp, FilterNode};

const DEFAULT_LOWER: &str = "[0.0.0";
const DEFAULT_UPPER: &str = "infinity)";

/// A requirement rendered as a name plus bracket-notation bounds,
/// e.g. `org.osgi.service.log` with `[1.3.0` and `2.0.0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRange {
    pub name: String,
    pub lower: String,
    pub upper: String,
}

impl DisplayRange {
    /// The combined bounds, e.g. `[1.3.0, 2.0.0)`.
    pub fn bounds(&self) -> String {
        format!("{}, {}", self.lower, self.upper)
    }
}

/// Extract a display range from a simplified filter.
///
/// Matches an `And` of comparisons with exactly one `=` naming operand and
/// any number of range bounds over one shared attribute; a lone `=`
/// comparison yields the default bounds. Returns `None` for every other
/// shape, in which case callers show the raw filter text.
pub fn extract_range(node: &FilterNode) -> Option<DisplayRange> {
    match node {
        FilterNode::Comparison {
            op: CompareOp::Eq,
            value: Some(value),
            ..
        } => Some(DisplayRange {
            name: value.clone(),
            lower: DEFAULT_LOWER.to_string(),
            upper: DEFAULT_UPPER.to_string(),
        }),

        FilterNode::And(operands) => {
            let mut name: Option<&str> = None;
            let mut bound_attr: Option<&str> = None;
            let mut lower: Option<String> = None;
            let mut upper: Option<String> = None;

            for operand in operands {
                let FilterNode::Comparison {
                    op,
                    attribute,
                    value,
                } = operand
                else {
                    return None;
                };

                match op {
                    CompareOp::Eq => {
                        let value = value.as_deref()?;
                        // A second naming comparison is not a range shape.
                        if name.replace(value).is_some() {
                            return None;
                        }
                    }
                    CompareOp::Ge | CompareOp::Gt | CompareOp::Le | CompareOp::Lt => {
                        let value = value.as_deref()?;
                        if !same_attribute(&mut bound_attr, attribute) {
                            return None;
                        }
                        match op {
                            CompareOp::Ge => lower = Some(format!("[{}", value)),
                            CompareOp::Gt => lower = Some(format!("({}", value)),
                            CompareOp::Le => upper = Some(format!("{}]", value)),
                            _ => upper = Some(format!("{})", value)),
                        }
                    }
                    CompareOp::Approx | CompareOp::Present => return None,
                }
            }

            Some(DisplayRange {
                name: name?.to_string(),
                lower: lower.unwrap_or_else(|| DEFAULT_LOWER.to_string()),
                upper: upper.unwrap_or_else(|| DEFAULT_UPPER.to_string()),
            })
        }

        _ => None,
    }
}

/// All bounds must target one attribute; the first one seen pins it.
fn same_attribute<'a>(slot: &mut Option<&'a str>, attribute: &'a str) -> bool {
    match slot {
        None => {
            *slot = Some(attribute);
            true
        }
        Some(existing) => *existing == attribute,
    }
}
