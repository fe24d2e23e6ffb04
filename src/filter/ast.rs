//! AST types for requirement filters.

use std::fmt;

/// One node of a parsed filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    /// Boolean AND: `(&(f)(g))` - never empty
    And(Vec<FilterNode>),

    /// Boolean OR: `(|(f)(g))` - never empty
    Or(Vec<FilterNode>),

    /// Boolean NOT: `(!(f))`
    Not(Box<FilterNode>),

    /// Attribute comparison: `(version>=1.0)`, `(package=*)`.
    /// `value` is `None` only for presence tests.
    Comparison {
        op: CompareOp,
        attribute: String,
        value: Option<String>,
    },
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,      // =
    Approx,  // ~=
    Ge,      // >=
    Le,      // <=
    Gt,      // >  (simplify output only)
    Lt,      // <  (simplify output only)
    Present, // =*
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Approx => write!(f, "~="),
            CompareOp::Ge => write!(f, ">="),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Present => write!(f, "=*"),
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::And(operands) => {
                write!(f, "(&")?;
                for operand in operands {
                    write!(f, "{}", operand)?;
                }
                write!(f, ")")
            }
            FilterNode::Or(operands) => {
                write!(f, "(|")?;
                for operand in operands {
                    write!(f, "{}", operand)?;
                }
                write!(f, ")")
            }
            FilterNode::Not(operand) => write!(f, "(!{})", operand),
            FilterNode::Comparison {
                op,
                attribute,
                value,
            } => match value {
                Some(value) => write!(f, "({}{}{})", attribute, op, value),
                None => write!(f, "({}{})", attribute, op),
            },
        }
    }
}

impl FilterNode {
    /// Rewrite negated range comparisons into direct comparisons for display.
    ///
    /// `(!(a>=v))` becomes `(a>v)` and `(!(a<=v))` becomes `(a<v)`: the bound
    /// stays on the same side, which narrows the displayed range instead of
    /// applying strict logical negation. Every other `Not` form is left
    /// untouched. The pass is idempotent.
    pub fn simplify(self) -> Self {
        match self {
            FilterNode::And(operands) => {
                FilterNode::And(operands.into_iter().map(Self::simplify).collect())
            }
            FilterNode::Or(operands) => {
                FilterNode::Or(operands.into_iter().map(Self::simplify).collect())
            }
            FilterNode::Not(operand) => match *operand {
                FilterNode::Comparison {
                    op: CompareOp::Ge,
                    attribute,
                    value,
                } => FilterNode::Comparison {
                    op: CompareOp::Gt,
                    attribute,
                    value,
                },
                FilterNode::Comparison {
                    op: CompareOp::Le,
                    attribute,
                    value,
                } => FilterNode::Comparison {
                    op: CompareOp::Lt,
                    attribute,
                    value,
                },
                other => FilterNode::Not(Box::new(other)),
            },
            other => other,
        }
    }
}
