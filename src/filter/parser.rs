//! Parser for requirement filter strings.
//!
//! Grammar (in rough EBNF):
//!
//! filter      = "(" filter-body ")"
//! filter-body = "!" filter
//!             | ("&" | "|") filter+
//!             | comparison
//! comparison  = attribute operator value
//! operator    = "~=" | ">=" | "<=" | "="
//! value       = "*"                       (presence test, "=" only)
//!             | text without parentheses

use std::fmt;

use winnow::ascii::space0;
use winnow::combinator::{alt, delimited, preceded, repeat};
use winnow::prelude::*;
use winnow::stream::Stream;
use winnow::token::take_while;

use super::ast::{CompareOp, FilterNode};

/// A filter string that does not match the grammar.
///
/// Carries the offending tail of the input, starting at the position where
/// parsing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFilterError {
    pub offending: String,
}

impl fmt::Display for MalformedFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed filter near {:?}", self.offending)
    }
}

impl std::error::Error for MalformedFilterError {}

// Local result alias so winnow version bumps stay contained to this module
type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// Recognized operators; two-character tokens must be tried before `=`.
const OPERATORS: [(&str, CompareOp); 4] = [
    ("~=", CompareOp::Approx),
    (">=", CompareOp::Ge),
    ("<=", CompareOp::Le),
    ("=", CompareOp::Eq),
];

/// Parse one parenthesized filter.
fn filter(input: &mut &str) -> PResult<FilterNode> {
    delimited(('(', space0), filter_body, (space0, ')')).parse_next(input)
}

fn filter_body(input: &mut &str) -> PResult<FilterNode> {
    alt((not_expr, and_expr, or_expr, comparison)).parse_next(input)
}

fn not_expr(input: &mut &str) -> PResult<FilterNode> {
    let operand = preceded(('!', space0), filter).parse_next(input)?;
    Ok(FilterNode::Not(Box::new(operand)))
}

fn and_expr(input: &mut &str) -> PResult<FilterNode> {
    '&'.parse_next(input)?;
    let operands: Vec<FilterNode> = repeat(1.., preceded(space0, filter)).parse_next(input)?;
    Ok(FilterNode::And(operands))
}

fn or_expr(input: &mut &str) -> PResult<FilterNode> {
    '|'.parse_next(input)?;
    let operands: Vec<FilterNode> = repeat(1.., preceded(space0, filter)).parse_next(input)?;
    Ok(FilterNode::Or(operands))
}

/// Parse a simple comparison: everything up to the closing parenthesis,
/// split at the first recognized operator.
fn comparison(input: &mut &str) -> PResult<FilterNode> {
    let checkpoint = input.checkpoint();
    let body = take_while(1.., |c: char| c != '(' && c != ')').parse_next(input)?;
    match comparison_from(body) {
        Some(node) => Ok(node),
        None => {
            // Rewind so the reported offset points at the bad expression,
            // and cut so outer combinators do not mask the failure.
            input.reset(&checkpoint);
            Err(winnow::error::ErrMode::Cut(
                winnow::error::ContextError::default(),
            ))
        }
    }
}

fn comparison_from(body: &str) -> Option<FilterNode> {
    let (index, token, op) = find_operator(body)?;
    let attribute = body[..index].trim();
    if attribute.is_empty() {
        return None;
    }
    let value = &body[index + token.len()..];

    if op == CompareOp::Eq && value == "*" {
        return Some(FilterNode::Comparison {
            op: CompareOp::Present,
            attribute: attribute.to_string(),
            value: None,
        });
    }
    Some(FilterNode::Comparison {
        op,
        attribute: attribute.to_string(),
        value: Some(value.to_string()),
    })
}

/// Position and kind of the first operator occurrence in a comparison body.
fn find_operator(body: &str) -> Option<(usize, &'static str, CompareOp)> {
    for (index, _) in body.char_indices() {
        let rest = &body[index..];
        for (token, op) in OPERATORS {
            if rest.starts_with(token) {
                return Some((index, token, op));
            }
        }
    }
    None
}

/// Parse a complete filter string into a [`FilterNode`] tree.
///
/// The outermost parentheses are mandatory and the whole input must be
/// consumed; anything else fails with [`MalformedFilterError`].
pub fn parse(input: &str) -> Result<FilterNode, MalformedFilterError> {
    let text = input.trim();
    filter.parse(text).map_err(|err| {
        let offending = text
            .get(err.offset()..)
            .filter(|tail| !tail.is_empty())
            .unwrap_or(text);
        MalformedFilterError {
            offending: offending.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(op: CompareOp, attribute: &str, value: &str) -> FilterNode {
        FilterNode::Comparison {
            op,
            attribute: attribute.into(),
            value: Some(value.into()),
        }
    }

    #[test]
    fn test_simple_comparison() {
        let tree = parse("(package=foo)").unwrap();
        assert_eq!(tree, cmp(CompareOp::Eq, "package", "foo"));
    }

    #[test]
    fn test_presence() {
        let tree = parse("(package=*)").unwrap();
        assert_eq!(
            tree,
            FilterNode::Comparison {
                op: CompareOp::Present,
                attribute: "package".into(),
                value: None,
            }
        );
    }

    #[test]
    fn test_approx_and_range_operators() {
        assert_eq!(
            parse("(vendor~=Apache)").unwrap(),
            cmp(CompareOp::Approx, "vendor", "Apache")
        );
        assert_eq!(
            parse("(version>=1.0)").unwrap(),
            cmp(CompareOp::Ge, "version", "1.0")
        );
        assert_eq!(
            parse("(version<=2.0)").unwrap(),
            cmp(CompareOp::Le, "version", "2.0")
        );
    }

    #[test]
    fn test_wildcard_value_is_not_presence() {
        let tree = parse("(symbolicname=org.apache.*)").unwrap();
        assert_eq!(tree, cmp(CompareOp::Eq, "symbolicname", "org.apache.*"));
    }

    #[test]
    fn test_attribute_whitespace_trimmed() {
        let tree = parse("( version >=1.0)").unwrap();
        assert_eq!(tree, cmp(CompareOp::Ge, "version", "1.0"));
    }

    #[test]
    fn test_conjunction() {
        let tree = parse("(&(package=foo)(version>=1.0))").unwrap();
        assert_eq!(
            tree,
            FilterNode::And(vec![
                cmp(CompareOp::Eq, "package", "foo"),
                cmp(CompareOp::Ge, "version", "1.0"),
            ])
        );
    }

    #[test]
    fn test_negation() {
        let tree = parse("(!(version<=2.0))").unwrap();
        assert_eq!(
            tree,
            FilterNode::Not(Box::new(cmp(CompareOp::Le, "version", "2.0")))
        );
    }

    #[test]
    fn test_nested_disjunction_keeps_two_top_level_operands() {
        let tree = parse("(&(a=1)(|(b=2)(c=3)))").unwrap();
        let FilterNode::And(operands) = tree else {
            panic!("expected And at the root");
        };
        assert_eq!(operands.len(), 2);
        assert_eq!(operands[0], cmp(CompareOp::Eq, "a", "1"));
        assert_eq!(
            operands[1],
            FilterNode::Or(vec![
                cmp(CompareOp::Eq, "b", "2"),
                cmp(CompareOp::Eq, "c", "3"),
            ])
        );
    }

    #[test]
    fn test_missing_outer_parens_fails() {
        let err = parse("package=foo").unwrap_err();
        assert_eq!(err.offending, "package=foo");
    }

    #[test]
    fn test_empty_conjunction_fails() {
        assert!(parse("(&)").is_err());
        assert!(parse("(|)").is_err());
    }

    #[test]
    fn test_unknown_operator_fails() {
        let err = parse("(version>1.0)").unwrap_err();
        assert!(err.offending.contains("version>1.0"));
    }

    #[test]
    fn test_empty_attribute_fails() {
        assert!(parse("(=foo)").is_err());
    }

    #[test]
    fn test_unbalanced_parens_fail() {
        assert!(parse("(&(a=1)(b=2)").is_err());
        assert!(parse("(a=1))").is_err());
    }

    #[test]
    fn test_trailing_text_fails() {
        assert!(parse("(a=1)garbage").is_err());
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }
}
