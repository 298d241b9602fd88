//! Parser for metadata filter strings.
//!
//! filters = clause (";" clause)*
//! clause  = path "=" value
//!
//! `path` is everything before the first `=`, `value` the rest of the clause.
//! Parsing never fails: malformed clauses are logged and dropped.

use super::ast::{FilterExpression, FilterOp, PropertyPath};

/// Parse one clause, or `None` when it is blank or malformed.
fn parse_clause(clause: &str) -> Option<FilterExpression> {
    let clause = clause.trim();
    if clause.is_empty() {
        return None;
    }

    let Some((path, value)) = clause.split_once('=') else {
        tracing::warn!("Filter: Ignoring clause '{}': expected <path>=<value>", clause);
        return None;
    };

    let path = path.trim();
    if path.is_empty() {
        tracing::warn!("Filter: Ignoring clause '{}': empty path", clause);
        return None;
    }

    match PropertyPath::parse(path) {
        Ok(path) => Some(FilterExpression {
            path,
            op: FilterOp::Eq,
            value: value.trim().to_string(),
        }),
        Err(e) => {
            tracing::warn!("Filter: Ignoring clause '{}': {}", clause, e);
            None
        }
    }
}

/// Parse a `path=value;path=value` string into expressions.
pub fn parse_filter_expressions(input: &str) -> Vec<FilterExpression> {
    input.split(';').filter_map(parse_clause).collect()
}
