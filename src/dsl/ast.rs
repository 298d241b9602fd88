//! AST types for metadata filter expressions.

use std::fmt;

use super::lexer::tokenize_path;

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object member: `province` in `histories[0].province`
    Key(String),
    /// Array element: `[0]`
    Index(usize),
}

/// A dot/bracket property path such as `histories[0].province`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let segments = tokenize_path(raw)?;
        Ok(PropertyPath {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Comparison operator. Only equality exists in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq, // =
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Eq => write!(f, "="),
        }
    }
}

/// One `path=value` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    pub path: PropertyPath,
    pub op: FilterOp,
    pub value: String,
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.path, self.op, self.value)
    }
}
