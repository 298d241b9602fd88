//! Evaluator for metadata filter expressions.

use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

use super::ast::{FilterExpression, FilterOp, PathSegment};
use super::parser::parse_filter_expressions;

/// Walk `segments` down from `value`. Any missing step yields `None`.
pub fn resolve_path<'a>(value: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value);
    };

    let next = match (head, value) {
        (PathSegment::Key(key), Value::Object(map)) => map.get(key),
        (PathSegment::Key(key), Value::Array(items)) => {
            key.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        (PathSegment::Index(i), Value::Array(items)) => items.get(*i),
        (PathSegment::Index(i), Value::Object(map)) => map.get(&i.to_string()),
        _ => None,
    }?;

    resolve_path(next, rest)
}

/// String form of a scalar for comparison against a literal.
fn scalar_string(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Evaluate a single expression against a JSON record.
pub fn evaluate_expression(expr: &FilterExpression, record: &Value) -> bool {
    let Some(actual) = resolve_path(record, expr.path.segments()).and_then(scalar_string) else {
        return false;
    };
    match expr.op {
        FilterOp::Eq => actual == expr.value,
    }
}

/// Conjunction of filter expressions applicable to any metadata record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPredicate {
    expressions: Vec<FilterExpression>,
}

impl FilterPredicate {
    /// Parse a filter string; malformed clauses are dropped.
    pub fn parse(filters: &str) -> Self {
        filter_predicate(parse_filter_expressions(filters))
    }

    pub fn expressions(&self) -> &[FilterExpression] {
        &self.expressions
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn matches_value(&self, record: &Value) -> bool {
        self.expressions
            .iter()
            .all(|expr| evaluate_expression(expr, record))
    }

    /// Match a typed record through its serialized JSON form.
    pub fn matches<T: Serialize>(&self, record: &T) -> bool {
        if self.is_empty() {
            return true;
        }
        match serde_json::to_value(record) {
            Ok(value) => self.matches_value(&value),
            Err(e) => {
                tracing::warn!("Filter: Could not serialize record for matching: {}", e);
                false
            }
        }
    }

    /// Keep the matching records, in order.
    pub fn retain<T: Serialize>(&self, records: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Build a predicate that is true iff every expression matches.
pub fn filter_predicate(expressions: Vec<FilterExpression>) -> FilterPredicate {
    FilterPredicate { expressions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Network, Station};
    use serde_json::json;

    fn station(province: &str) -> Station {
        serde_json::from_value(json!({
            "id": 1,
            "native_id": "1010066",
            "network_uri": "https://pdp.example/networks/1",
            "histories": [{"id": 10, "lat": 49.0, "lon": -123.0, "province": province}]
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_nested() {
        let value = json!({"a": [{"b": 1}, {"b": 2}]});
        let path = crate::dsl::PropertyPath::parse("a[1].b").unwrap();
        assert_eq!(resolve_path(&value, path.segments()), Some(&json!(2)));
        let dotted = crate::dsl::PropertyPath::parse("a.0.b").unwrap();
        assert_eq!(resolve_path(&value, dotted.segments()), Some(&json!(1)));
    }

    #[test]
    fn test_missing_paths_resolve_to_none() {
        let value = json!({"a": [{"b": 1}]});
        for raw in ["x", "a[5].b", "a[0].c", "a[0].b.c", "a.x"] {
            let path = crate::dsl::PropertyPath::parse(raw).unwrap();
            assert_eq!(resolve_path(&value, path.segments()), None, "{raw}");
        }
    }

    #[test]
    fn test_station_province() {
        let predicate = FilterPredicate::parse("histories[0].province=BC");
        assert!(predicate.matches(&station("BC")));
        assert!(!predicate.matches(&station("AB")));
    }

    #[test]
    fn test_empty_predicate_matches_everything() {
        let predicate = filter_predicate(vec![]);
        assert!(predicate.matches(&station("AB")));
        assert!(predicate.matches_value(&Value::Null));
    }

    #[test]
    fn test_all_expressions_must_match() {
        let predicate = FilterPredicate::parse("native_id=1010066;histories[0].province=BC");
        assert!(predicate.matches(&station("BC")));
        let predicate = FilterPredicate::parse("native_id=nope;histories[0].province=BC");
        assert!(!predicate.matches(&station("BC")));
    }

    #[test]
    fn test_scalars_compare_by_string_form() {
        let network = Network {
            uri: "https://pdp.example/networks/1".into(),
            name: "EC".into(),
            long_name: "Environment Canada".into(),
            color: None,
            publish: true,
        };
        assert!(FilterPredicate::parse("publish=true").matches(&network));
        assert!(!FilterPredicate::parse("publish=false").matches(&network));
        // null never equals anything, not even an empty literal
        assert!(!FilterPredicate::parse("color=").matches(&network));
        assert!(FilterPredicate::parse("id=1").matches_value(&json!({"id": 1})));
    }

    #[test]
    fn test_containers_never_match() {
        let predicate = FilterPredicate::parse("histories=[]");
        assert!(!predicate.matches_value(&json!({"histories": []})));
    }

    #[test]
    fn test_retain_preserves_order() {
        let predicate = FilterPredicate::parse("histories[0].province=BC");
        let kept = predicate.retain(vec![station("BC"), station("AB"), station("BC")]);
        assert_eq!(kept.len(), 2);
    }
}
