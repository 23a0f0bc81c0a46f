//! Declarative filter-tree parsing.
//!
//! The host hands the filter over as an untyped document: a sequence of
//! single-key mappings where each key is either an attribute name or an
//! `AND`/`OR` combinator holding a nested sequence. Parsing resolves every
//! shorthand and operator arity once, up front, so the rest of the plugin
//! works on a plain tagged tree.
//!
//! Accepted predicate shorthands:
//!
//! ```yaml
//! - Location: datacenter                 # bare scalar, eq with inferred type
//! - Level: [Manager, Director]           # sequence of scalars, is_in
//! - Location: {S: datacenter}            # typed value, eq
//! - GradePercentage:                     # explicit form
//!     comparison_operator: lt
//!     value: 20
//! ```

use serde_json::Value;

use crate::attribute_value::AttributeValue;
use crate::error::InputError;

/// Boolean combinator for a condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// All children must match.
    And,
    /// At least one child must match.
    Or,
}

impl Combinator {
    /// Recognize a combinator key, case-insensitively.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }

    /// The keyword used in a DynamoDB condition expression.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Per-attribute comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonOperator {
    /// Equality (the default when no operator is given).
    #[default]
    Eq,
    /// Inequality.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Inclusive range test; requires exactly two values.
    Between,
    /// String prefix test.
    BeginsWith,
    /// String or set containment test.
    Contains,
    /// Membership test; requires a sequence of values.
    IsIn,
}

impl ComparisonOperator {
    /// Parse the operator string from the parameter document.
    pub fn parse(s: &str) -> Result<Self, InputError> {
        match s {
            "eq" => Ok(Self::Eq),
            "ne" => Ok(Self::Ne),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "between" => Ok(Self::Between),
            "begins_with" => Ok(Self::BeginsWith),
            "contains" => Ok(Self::Contains),
            "is_in" => Ok(Self::IsIn),
            other => Err(InputError::UnknownOperator(other.to_owned())),
        }
    }

    /// The operator name as written in the parameter document.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Between => "between",
            Self::BeginsWith => "begins_with",
            Self::Contains => "contains",
            Self::IsIn => "is_in",
        }
    }
}

/// A node in the parsed filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// One attribute comparison.
    Predicate(Predicate),
    /// A nested boolean group.
    Group(ConditionGroup),
}

/// An ordered boolean combination of predicates and nested groups.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGroup {
    /// How the children are combined.
    pub combinator: Combinator,
    /// Children in encounter order.
    pub children: Vec<FilterNode>,
}

/// One attribute comparison with its operand values resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Document path of the attribute (may contain `.` and `[idx]`).
    pub path: String,
    /// Comparison operator.
    pub op: ComparisonOperator,
    /// Operand values; arity is validated at construction.
    pub values: Vec<AttributeValue>,
}

impl Predicate {
    /// Build a predicate, enforcing the operator's value arity.
    pub fn new(
        path: impl Into<String>,
        op: ComparisonOperator,
        values: Vec<AttributeValue>,
    ) -> Result<Self, InputError> {
        let path = path.into();
        let arity_error = |expected: &'static str| InputError::OperatorArity {
            attr: path.clone(),
            op: op.as_str(),
            expected,
        };

        match op {
            ComparisonOperator::Between => {
                if values.len() != 2 {
                    return Err(arity_error("exactly two values (low and high bounds)"));
                }
            }
            ComparisonOperator::IsIn => {
                if values.is_empty() {
                    return Err(arity_error("a non-empty sequence of values"));
                }
            }
            _ => {
                if values.len() != 1 {
                    return Err(arity_error("exactly one value"));
                }
            }
        }

        Ok(Self { path, op, values })
    }
}

/// Parse the raw `filter_expression` document into a condition tree.
///
/// The top level is either a plain sequence (an implicit `AND` group) or a
/// single-key `AND`/`OR` mapping. A single-key mapping naming an attribute
/// is accepted as a one-entry implicit `AND` group.
pub fn parse_filter_tree(input: &Value) -> Result<ConditionGroup, InputError> {
    match input {
        Value::Array(entries) => parse_group(Combinator::And, entries),
        Value::Object(map) => {
            let mut children = Vec::with_capacity(map.len());
            for (key, value) in map {
                children.push(parse_entry(key, value)?);
            }
            if let [FilterNode::Group(group)] = children.as_slice() {
                // A lone top-level AND/OR mapping is itself the root group.
                return Ok(group.clone());
            }
            Ok(ConditionGroup {
                combinator: Combinator::And,
                children,
            })
        }
        other => Err(InputError::InvalidFilterShape(format!(
            "expected a sequence or mapping, got {other}"
        ))),
    }
}

fn parse_group(combinator: Combinator, entries: &[Value]) -> Result<ConditionGroup, InputError> {
    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(map) = entry else {
            return Err(InputError::InvalidFilterShape(format!(
                "each filter entry must be a mapping, got {entry}"
            )));
        };
        for (key, value) in map {
            children.push(parse_entry(key, value)?);
        }
    }
    Ok(ConditionGroup {
        combinator,
        children,
    })
}

fn parse_entry(key: &str, value: &Value) -> Result<FilterNode, InputError> {
    if let Some(combinator) = Combinator::from_key(key) {
        let Value::Array(entries) = value else {
            return Err(InputError::InvalidFilterShape(format!(
                "{key} group must hold a sequence of entries"
            )));
        };
        return Ok(FilterNode::Group(parse_group(combinator, entries)?));
    }
    parse_predicate(key, value).map(FilterNode::Predicate)
}

fn parse_predicate(attr: &str, value: &Value) -> Result<Predicate, InputError> {
    match value {
        // Bare scalar: eq with inferred type.
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => Predicate::new(
            attr,
            ComparisonOperator::Eq,
            vec![AttributeValue::infer(attr, value)?],
        ),
        // Sequence of scalars: membership test.
        Value::Array(items) => {
            let values = items
                .iter()
                .map(|item| AttributeValue::infer(attr, item))
                .collect::<Result<Vec<_>, _>>()?;
            Predicate::new(attr, ComparisonOperator::IsIn, values)
        }
        Value::Object(map) => {
            if map.contains_key("comparison_operator") || map.contains_key("value") {
                return parse_explicit_predicate(attr, map);
            }
            // A lone type-tagged mapping is an explicit typed value.
            if map.len() == 1 {
                return Predicate::new(
                    attr,
                    ComparisonOperator::Eq,
                    vec![AttributeValue::infer(attr, value)?],
                );
            }
            Err(InputError::AmbiguousValue(attr.to_owned()))
        }
    }
}

fn parse_explicit_predicate(
    attr: &str,
    map: &serde_json::Map<String, Value>,
) -> Result<Predicate, InputError> {
    let op = match map.get("comparison_operator") {
        None => ComparisonOperator::default(),
        Some(Value::String(s)) => ComparisonOperator::parse(s)?,
        Some(other) => return Err(InputError::UnknownOperator(other.to_string())),
    };

    let Some(value) = map.get("value") else {
        return Err(InputError::MissingValue(attr.to_owned()));
    };

    let values = match op {
        ComparisonOperator::Between | ComparisonOperator::IsIn => {
            let Value::Array(items) = value else {
                return Err(InputError::OperatorArity {
                    attr: attr.to_owned(),
                    op: op.as_str(),
                    expected: "a sequence of values",
                });
            };
            items
                .iter()
                .map(|item| AttributeValue::infer(attr, item))
                .collect::<Result<Vec<_>, _>>()?
        }
        _ => vec![AttributeValue::infer(attr, value)?],
    };

    Predicate::new(attr, op, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_should_default_bare_scalar_to_eq() {
        let tree = parse_filter_tree(&json!([{"Location": "datacenter"}])).unwrap();
        assert_eq!(tree.combinator, Combinator::And);
        assert_eq!(
            tree.children,
            vec![FilterNode::Predicate(Predicate {
                path: "Location".to_owned(),
                op: ComparisonOperator::Eq,
                values: vec![AttributeValue::S("datacenter".to_owned())],
            })]
        );
    }

    #[test]
    fn test_should_match_explicit_form_for_bare_scalar() {
        let bare = parse_filter_tree(&json!([{"Location": "datacenter"}])).unwrap();
        let explicit = parse_filter_tree(&json!([
            {"Location": {"comparison_operator": "eq", "value": {"S": "datacenter"}}}
        ]))
        .unwrap();
        assert_eq!(bare, explicit);
    }

    #[test]
    fn test_should_parse_sequence_as_membership_test() {
        let tree = parse_filter_tree(&json!([{"Level": ["Manager", "Director"]}])).unwrap();
        let FilterNode::Predicate(pred) = &tree.children[0] else {
            panic!("expected predicate");
        };
        assert_eq!(pred.op, ComparisonOperator::IsIn);
        assert_eq!(pred.values.len(), 2);
    }

    #[test]
    fn test_should_parse_nested_groups() {
        let tree = parse_filter_tree(&json!([
            {"OR": [
                {"ProjectGroup": {"comparison_operator": "is_in", "value": ["Phoenix", "Pegasus"]}},
                {"Location": "Houston"},
            ]},
            {"AND": [
                {"OR": [
                    {"LaunchGroup": "green"},
                    {"Level": ["Manager", "Director"]},
                ]},
            ]},
        ]))
        .unwrap();
        assert_eq!(tree.combinator, Combinator::And);
        assert_eq!(tree.children.len(), 2);
        let FilterNode::Group(or_group) = &tree.children[0] else {
            panic!("expected group");
        };
        assert_eq!(or_group.combinator, Combinator::Or);
        assert_eq!(or_group.children.len(), 2);
    }

    #[test]
    fn test_should_accept_top_level_or_mapping() {
        let tree = parse_filter_tree(&json!({"OR": [
            {"GradePercentage": {"comparison_operator": "lt", "value": 20}},
            {"GradePercentage": {"comparison_operator": "gt", "value": 80}},
        ]}))
        .unwrap();
        assert_eq!(tree.combinator, Combinator::Or);
        assert_eq!(tree.children.len(), 2);
    }

    #[test]
    fn test_should_accept_lowercase_combinator_keys() {
        let tree = parse_filter_tree(&json!([{"or": [{"A": "x"}, {"B": "y"}]}])).unwrap();
        let FilterNode::Group(group) = &tree.children[0] else {
            panic!("expected group");
        };
        assert_eq!(group.combinator, Combinator::Or);
    }

    #[test]
    fn test_should_reject_unknown_operator() {
        let err = parse_filter_tree(&json!([
            {"Location": {"comparison_operator": "like", "value": "dc"}}
        ]))
        .unwrap_err();
        assert!(matches!(err, InputError::UnknownOperator(ref op) if op == "like"));
    }

    #[test]
    fn test_should_reject_between_with_wrong_arity() {
        let err = parse_filter_tree(&json!([
            {"Grade": {"comparison_operator": "between", "value": [1, 2, 3]}}
        ]))
        .unwrap_err();
        assert!(matches!(err, InputError::OperatorArity { ref op, .. } if *op == "between"));
    }

    #[test]
    fn test_should_reject_is_in_with_non_sequence_value() {
        let err = parse_filter_tree(&json!([
            {"Level": {"comparison_operator": "is_in", "value": "Manager"}}
        ]))
        .unwrap_err();
        assert!(matches!(err, InputError::OperatorArity { ref op, .. } if *op == "is_in"));
    }

    #[test]
    fn test_should_reject_untagged_mapping_value() {
        let err = parse_filter_tree(&json!([
            {"Location": {"city": "Houston", "state": "TX"}}
        ]))
        .unwrap_err();
        assert!(matches!(err, InputError::AmbiguousValue(ref attr) if attr == "Location"));
    }

    #[test]
    fn test_should_reject_missing_value_in_explicit_form() {
        let err = parse_filter_tree(&json!([
            {"Location": {"comparison_operator": "eq"}}
        ]))
        .unwrap_err();
        assert!(matches!(err, InputError::MissingValue(ref attr) if attr == "Location"));
    }

    #[test]
    fn test_should_preserve_entry_order_in_multi_key_mapping() {
        // Keys deliberately out of alphabetical order.
        let tree = parse_filter_tree(&json!([{"Rack": "r12", "Location": "datacenter"}])).unwrap();
        let paths: Vec<&str> = tree
            .children
            .iter()
            .map(|child| {
                let FilterNode::Predicate(pred) = child else {
                    panic!("expected predicate");
                };
                pred.path.as_str()
            })
            .collect();
        assert_eq!(paths, vec!["Rack", "Location"]);
    }

    #[test]
    fn test_should_parse_empty_filter_as_empty_group() {
        let tree = parse_filter_tree(&json!([])).unwrap();
        assert!(tree.children.is_empty());
    }
}
