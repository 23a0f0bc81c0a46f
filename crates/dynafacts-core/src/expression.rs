//! Filter-tree to condition-expression compiler.
//!
//! Lowers a parsed [`ConditionGroup`] into the three request fields DynamoDB
//! expects: a `FilterExpression` string plus the `ExpressionAttributeNames`
//! and `ExpressionAttributeValues` placeholder maps. Attribute names are
//! always routed through `#nK` placeholders (so reserved words never leak
//! into the expression) and operand values through `:vK` placeholders.
//!
//! The walk is depth-first, left-to-right. A group with a single child
//! degenerates to that child's condition; an empty group contributes nothing
//! to its parent; a compound child group is parenthesized where it is joined
//! into its parent, preserving the input's logical structure.

use std::collections::HashMap;
use std::fmt::Write as _;

use dynafacts_model::{
    AttributeValue, ComparisonOperator, ConditionGroup, FilterNode, Predicate,
};

/// A compiled filter, ready to attach to a scan request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledExpression {
    /// The `FilterExpression` string with placeholders.
    pub expression: String,
    /// `ExpressionAttributeNames`: placeholder to attribute name.
    pub attribute_names: HashMap<String, String>,
    /// `ExpressionAttributeValues`: placeholder to typed value.
    pub attribute_values: HashMap<String, AttributeValue>,
}

/// Compile a filter tree. Returns `None` when the tree holds no predicates,
/// in which case the scan goes out unfiltered.
#[must_use]
pub fn compile_filter(root: &ConditionGroup) -> Option<CompiledExpression> {
    let mut builder = ExpressionBuilder::default();
    let fragment = builder.group(root)?;
    Some(CompiledExpression {
        expression: fragment.text,
        attribute_names: builder
            .name_placeholders
            .into_iter()
            .map(|(name, placeholder)| (placeholder, name))
            .collect(),
        attribute_values: builder.values,
    })
}

/// A compiled sub-expression; `compound` marks multi-part fragments that
/// need parentheses when joined into a parent group.
struct Fragment {
    text: String,
    compound: bool,
}

#[derive(Default)]
struct ExpressionBuilder {
    // attribute name -> "#nK", deduplicated across the whole expression
    name_placeholders: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl ExpressionBuilder {
    fn group(&mut self, group: &ConditionGroup) -> Option<Fragment> {
        let mut parts: Vec<Fragment> = Vec::new();
        for child in &group.children {
            match child {
                FilterNode::Predicate(pred) => parts.push(Fragment {
                    text: self.predicate(pred),
                    compound: false,
                }),
                FilterNode::Group(nested) => {
                    if let Some(fragment) = self.group(nested) {
                        parts.push(fragment);
                    }
                }
            }
        }

        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => {
                let separator = format!(" {} ", group.combinator.as_str());
                let text = parts
                    .iter()
                    .map(|part| {
                        if part.compound {
                            format!("({})", part.text)
                        } else {
                            part.text.clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(&separator);
                Some(Fragment {
                    text,
                    compound: true,
                })
            }
        }
    }

    fn predicate(&mut self, pred: &Predicate) -> String {
        let path = self.path_placeholder(&pred.path);
        // Operand arity was enforced when the predicate was parsed.
        match pred.op {
            ComparisonOperator::Eq => format!("{path} = {}", self.value(&pred.values[0])),
            ComparisonOperator::Ne => format!("{path} <> {}", self.value(&pred.values[0])),
            ComparisonOperator::Lt => format!("{path} < {}", self.value(&pred.values[0])),
            ComparisonOperator::Lte => format!("{path} <= {}", self.value(&pred.values[0])),
            ComparisonOperator::Gt => format!("{path} > {}", self.value(&pred.values[0])),
            ComparisonOperator::Gte => format!("{path} >= {}", self.value(&pred.values[0])),
            ComparisonOperator::Between => format!(
                "{path} BETWEEN {} AND {}",
                self.value(&pred.values[0]),
                self.value(&pred.values[1])
            ),
            ComparisonOperator::BeginsWith => {
                format!("begins_with({path}, {})", self.value(&pred.values[0]))
            }
            ComparisonOperator::Contains => {
                format!("contains({path}, {})", self.value(&pred.values[0]))
            }
            ComparisonOperator::IsIn => {
                let list = pred
                    .values
                    .iter()
                    .map(|v| self.value(v))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{path} IN ({list})")
            }
        }
    }

    /// Rewrite a document path with name placeholders, keeping dots and
    /// list indexes in place: `info.tags[0]` becomes `#n0.#n1[0]`.
    fn path_placeholder(&mut self, path: &str) -> String {
        let mut out = String::new();
        for (i, segment) in path.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            let mut pieces = segment.split('[');
            let name = pieces.next().unwrap_or(segment);
            out.push_str(&self.name_placeholder(name));
            for index in pieces {
                // `index` still carries its closing bracket from the split.
                let _ = write!(out, "[{index}");
            }
        }
        out
    }

    fn name_placeholder(&mut self, name: &str) -> String {
        if let Some(placeholder) = self.name_placeholders.get(name) {
            return placeholder.clone();
        }
        let placeholder = format!("#n{}", self.name_placeholders.len());
        self.name_placeholders
            .insert(name.to_owned(), placeholder.clone());
        placeholder
    }

    fn value(&mut self, value: &AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value.clone());
        placeholder
    }
}
