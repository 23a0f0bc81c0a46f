//! Input validation errors.
//!
//! Every variant here is raised while parsing the invocation parameters,
//! before any request is sent to DynamoDB. Messages name the offending field.

/// Invalid invocation parameters.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// `table_name` was absent or empty.
    #[error("table_name is required and must be a non-empty string")]
    MissingTableName,

    /// `limit` was zero.
    #[error("limit must be a positive integer")]
    InvalidLimit,

    /// A `comparison_operator` string did not name a known operator.
    #[error("\"{0}\" is not a valid comparison_operator")]
    UnknownOperator(String),

    /// An operator was given the wrong number or shape of operand values.
    #[error("comparison_operator \"{op}\" for attribute \"{attr}\" requires {expected}")]
    OperatorArity {
        /// Attribute the predicate applies to.
        attr: String,
        /// Operator name as given in the input.
        op: &'static str,
        /// Human-readable arity requirement.
        expected: &'static str,
    },

    /// A predicate value was a mapping without a recognized type tag.
    #[error("value for attribute \"{0}\" is a mapping without a recognized DynamoDB type tag")]
    AmbiguousValue(String),

    /// The filter tree did not have the expected declarative shape.
    #[error("malformed filter_expression: {0}")]
    InvalidFilterShape(String),

    /// An explicit predicate mapping had no `value` key.
    #[error("predicate for attribute \"{0}\" is missing a value")]
    MissingValue(String),

    /// `select` conflicts with `projection_expression`.
    #[error("select {0} cannot be combined with projection_expression")]
    SelectConflict(&'static str),
}
