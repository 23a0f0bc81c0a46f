//! Model types for the dynafacts DynamoDB scan plugin.
//!
//! This crate holds everything that is parsed out of the host's invocation
//! parameters before any network call is made: the typed `AttributeValue`
//! wire form, the declarative filter tree, and the flat parameter set.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod error;
pub mod filter;
pub mod params;

pub use attribute_value::AttributeValue;
pub use error::InputError;
pub use filter::{Combinator, ComparisonOperator, ConditionGroup, FilterNode, Predicate};
pub use params::{ProjectionInput, ScanTableParams, Select};
