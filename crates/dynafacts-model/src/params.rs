//! Invocation parameter set for a table scan.
//!
//! The host hands over one flat JSON document. All fields except
//! `table_name` are optional; unknown fields are ignored so the host can
//! carry extra context keys alongside the scan arguments.

use serde::Deserialize;
use serde_json::Value;

use crate::error::InputError;
use crate::filter::{self, ConditionGroup};

/// Which attributes the scan returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Select {
    /// All attributes of the item.
    #[default]
    #[serde(rename = "ALL_ATTRIBUTES")]
    AllAttributes,
    /// All projected attributes (for index scans).
    #[serde(rename = "ALL_PROJECTED_ATTRIBUTES")]
    AllProjectedAttributes,
    /// Only the attributes named in the projection.
    #[serde(rename = "SPECIFIC_ATTRIBUTES")]
    SpecificAttributes,
    /// Only the count of matching items (no item data).
    #[serde(rename = "COUNT")]
    Count,
}

impl Select {
    /// Returns the DynamoDB wire-format string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllAttributes => "ALL_ATTRIBUTES",
            Self::AllProjectedAttributes => "ALL_PROJECTED_ATTRIBUTES",
            Self::SpecificAttributes => "SPECIFIC_ATTRIBUTES",
            Self::Count => "COUNT",
        }
    }
}

/// Projection input, accepted either as a comma-separated string or as an
/// explicit sequence of attribute paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProjectionInput {
    /// `"PrivateIpAddress, SerialNumber"`
    CommaSeparated(String),
    /// `["PrivateIpAddress", "SerialNumber"]`
    Sequence(Vec<String>),
}

/// The full parameter set for one scan invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanTableParams {
    /// Name of the table to scan. Required.
    #[serde(default)]
    pub table_name: String,

    /// Optional secondary index to scan instead of the base table.
    #[serde(default)]
    pub index_name: Option<String>,

    /// Attributes to retrieve; absent means the full item.
    #[serde(default)]
    pub projection_expression: Option<ProjectionInput>,

    /// Declarative filter tree; absent means an unfiltered scan.
    #[serde(default)]
    pub filter_expression: Option<Value>,

    /// Maximum number of records to return; absent means unbounded.
    #[serde(default)]
    pub limit: Option<usize>,

    /// Which attributes the scan returns.
    #[serde(default)]
    pub select: Option<Select>,

    /// Strip DynamoDB type tags from the returned records.
    #[serde(default)]
    pub simplify: bool,
}

impl ScanTableParams {
    /// Validate the parameter set before any network call.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.table_name.trim().is_empty() {
            return Err(InputError::MissingTableName);
        }
        if self.limit == Some(0) {
            return Err(InputError::InvalidLimit);
        }
        if let (Some(select), Some(_)) = (self.select, &self.projection_expression) {
            if select != Select::SpecificAttributes {
                return Err(InputError::SelectConflict(select.as_str()));
            }
        }
        Ok(())
    }

    /// Normalize the projection into an attribute-path list.
    ///
    /// The comma-separated string form is split and trimmed; empty segments
    /// are dropped. Returns `None` when no attributes remain, meaning the
    /// scan carries no projection restriction.
    #[must_use]
    pub fn projection_attributes(&self) -> Option<Vec<String>> {
        let attributes: Vec<String> = match self.projection_expression.as_ref()? {
            ProjectionInput::CommaSeparated(s) => s
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
            ProjectionInput::Sequence(paths) => paths
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        };
        if attributes.is_empty() {
            None
        } else {
            Some(attributes)
        }
    }

    /// Parse the declarative filter tree, if one was given.
    pub fn filter_tree(&self) -> Result<Option<ConditionGroup>, InputError> {
        self.filter_expression
            .as_ref()
            .map(filter::parse_filter_tree)
            .transpose()
    }
}
