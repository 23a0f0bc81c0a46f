//! The scan-page seam and its AWS SDK implementation.
//!
//! The driver only needs one operation: fetch a single page of scan results
//! for a fixed request, starting at an optional continuation key. Putting
//! that behind a trait keeps the pagination and limit logic testable with an
//! in-memory fake.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue as SdkAttributeValue;
use dynafacts_model::{AttributeValue, Select};
use tracing::debug;

use crate::error::{ScanError, ScanResult};
use crate::expression::CompiledExpression;

/// One returned item, keyed by attribute name.
pub type Item = HashMap<String, AttributeValue>;

/// The fixed portion of a scan request, identical for every page.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Table to scan.
    pub table_name: String,
    /// Optional secondary index.
    pub index_name: Option<String>,
    /// Joined projection expression, if any.
    pub projection_expression: Option<String>,
    /// Compiled filter, if any.
    pub filter: Option<CompiledExpression>,
    /// Attribute selection mode.
    pub select: Option<Select>,
}

/// One page of scan results.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    /// Items on this page (empty in `COUNT` mode).
    pub items: Vec<Item>,
    /// Matching items on this page as counted by the service.
    pub count: usize,
    /// Continuation key; `None` means the scan is exhausted.
    pub last_evaluated_key: Option<Item>,
}

/// Fetches one page of scan results.
#[async_trait]
pub trait TableScanner {
    /// Fetch the page starting at `start_key`, optionally capping the number
    /// of items the service evaluates for this page.
    async fn scan_page(
        &self,
        request: &ScanRequest,
        start_key: Option<Item>,
        page_limit: Option<i32>,
    ) -> ScanResult<ScanPage>;
}

/// [`TableScanner`] backed by the AWS SDK DynamoDB client.
#[derive(Debug, Clone)]
pub struct SdkScanner {
    client: aws_sdk_dynamodb::Client,
}

impl SdkScanner {
    /// Wrap a configured SDK client.
    #[must_use]
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableScanner for SdkScanner {
    async fn scan_page(
        &self,
        request: &ScanRequest,
        start_key: Option<Item>,
        page_limit: Option<i32>,
    ) -> ScanResult<ScanPage> {
        let mut op = self
            .client
            .scan()
            .table_name(&request.table_name)
            .set_index_name(request.index_name.clone())
            .set_projection_expression(request.projection_expression.clone())
            .set_limit(page_limit)
            .set_exclusive_start_key(start_key.map(item_to_sdk));

        if let Some(filter) = &request.filter {
            op = op
                .filter_expression(&filter.expression)
                .set_expression_attribute_names(Some(filter.attribute_names.clone()))
                .set_expression_attribute_values(Some(
                    filter
                        .attribute_values
                        .iter()
                        .map(|(placeholder, value)| (placeholder.clone(), to_sdk(value.clone())))
                        .collect(),
                ));
        }
        if let Some(select) = request.select {
            op = op.select(select.as_str().into());
        }

        let resp = op
            .send()
            .await
            .map_err(|e| ScanError::Service(DisplayErrorContext(&e).to_string()))?;

        debug!(
            table = %request.table_name,
            count = resp.count,
            has_more = resp.last_evaluated_key.is_some(),
            "fetched scan page"
        );

        let items = resp
            .items
            .unwrap_or_default()
            .into_iter()
            .map(item_from_sdk)
            .collect::<ScanResult<Vec<_>>>()?;
        let count = usize::try_from(resp.count).unwrap_or_default();
        let last_evaluated_key = resp.last_evaluated_key.map(item_from_sdk).transpose()?;

        Ok(ScanPage {
            items,
            count,
            last_evaluated_key,
        })
    }
}

/// Convert an item into the SDK's attribute-value map.
#[must_use]
pub fn item_to_sdk(item: Item) -> HashMap<String, SdkAttributeValue> {
    item.into_iter().map(|(k, v)| (k, to_sdk(v))).collect()
}

/// Convert the SDK's attribute-value map into an item.
pub fn item_from_sdk(item: HashMap<String, SdkAttributeValue>) -> ScanResult<Item> {
    item.into_iter()
        .map(|(k, v)| Ok((k, from_sdk(v)?)))
        .collect()
}

fn to_sdk(value: AttributeValue) -> SdkAttributeValue {
    match value {
        AttributeValue::S(s) => SdkAttributeValue::S(s),
        AttributeValue::N(n) => SdkAttributeValue::N(n),
        AttributeValue::B(b) => SdkAttributeValue::B(Blob::new(b.to_vec())),
        AttributeValue::Ss(v) => SdkAttributeValue::Ss(v),
        AttributeValue::Ns(v) => SdkAttributeValue::Ns(v),
        AttributeValue::Bs(v) => {
            SdkAttributeValue::Bs(v.into_iter().map(|b| Blob::new(b.to_vec())).collect())
        }
        AttributeValue::Bool(b) => SdkAttributeValue::Bool(b),
        AttributeValue::Null(b) => SdkAttributeValue::Null(b),
        AttributeValue::L(l) => SdkAttributeValue::L(l.into_iter().map(to_sdk).collect()),
        AttributeValue::M(m) => {
            SdkAttributeValue::M(m.into_iter().map(|(k, v)| (k, to_sdk(v))).collect())
        }
    }
}

fn from_sdk(value: SdkAttributeValue) -> ScanResult<AttributeValue> {
    Ok(match value {
        SdkAttributeValue::S(s) => AttributeValue::S(s),
        SdkAttributeValue::N(n) => AttributeValue::N(n),
        SdkAttributeValue::B(b) => AttributeValue::B(bytes::Bytes::from(b.into_inner())),
        SdkAttributeValue::Ss(v) => AttributeValue::Ss(v),
        SdkAttributeValue::Ns(v) => AttributeValue::Ns(v),
        SdkAttributeValue::Bs(v) => AttributeValue::Bs(
            v.into_iter()
                .map(|b| bytes::Bytes::from(b.into_inner()))
                .collect(),
        ),
        SdkAttributeValue::Bool(b) => AttributeValue::Bool(b),
        SdkAttributeValue::Null(b) => AttributeValue::Null(b),
        SdkAttributeValue::L(l) => {
            AttributeValue::L(l.into_iter().map(from_sdk).collect::<ScanResult<Vec<_>>>()?)
        }
        SdkAttributeValue::M(m) => AttributeValue::M(
            m.into_iter()
                .map(|(k, v)| Ok((k, from_sdk(v)?)))
                .collect::<ScanResult<HashMap<_, _>>>()?,
        ),
        other => {
            return Err(ScanError::Service(format!(
                "unsupported attribute value in scan response: {other:?}"
            )));
        }
    })
}
