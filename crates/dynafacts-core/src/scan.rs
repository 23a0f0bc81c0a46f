//! The scan driver.
//!
//! Validates and normalizes the invocation parameters, compiles the filter
//! tree, then walks the table page by page following `LastEvaluatedKey`
//! until the scan is exhausted or the record limit is reached. Records are
//! returned in DynamoDB's typed-value form unless `simplify` is set.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use dynafacts_model::{ScanTableParams, Select};

use crate::client::{Item, ScanRequest, TableScanner};
use crate::error::{ScanError, ScanResult};
use crate::expression::compile_filter;

/// The facts returned to the host.
#[derive(Debug, Clone, Serialize)]
pub struct TableFacts {
    /// Matching records, in the order the service returned them.
    pub records: Vec<Value>,
    /// Number of records (or the matched count in `COUNT` mode).
    pub count: usize,
}

/// Run one scan invocation against `scanner`.
///
/// Fails fast on invalid input before any page is requested. Service errors
/// are surfaced verbatim; nothing is retried and no partial result is
/// returned on error.
pub async fn scan_table<S: TableScanner + Sync>(
    scanner: &S,
    params: &ScanTableParams,
) -> ScanResult<TableFacts> {
    params.validate()?;

    let projection = params.projection_attributes().map(|attrs| attrs.join(", "));
    let filter = match params.filter_tree()? {
        Some(tree) => compile_filter(&tree),
        None => None,
    };
    if let Some(compiled) = &filter {
        debug!(expression = %compiled.expression, "compiled filter expression");
    }

    let request = ScanRequest {
        table_name: params.table_name.clone(),
        index_name: params.index_name.clone(),
        projection_expression: projection,
        filter,
        select: params.select,
    };

    let count_only = params.select == Some(Select::Count);
    let mut items: Vec<Item> = Vec::new();
    let mut matched = 0usize;
    let mut start_key: Option<Item> = None;

    loop {
        let page_limit = remaining_page_limit(&request, params.limit, items.len());
        let page = scanner.scan_page(&request, start_key.take(), page_limit).await?;
        matched += page.count;
        items.extend(page.items);

        if !count_only {
            if let Some(limit) = params.limit {
                if items.len() >= limit {
                    items.truncate(limit);
                    break;
                }
            }
        }
        match page.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => break,
        }
    }

    if count_only {
        return Ok(TableFacts {
            records: Vec::new(),
            count: matched,
        });
    }

    let records = items
        .into_iter()
        .map(|item| record_json(item, params.simplify))
        .collect::<ScanResult<Vec<_>>>()?;
    let count = records.len();
    debug!(count, "scan complete");

    Ok(TableFacts { records, count })
}

/// DynamoDB's page `Limit` counts evaluated items, not matching ones, so it
/// is only a safe optimization when the scan carries no filter.
fn remaining_page_limit(
    request: &ScanRequest,
    limit: Option<usize>,
    collected: usize,
) -> Option<i32> {
    if request.filter.is_some() || request.select == Some(Select::Count) {
        return None;
    }
    let limit = limit?;
    let remaining = limit.saturating_sub(collected).max(1);
    i32::try_from(remaining).ok()
}

fn record_json(item: Item, simplify: bool) -> ScanResult<Value> {
    if simplify {
        Ok(Value::Object(
            item.into_iter().map(|(k, v)| (k, v.simplify())).collect(),
        ))
    } else {
        serde_json::to_value(&item).map_err(|e| ScanError::Internal(e.into()))
    }
}
