//! Scan driver and filter-expression compiler for the dynafacts plugin.
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod expression;
pub mod scan;

pub use client::{Item, ScanPage, ScanRequest, SdkScanner, TableScanner};
pub use error::{ScanError, ScanResult};
pub use expression::{CompiledExpression, compile_filter};
pub use scan::{TableFacts, scan_table};
