//! Integration tests for the dynafacts scan driver.
//!
//! These tests require a DynamoDB-compatible endpoint (DynamoDB Local,
//! LocalStack, or similar) at `localhost:4566`. They are marked `#[ignore]`
//! so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p dynafacts-integration -- --ignored
//! ```

use std::sync::Once;

use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType,
};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the local DynamoDB server.
fn endpoint_url() -> String {
    std::env::var("DYNAMODB_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Create a configured DynamoDB client pointing at the local server.
#[must_use]
pub fn dynamodb_client() -> aws_sdk_dynamodb::Client {
    init_tracing();

    let creds = Credentials::new("test", "test", None, None, "integration-test");

    let config = aws_sdk_dynamodb::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_dynamodb::Client::from_conf(config)
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a simple hash-keyed table and seed it with server records.
///
/// Each record looks like `{pk, Location, SerialNumber, GradePercentage}`.
pub async fn seed_servers_table(client: &aws_sdk_dynamodb::Client, prefix: &str) -> String {
    let table_name = test_table_name(prefix);

    client
        .create_table()
        .table_name(&table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("pk")
                .key_type(KeyType::Hash)
                .build()
                .unwrap(),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("pk")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .unwrap(),
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create table {table_name}: {e}"));

    let rows = [
        ("srv-1", "datacenter", "SN-100", "95"),
        ("srv-2", "datacenter", "SN-200", "15"),
        ("srv-3", "Houston", "SN-300", "60"),
    ];
    for (pk, location, serial, grade) in rows {
        client
            .put_item()
            .table_name(&table_name)
            .item("pk", AttributeValue::S(pk.to_owned()))
            .item("Location", AttributeValue::S(location.to_owned()))
            .item("SerialNumber", AttributeValue::S(serial.to_owned()))
            .item("GradePercentage", AttributeValue::N(grade.to_owned()))
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to seed table {table_name}: {e}"));
    }

    table_name
}

/// Delete a test table, ignoring errors.
pub async fn cleanup_table(client: &aws_sdk_dynamodb::Client, table_name: &str) {
    let _ = client.delete_table().table_name(table_name).send().await;
}

mod test_scan;
