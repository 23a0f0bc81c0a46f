//! dynafacts - scan a DynamoDB table and emit matching records as facts.
//!
//! The host runtime invokes this binary with a single JSON parameter
//! document, either as a file named by the first argument or on stdin, and
//! reads one JSON document back on stdout:
//!
//! ```text
//! echo '{"table_name": "Servers", "simplify": true}' | dynafacts
//! {"changed":false,"records":[...],"count":2}
//! ```
//!
//! On failure the output is `{"failed": true, "msg": "..."}` and the exit
//! code is nonzero; the host is responsible for surfacing the message.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AWS_REGION` etc. | *(provider chain)* | Standard AWS credential/region configuration |
//! | `DYNAMODB_ENDPOINT_URL` | *(unset)* | Endpoint override for local testing |
//! | `LOG_LEVEL` | `warn` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::io::Read;

use anyhow::{Context, Result, bail};
use aws_config::BehaviorVersion;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dynafacts_core::{SdkScanner, TableFacts, scan_table};
use dynafacts_model::ScanTableParams;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `LOG_LEVEL`. Logs go to
/// stderr so stdout stays reserved for the result document.
fn init_tracing() -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_owned());
        EnvFilter::try_new(&level).with_context(|| format!("invalid log level filter: {level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Read the parameter document from the args file or stdin.
fn read_params() -> Result<ScanTableParams> {
    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read args file {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read parameters from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("invalid parameter document")
}

async fn run() -> Result<TableFacts> {
    let params = read_params()?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Ok(url) = std::env::var("DYNAMODB_ENDPOINT_URL") {
        debug!(endpoint = %url, "using endpoint override");
        loader = loader.endpoint_url(url);
    }
    let config = loader.load().await;
    if config.region().is_none() {
        bail!("region must be specified");
    }

    let client = aws_sdk_dynamodb::Client::new(&config);
    let scanner = SdkScanner::new(client);
    let facts = scan_table(&scanner, &params).await?;
    Ok(facts)
}

/// Success document in the host's exit-json shape.
fn success_document(facts: &TableFacts) -> serde_json::Value {
    json!({
        "changed": false,
        "records": facts.records,
        "count": facts.count,
    })
}

/// Failure document in the host's fail-json shape.
fn failure_document(msg: &str) -> serde_json::Value {
    json!({"failed": true, "msg": msg})
}

#[tokio::main]
async fn main() {
    if let Err(err) = init_tracing() {
        fail(&format!("{err:#}"));
    }
    match run().await {
        Ok(facts) => println!("{}", success_document(&facts)),
        Err(err) => fail(&format!("{err:#}")),
    }
}

/// Emit the fail-json document and exit nonzero.
fn fail(msg: &str) -> ! {
    println!("{}", failure_document(msg));
    std::process::exit(1);
}
