//! End-to-end scan tests against a running local DynamoDB endpoint.

#[cfg(test)]
mod tests {
    use dynafacts_core::{SdkScanner, scan_table};
    use dynafacts_model::ScanTableParams;
    use serde_json::json;

    use crate::{cleanup_table, dynamodb_client, seed_servers_table};

    fn params(doc: serde_json::Value) -> ScanTableParams {
        serde_json::from_value(doc).unwrap()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_scan_whole_table() {
        let client = dynamodb_client();
        let table = seed_servers_table(&client, "scan-all").await;
        let scanner = SdkScanner::new(client.clone());

        let facts = scan_table(&scanner, &params(json!({"table_name": table})))
            .await
            .unwrap();
        assert_eq!(facts.count, 3);
        // Typed-value form by default.
        assert!(facts.records[0].get("pk").unwrap().get("S").is_some());

        cleanup_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_filter_and_project() {
        let client = dynamodb_client();
        let table = seed_servers_table(&client, "scan-filter").await;
        let scanner = SdkScanner::new(client.clone());

        let facts = scan_table(
            &scanner,
            &params(json!({
                "table_name": table,
                "projection_expression": "SerialNumber",
                "filter_expression": [{"Location": "datacenter"}],
                "simplify": true,
            })),
        )
        .await
        .unwrap();

        assert_eq!(facts.count, 2);
        let mut serials: Vec<&str> = facts
            .records
            .iter()
            .map(|r| r.get("SerialNumber").unwrap().as_str().unwrap())
            .collect();
        serials.sort_unstable();
        assert_eq!(serials, vec!["SN-100", "SN-200"]);
        // Projection keeps only the requested attribute.
        assert!(facts.records[0].get("Location").is_none());

        cleanup_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_apply_nested_or_filter() {
        let client = dynamodb_client();
        let table = seed_servers_table(&client, "scan-or").await;
        let scanner = SdkScanner::new(client.clone());

        // 20 < GradePercentage > 80, i.e. outliers only.
        let facts = scan_table(
            &scanner,
            &params(json!({
                "table_name": table,
                "simplify": true,
                "filter_expression": {"OR": [
                    {"GradePercentage": {"comparison_operator": "lt", "value": 20}},
                    {"GradePercentage": {"comparison_operator": "gt", "value": 80}},
                ]},
            })),
        )
        .await
        .unwrap();

        assert_eq!(facts.count, 2);
        for record in &facts.records {
            let grade = record.get("GradePercentage").unwrap().as_i64().unwrap();
            assert!(!(20..=80).contains(&grade));
        }

        cleanup_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_honor_limit() {
        let client = dynamodb_client();
        let table = seed_servers_table(&client, "scan-limit").await;
        let scanner = SdkScanner::new(client.clone());

        let facts = scan_table(
            &scanner,
            &params(json!({"table_name": table, "limit": 1})),
        )
        .await
        .unwrap();
        assert_eq!(facts.count, 1);
        assert_eq!(facts.records.len(), 1);

        cleanup_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_count_without_records() {
        let client = dynamodb_client();
        let table = seed_servers_table(&client, "scan-count").await;
        let scanner = SdkScanner::new(client.clone());

        let facts = scan_table(
            &scanner,
            &params(json!({"table_name": table, "select": "COUNT"})),
        )
        .await
        .unwrap();
        assert!(facts.records.is_empty());
        assert_eq!(facts.count, 3);

        cleanup_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_surface_missing_table_as_service_error() {
        let client = dynamodb_client();
        let scanner = SdkScanner::new(client);

        let err = scan_table(
            &scanner,
            &params(json!({"table_name": "no-such-table-anywhere"})),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("DynamoDB scan failed"));
    }
}
