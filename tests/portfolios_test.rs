//! Integration tests for portfolio and item operations.

use kubera::auth::{current_timestamp, generate_signature};
use kubera::{Category, Client, ClientConfig, Credentials, KuberaError, UpdateItemRequest};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    Client::with_config(
        Credentials::new("test_key", "test_secret").unwrap(),
        ClientConfig {
            base_url: Some(server.uri()),
            ..Default::default()
        },
    )
    .unwrap()
}

#[tokio::test]
async fn test_list_portfolios() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/data/portfolio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"id": "portfolio_001", "name": "Test Portfolio 1", "currency": "USD"},
                {"id": "portfolio_002", "name": "Test Portfolio 2", "currency": "EUR"}
            ],
            "errorCode": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let portfolios = client_for(&mock_server).portfolios().list().await.unwrap();

    assert_eq!(portfolios.len(), 2);
    assert_eq!(portfolios[0].id, "portfolio_001");
    assert_eq!(portfolios[0].name, "Test Portfolio 1");
    assert_eq!(portfolios[1].currency, "EUR");
}

#[tokio::test]
async fn test_get_portfolio() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/data/portfolio/portfolio_001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "id": "portfolio_001",
                "name": "Personal",
                "currency": "USD",
                "netWorth": {"amount": 320000.0, "currency": "USD"},
                "asset": [
                    {
                        "id": "asset_001",
                        "name": "Checking",
                        "sheetName": "Banks",
                        "value": {"amount": 5000.0, "currency": "USD"}
                    },
                    {
                        "id": "asset_002",
                        "name": "Index Fund",
                        "sheetName": "Investments",
                        "ticker": "VTI",
                        "quantity": 100.0,
                        "value": {"amount": 25000.0, "currency": "USD"},
                        "cost": {"amount": 20000.0, "currency": "USD"}
                    }
                ],
                "debt": [
                    {
                        "id": "debt_001",
                        "name": "Mortgage",
                        "value": {"amount": 250000.0, "currency": "USD"}
                    }
                ],
                "insurance": []
            },
            "errorCode": 0
        })))
        .mount(&mock_server)
        .await;

    let detail = client_for(&mock_server)
        .portfolios()
        .get("portfolio_001")
        .await
        .unwrap();

    assert_eq!(detail.name.as_deref(), Some("Personal"));
    assert_eq!(detail.assets.len(), 2);
    assert_eq!(detail.debts.len(), 1);
    assert_eq!(detail.net_worth.as_ref().unwrap().amount(), Some(320000.0));

    let investments = detail.sheet_items(Category::Asset, "investments");
    assert_eq!(investments.len(), 1);
    assert_eq!(investments[0].ticker.as_deref(), Some("VTI"));
    assert_eq!(investments[0].cost_amount(), Some(20000.0));
}

#[tokio::test]
async fn test_update_item_sends_compact_signed_body() {
    let mock_server = MockServer::start().await;
    let body = r#"{"name":"Updated Item Name","value":5500.0}"#;
    let now = current_timestamp();

    for ts in now..=now + 2 {
        let signature = generate_signature(
            "test_key",
            "test_secret",
            "POST",
            "/api/v3/data/item/asset_001",
            body,
            ts,
        );
        Mock::given(method("POST"))
            .and(path("/api/v3/data/item/asset_001"))
            .and(body_string(body))
            .and(header("x-timestamp", ts.to_string().as_str()))
            .and(header("x-signature", signature.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "id": "asset_001",
                    "name": "Updated Item Name",
                    "value": {"amount": 5500.0, "currency": "USD"}
                },
                "errorCode": 0
            })))
            .mount(&mock_server)
            .await;
    }

    let item = client_for(&mock_server)
        .items()
        .update(
            "asset_001",
            &UpdateItemRequest {
                name: Some("Updated Item Name".to_string()),
                value: Some(5500.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(item.id, "asset_001");
    assert_eq!(item.name.as_deref(), Some("Updated Item Name"));
    assert_eq!(item.value_amount(), 5500.0);
}

#[tokio::test]
async fn test_update_permission_denied() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/data/item/asset_001"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "message": "Forbidden"
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .items()
        .update(
            "asset_001",
            &UpdateItemRequest {
                value: Some(50000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    match &err {
        KuberaError::Permission {
            message,
            status_code,
            ..
        } => {
            assert_eq!(*status_code, 403);
            assert!(message.starts_with("Permission denied: Forbidden"));
            assert!(message.contains("update permissions"));
        }
        other => panic!("Expected Permission error, got {:?}", other),
    }
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_empty_update_never_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .items()
        .update("asset_001", &UpdateItemRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, KuberaError::InvalidRequest(_)));
}
