use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use crm_relay::{server, HttpUpstream, RelayConfig, RelayService};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use tower::ServiceExt;

const GENERIC_ERROR: &str = "An error occurred while processing the request.";

fn relay_app(base_url: &str) -> Router {
    let config = RelayConfig::for_upstream(base_url).unwrap();
    let upstream = HttpUpstream::new(config.request_timeout()).unwrap();
    server::app(RelayService::new(upstream, &config))
}

fn get(uri: &str, authorization: Option<&str>, version: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = authorization {
        builder = builder.header("Authorization", token);
    }
    if let Some(version) = version {
        builder = builder.header("Version", version);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_invalid_module_returns_400_without_upstream_call() {
    let upstream = MockServer::start_async().await;
    let any_call = upstream
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({}));
        })
        .await;

    for uri in ["/?module=widgets", "/", "/?module=contacts%2F"] {
        let (status, body) = send(
            relay_app(&upstream.base_url()),
            get(uri, Some("Bearer t"), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid module specified."}));
    }

    any_call.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_missing_authorization_returns_401_without_upstream_call() {
    let upstream = MockServer::start_async().await;
    let any_call = upstream
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({}));
        })
        .await;

    let (status, body) = send(
        relay_app(&upstream.base_url()),
        get("/?module=invoices", None, Some("2021-07-28")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Authorization header is required."}));
    any_call.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_contacts_fan_out_drops_failed_details() {
    let upstream = MockServer::start_async().await;

    let list_mock = upstream
        .mock_async(|when, then| {
            when.method(GET)
                .path("/contacts/")
                .query_param("locationId", "L1")
                .query_param("limit", "3")
                .header("authorization", "Bearer contacts-token")
                .header("version", "2021-07-28")
                .header("content-type", "application/json");
            then.status(200).json_body(json!({
                "contacts": [{"id": "c1"}, {"id": "c2"}, {"id": "c3"}],
                "meta": {"total": 3}
            }));
        })
        .await;

    let mut detail_mocks = Vec::new();
    for id in ["c1", "c3"] {
        let mock = upstream
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("/contacts/{}", id))
                    .header("authorization", "Bearer contacts-token")
                    .header("version", "2021-07-28");
                then.status(200)
                    .json_body(json!({"contact": {"id": id, "name": format!("Contact {}", id)}}));
            })
            .await;
        detail_mocks.push(mock);
    }
    let failing_detail = upstream
        .mock_async(|when, then| {
            when.method(GET).path("/contacts/c2");
            then.status(500).body("boom");
        })
        .await;

    let (status, body) = send(
        relay_app(&upstream.base_url()),
        get(
            "/?module=contacts&locationId=L1&limit=3",
            Some("Bearer contacts-token"),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    list_mock.assert_async().await;
    for mock in &detail_mocks {
        mock.assert_async().await;
    }
    failing_detail.assert_async().await;

    let contacts = body["contacts"].as_array().unwrap();
    assert_eq!(contacts.len(), 2);
    let ids: HashSet<&str> = contacts
        .iter()
        .map(|c| c["contact"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, HashSet::from(["c1", "c3"]));
}

#[tokio::test]
async fn test_opportunity_search_forwards_only_location_id() {
    let upstream = MockServer::start_async().await;
    let upstream_body = json!({
        "opportunities": [{"id": "o1", "name": "Deal"}],
        "meta": {"total": 1}
    });

    let leaked_params = upstream
        .mock_async(|when, then| {
            when.method(GET)
                .path("/opportunities/search/")
                .query_param_exists("status");
            then.status(500);
        })
        .await;
    let search_mock = upstream
        .mock_async(|when, then| {
            when.method(GET)
                .path("/opportunities/search/")
                .query_param("location_id", "L42");
            then.status(200).json_body(upstream_body.clone());
        })
        .await;

    let (status, body) = send(
        relay_app(&upstream.base_url()),
        get(
            "/?module=opportunities/search&locationId=L42&status=open",
            Some("Bearer t"),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream_body);
    search_mock.assert_async().await;
    leaked_params.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_products_passthrough_returns_module_field_only() {
    let upstream = MockServer::start_async().await;
    let products_mock = upstream
        .mock_async(|when, then| {
            when.method(GET)
                .path("/products/")
                .query_param("locationId", "L7");
            then.status(200).json_body(json!({
                "products": [{"id": "p1"}, {"id": "p2"}],
                "meta": {"total": 2}
            }));
        })
        .await;

    let (status, body) = send(
        relay_app(&upstream.base_url()),
        get("/?module=products&locationId=L7", Some("Bearer t"), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": "p1"}, {"id": "p2"}]));
    products_mock.assert_async().await;
}

#[tokio::test]
async fn test_nested_module_path_passthrough() {
    let upstream = MockServer::start_async().await;
    let orders_mock = upstream
        .mock_async(|when, then| {
            when.method(GET).path("/payments/orders/");
            then.status(200)
                .json_body(json!({"payments/orders": [{"id": "ord-1"}]}));
        })
        .await;

    let (status, body) = send(
        relay_app(&upstream.base_url()),
        get("/?module=payments%2Forders", Some("Bearer t"), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": "ord-1"}]));
    orders_mock.assert_async().await;
}

#[tokio::test]
async fn test_explicit_version_header_is_forwarded() {
    let upstream = MockServer::start_async().await;
    let campaigns_mock = upstream
        .mock_async(|when, then| {
            when.method(GET)
                .path("/campaigns/")
                .header("version", "2023-02-21");
            then.status(200).json_body(json!({"campaigns": []}));
        })
        .await;

    let (status, body) = send(
        relay_app(&upstream.base_url()),
        get("/?module=campaigns", Some("Bearer t"), Some("2023-02-21")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    campaigns_mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_status_returns_generic_500() {
    let upstream = MockServer::start_async().await;
    let unauthorized = upstream
        .mock_async(|when, then| {
            when.method(GET).path("/invoices/");
            then.status(401)
                .json_body(json!({"message": "Invalid JWT", "statusCode": 401}));
        })
        .await;

    let (status, body) = send(
        relay_app(&upstream.base_url()),
        get("/?module=invoices", Some("Bearer expired"), None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": GENERIC_ERROR}));
    unauthorized.assert_async().await;
}

#[tokio::test]
async fn test_non_json_upstream_body_returns_generic_500() {
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/users/search/");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let (status, body) = send(
        relay_app(&upstream.base_url()),
        get("/?module=users/search", Some("Bearer t"), None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": GENERIC_ERROR}));
}

#[tokio::test]
async fn test_network_error_returns_generic_500() {
    // 沒有服務監聽的位址
    let (status, body) = send(
        relay_app("http://127.0.0.1:1/"),
        get("/?module=contacts", Some("Bearer t"), None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": GENERIC_ERROR}));
}

#[tokio::test]
async fn test_served_over_tcp() {
    let upstream = MockServer::start_async().await;
    upstream
        .mock_async(|when, then| {
            when.method(GET).path("/surveys/submissions/");
            then.status(200)
                .json_body(json!({"surveys/submissions": [{"id": "s1"}]}));
        })
        .await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let handle = tokio::spawn(server::run(listener, relay_app(&upstream.base_url())));

    let response = reqwest::Client::new()
        .get(format!("http://{}/?module=surveys/submissions", address))
        .header("Authorization", "Bearer t")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([{"id": "s1"}]));

    handle.abort();
}
