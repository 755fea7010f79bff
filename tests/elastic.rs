use std::time::Duration;

use mockito::Matcher;
use property_scout::config::ElasticConfig;
use property_scout::search::types::{Bounds, CanonicalParameters};
use property_scout::search::{render, ElasticClient, RenderOptions, RenderedQuery, SearchBackend};
use serde_json::json;

fn client(base_url: &str) -> ElasticClient {
    let config = ElasticConfig::new(base_url, "es-key").with_index("properties");
    ElasticClient::new(config, Duration::from_secs(5)).unwrap()
}

fn sample_query() -> RenderedQuery {
    let mut params = CanonicalParameters::new("waterfront condo");
    params.min_bedrooms = Some(2);
    params.price = Bounds::new(None, Some(500_000.0));
    render(&params, &RenderOptions::default())
}

#[tokio::test]
async fn test_execute_posts_rendered_document() {
    let mut server = mockito::Server::new_async().await;
    let query = sample_query();
    let mock = server
        .mock("POST", "/properties/_search")
        .match_header("authorization", "ApiKey es-key")
        .match_body(Matcher::Json(query.to_document()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "took": 12,
                "hits": {
                    "total": { "value": 1, "relation": "eq" },
                    "hits": [{ "_id": "p1", "_score": 4.2, "fields": { "title": ["Harbor condo"] } }]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let raw = client(&server.url()).execute(&query).await.unwrap();

    assert_eq!(raw.took, Some(12));
    assert_eq!(raw.hits.hits.len(), 1);
    assert_eq!(raw.hits.hits[0].id, "p1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_trailing_slash_in_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/properties/_search")
        .with_status(200)
        .with_body(r#"{"hits": {"hits": []}}"#)
        .create_async()
        .await;

    let raw = client(&format!("{}/", server.url()))
        .execute(&sample_query())
        .await
        .unwrap();

    assert!(raw.hits.hits.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_auth_failure_is_unavailable() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/properties/_search")
        .with_status(401)
        .with_body(r#"{"error": "unable to authenticate"}"#)
        .create_async()
        .await;

    let err = client(&server.url()).execute(&sample_query()).await.unwrap_err();
    assert_eq!(err.kind(), "SearchUnavailable");
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/properties/_search")
        .with_status(503)
        .create_async()
        .await;

    let err = client(&server.url()).execute(&sample_query()).await.unwrap_err();
    assert_eq!(err.kind(), "SearchUnavailable");
}

#[tokio::test]
async fn test_rejected_query_is_execution_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/properties/_search")
        .with_status(400)
        .with_body(r#"{"error": {"type": "parsing_exception"}}"#)
        .create_async()
        .await;

    let err = client(&server.url()).execute(&sample_query()).await.unwrap_err();
    assert_eq!(err.kind(), "SearchExecutionError");
    assert!(err.to_string().contains("parsing_exception"));
}

#[tokio::test]
async fn test_unreadable_response_is_execution_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/properties/_search")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client(&server.url()).execute(&sample_query()).await.unwrap_err();
    assert_eq!(err.kind(), "SearchExecutionError");
}

#[tokio::test]
async fn test_unreachable_engine_is_unavailable() {
    let err = client("http://127.0.0.1:1")
        .execute(&sample_query())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "SearchUnavailable");
}

#[tokio::test]
async fn test_template_source_fetched() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/_scripts/properties-search-template")
        .match_header("authorization", "ApiKey es-key")
        .with_status(200)
        .with_body(
            json!({
                "_id": "properties-search-template",
                "found": true,
                "script": { "lang": "mustache", "source": "{\"q\": \"{{query}}\"}" }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let source = client(&server.url())
        .template_source("properties-search-template")
        .await
        .unwrap();

    assert_eq!(source, "{\"q\": \"{{query}}\"}");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_template_is_execution_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/_scripts/nope")
        .with_status(404)
        .with_body(r#"{"_id": "nope", "found": false}"#)
        .create_async()
        .await;

    let err = client(&server.url()).template_source("nope").await.unwrap_err();
    assert_eq!(err.kind(), "SearchExecutionError");
    assert!(err.to_string().contains("nope"));
}
