use std::time::Duration;

use mockito::Matcher;
use property_scout::config::GeocodingConfig;
use property_scout::models::GeoPoint;
use property_scout::search::{Geocoder, GoogleGeocoder};
use property_scout::ConnectorError;

const OK_MIAMI: &str = r#"{
    "status": "OK",
    "results": [
        { "geometry": { "location": { "lat": 25.7617, "lng": -80.1918 } } },
        { "geometry": { "location": { "lat": 1.0, "lng": 1.0 } } }
    ]
}"#;

const ZERO_RESULTS: &str = r#"{ "status": "ZERO_RESULTS", "results": [] }"#;

fn geocoder(base_url: &str, config: impl FnOnce(GeocodingConfig) -> GeocodingConfig) -> GoogleGeocoder {
    let config = config(GeocodingConfig::new("maps-key").with_endpoint(format!("{}/geocode/json", base_url)));
    GoogleGeocoder::new(config, Duration::from_secs(5)).unwrap()
}

fn geocode_path() -> Matcher {
    Matcher::Regex(r"^/geocode/json".to_string())
}

#[tokio::test]
async fn test_resolves_top_result() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", geocode_path())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("address".into(), "Miami, FL".into()),
            Matcher::UrlEncoded("region".into(), "us".into()),
            Matcher::UrlEncoded("key".into(), "maps-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(OK_MIAMI)
        .create_async()
        .await;

    let point = geocoder(&server.url(), |c| c).resolve("Miami, FL").await.unwrap();

    assert_eq!(point, GeoPoint::new(25.7617, -80.1918));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_zero_results_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", geocode_path())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ZERO_RESULTS)
        .create_async()
        .await;

    let err = geocoder(&server.url(), |c| c)
        .resolve("Nonexistent Place XYZ")
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::GeocodeNotFound { ref location } if location == "Nonexistent Place XYZ"));
}

#[tokio::test]
async fn test_fallback_suffix_tried_after_zero_results() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", geocode_path())
        .match_query(Matcher::UrlEncoded("address".into(), "Coral Gables".into()))
        .with_status(200)
        .with_body(ZERO_RESULTS)
        .expect(1)
        .create_async()
        .await;
    let fallback = server
        .mock("GET", geocode_path())
        .match_query(Matcher::UrlEncoded("address".into(), "Coral Gables, Florida".into()))
        .with_status(200)
        .with_body(r#"{"status": "OK", "results": [{"geometry": {"location": {"lat": 25.72, "lng": -80.27}}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let point = geocoder(&server.url(), |c| c.with_fallback_suffix("Florida"))
        .resolve("Coral Gables")
        .await
        .unwrap();

    assert_eq!(point, GeoPoint::new(25.72, -80.27));
    first.assert_async().await;
    fallback.assert_async().await;
}

#[tokio::test]
async fn test_fallback_not_used_when_first_lookup_succeeds() {
    let mut server = mockito::Server::new_async().await;
    let primary = server
        .mock("GET", geocode_path())
        .match_query(Matcher::UrlEncoded("address".into(), "Miami, FL".into()))
        .with_status(200)
        .with_body(OK_MIAMI)
        .expect(1)
        .create_async()
        .await;
    let fallback = server
        .mock("GET", geocode_path())
        .match_query(Matcher::UrlEncoded("address".into(), "Miami, FL, Florida".into()))
        .expect(0)
        .create_async()
        .await;

    geocoder(&server.url(), |c| c.with_fallback_suffix("Florida"))
        .resolve("Miami, FL")
        .await
        .unwrap();

    primary.assert_async().await;
    fallback.assert_async().await;
}

#[tokio::test]
async fn test_denied_request_is_service_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", geocode_path())
        .with_status(200)
        .with_body(r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#)
        .create_async()
        .await;

    let err = geocoder(&server.url(), |c| c).resolve("Miami").await.unwrap_err();

    match err {
        ConnectorError::GeocodeServiceError(message) => assert!(message.contains("REQUEST_DENIED")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_failure_is_service_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", geocode_path())
        .with_status(502)
        .create_async()
        .await;

    let err = geocoder(&server.url(), |c| c).resolve("Miami").await.unwrap_err();
    assert_eq!(err.kind(), "GeocodeServiceError");
}

#[tokio::test]
async fn test_garbage_body_is_service_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", geocode_path())
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let err = geocoder(&server.url(), |c| c).resolve("Miami").await.unwrap_err();
    assert_eq!(err.kind(), "GeocodeServiceError");
}

#[tokio::test]
async fn test_empty_location_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", geocode_path())
        .expect(0)
        .create_async()
        .await;

    let err = geocoder(&server.url(), |c| c).resolve("   ").await.unwrap_err();

    assert_eq!(err.kind(), "InvalidParameters");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_service_is_service_error() {
    let config = GeocodingConfig::new("maps-key").with_endpoint("http://127.0.0.1:1/geocode/json");
    let geocoder = GoogleGeocoder::new(config, Duration::from_secs(2)).unwrap();

    let err = geocoder.resolve("Miami").await.unwrap_err();
    assert_eq!(err.kind(), "GeocodeServiceError");
}
