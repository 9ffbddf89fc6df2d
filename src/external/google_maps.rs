use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::Config,
    error::{invalid_input_error, missing_field_error, upstream_error, Error},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Element {
    pub status: String,
    pub duration: Option<TextValue>,
    pub distance: Option<TextValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Row {
    pub elements: Vec<Element>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistanceMatrixResponse {
    pub status: String,
    pub origin_addresses: Vec<String>,
    pub destination_addresses: Vec<String>,
    pub rows: Vec<Row>,
}

impl DistanceMatrixResponse {
    /// Commute duration in seconds for the first origin/destination pair.
    pub fn commute_duration(&self) -> Result<i64, Error> {
        let element = self
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .ok_or_else(missing_field_error)?;

        let duration = element.duration.as_ref().ok_or_else(missing_field_error)?;

        Ok(duration.value)
    }
}

fn build_request(client: &reqwest::Client, config: &Config) -> Result<reqwest::Request, Error> {
    let url = format!("{}/maps/api/distancematrix/json", config.api_base);

    let request = client
        .get(url)
        .query(&[("units", config.units.to_string())])
        .query(&[("origins", config.origin.as_str())])
        .query(&[("destinations", config.destination.as_str())])
        .query(&[("key", config.api_key.as_str())])
        .build()?;

    Ok(request)
}

#[tracing::instrument(skip(client))]
pub async fn fetch_distance_matrix(
    client: &reqwest::Client,
    config: &Config,
) -> Result<DistanceMatrixResponse, Error> {
    let request = build_request(client, config)?;

    debug!(url = %request.url(), "requesting distance matrix");

    let res = client.execute(request).await?;

    let status_code = res.status().as_u16();

    if status_code >= 400 && status_code < 500 {
        return Err(invalid_input_error());
    } else if status_code != 200 {
        return Err(upstream_error());
    }

    let body = res.text().await?;
    let data: DistanceMatrixResponse = serde_json::from_str(&body)?;

    if data.status != "OK" {
        return Err(upstream_error());
    }

    Ok(data)
}

#[tracing::instrument(skip(client))]
pub async fn fetch_commute_duration(
    client: &reqwest::Client,
    config: &Config,
) -> Result<i64, Error> {
    let data = fetch_distance_matrix(client, config).await?;

    data.commute_duration()
}

#[cfg(test)]
fn fixture_body(seconds: i64) -> String {
    serde_json::json!({
        "status": "OK",
        "origin_addresses": ["1600 Amphitheatre Parkway, Mountain View, CA 94043, USA"],
        "destination_addresses": ["1 Ferry Building, San Francisco, CA 94111, USA"],
        "rows": [{
            "elements": [{
                "status": "OK",
                "duration": { "text": "48 mins", "value": seconds },
                "distance": { "text": "35.9 mi", "value": 57824 }
            }]
        }]
    })
    .to_string()
}

#[cfg(test)]
fn test_config(api_base: &str) -> Config {
    use crate::config::Units;

    Config {
        api_base: api_base.into(),
        api_key: "test-key".into(),
        origin: "1600 Amphitheatre Parkway, Mountain View, CA".into(),
        destination: "1 Ferry Building, San Francisco, CA".into(),
        units: Units::Imperial,
    }
}

#[test]
fn extract_commute_duration_test() {
    let data: DistanceMatrixResponse = serde_json::from_str(&fixture_body(1234)).unwrap();

    assert_eq!(data.commute_duration().unwrap(), 1234);
}

#[test]
fn missing_rows_test() {
    let body = r#"{"status":"OK","origin_addresses":[],"destination_addresses":[]}"#;

    let result = serde_json::from_str::<DistanceMatrixResponse>(body);
    assert!(result.is_err());
}

#[test]
fn empty_rows_test() {
    let body = r#"{"status":"OK","origin_addresses":[],"destination_addresses":[],"rows":[]}"#;

    let data: DistanceMatrixResponse = serde_json::from_str(body).unwrap();
    assert_eq!(data.commute_duration().unwrap_err().code, 6);
}

#[test]
fn element_without_duration_test() {
    let body = r#"{
        "status": "OK",
        "origin_addresses": ["nowhere"],
        "destination_addresses": ["everywhere"],
        "rows": [{ "elements": [{ "status": "NOT_FOUND", "duration": null, "distance": null }] }]
    }"#;

    let data: DistanceMatrixResponse = serde_json::from_str(body).unwrap();
    assert_eq!(data.commute_duration().unwrap_err().code, 6);
}

#[test]
fn request_query_params_test() {
    let client = reqwest::Client::new();
    let config = test_config("https://maps.googleapis.com");

    let request = build_request(&client, &config).unwrap();

    assert_eq!(
        request.url().path(),
        "/maps/api/distancematrix/json"
    );

    let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("units".to_string(), "imperial".to_string()),
            (
                "origins".to_string(),
                "1600 Amphitheatre Parkway, Mountain View, CA".to_string()
            ),
            (
                "destinations".to_string(),
                "1 Ferry Building, San Francisco, CA".to_string()
            ),
            ("key".to_string(), "test-key".to_string()),
        ]
    );

    // addresses carry spaces and commas; neither may reach the wire raw
    let raw = request.url().query().unwrap();
    assert!(!raw.contains(' '));
    assert!(!raw.contains(','));
}

#[cfg(test)]
fn serve_fixture(
    hits: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    response: axum::response::Response,
) -> std::net::SocketAddr {
    use std::sync::atomic::Ordering;

    use axum::{extract::Extension, routing::get, Router};

    let response = std::sync::Arc::new(std::sync::Mutex::new(Some(response)));

    let app = Router::new()
        .route(
            "/maps/api/distancematrix/json",
            get(
                move |Extension(hits): Extension<std::sync::Arc<std::sync::atomic::AtomicUsize>>| {
                    let response = response.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        response.lock().unwrap().take().unwrap()
                    }
                },
            ),
        )
        .layer(Extension(hits));

    let server =
        axum::Server::bind(&"127.0.0.1:0".parse().unwrap()).serve(app.into_make_service());
    let addr = server.local_addr();

    tokio::spawn(server);

    addr
}

#[test]
fn single_request_test() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::response::IntoResponse;
    use tokio_test::block_on;

    block_on(async {
        let hits = Arc::new(AtomicUsize::new(0));
        let body: serde_json::Value = serde_json::from_str(&fixture_body(1234)).unwrap();
        let addr = serve_fixture(hits.clone(), axum::Json(body).into_response());

        let client = reqwest::Client::new();
        let config = test_config(&format!("http://{}", addr));

        let seconds = fetch_commute_duration(&client, &config).await.unwrap();

        assert_eq!(seconds, 1234);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    });
}

#[test]
fn upstream_status_test() {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tokio_test::block_on;

    block_on(async {
        let hits = Arc::new(AtomicUsize::new(0));
        let addr = serve_fixture(hits, StatusCode::INTERNAL_SERVER_ERROR.into_response());

        let client = reqwest::Client::new();
        let config = test_config(&format!("http://{}", addr));

        let error = fetch_distance_matrix(&client, &config).await.unwrap_err();
        assert_eq!(error.code, 4);
    });
}

#[test]
fn invalid_input_status_test() {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tokio_test::block_on;

    block_on(async {
        let hits = Arc::new(AtomicUsize::new(0));
        let addr = serve_fixture(hits, StatusCode::FORBIDDEN.into_response());

        let client = reqwest::Client::new();
        let config = test_config(&format!("http://{}", addr));

        let error = fetch_distance_matrix(&client, &config).await.unwrap_err();
        assert_eq!(error.code, 101);
    });
}

#[test]
fn api_status_denied_test() {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use axum::response::IntoResponse;
    use tokio_test::block_on;

    block_on(async {
        let hits = Arc::new(AtomicUsize::new(0));
        let body = serde_json::json!({
            "status": "REQUEST_DENIED",
            "origin_addresses": [],
            "destination_addresses": [],
            "rows": []
        });
        let addr = serve_fixture(hits, axum::Json(body).into_response());

        let client = reqwest::Client::new();
        let config = test_config(&format!("http://{}", addr));

        let error = fetch_distance_matrix(&client, &config).await.unwrap_err();
        assert_eq!(error.code, 4);
    });
}
