use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use shared::error::ErrorCode;
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

const NEBULA_BODY: &str = concat!(
    r#"{"url":"https://x/img.jpg","title":"Nebula","#,
    r#""explanation":"A nebula.","media_type":"image"}"#,
);

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    body: &'static str,
    hits: Arc<Mutex<u32>>,
    last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
}

async fn handle_apod(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    *state.hits.lock().await += 1;
    *state.last_query.lock().await = Some(query);
    (state.status, state.body)
}

async fn spawn_apod_server(
    status: StatusCode,
    body: &'static str,
) -> Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState {
        status,
        body,
        hits: Arc::new(Mutex::new(0)),
        last_query: Arc::new(Mutex::new(None)),
    };
    let app = Router::new()
        .route("/planetary/apod", get(handle_apod))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/planetary/apod"), state))
}

async fn refused_endpoint() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/planetary/apod"))
}

#[tokio::test]
async fn success_body_classifies_as_ok() {
    let (endpoint, server) = spawn_apod_server(StatusCode::OK, NEBULA_BODY)
        .await
        .expect("spawn server");

    let outcome = HttpFetcher::new()
        .fetch(&RequestConfig::new(endpoint, "test-key"))
        .await;

    let picture = match outcome {
        Outcome::Ok(picture) => picture,
        other => panic!("expected ok outcome, got {other:?}"),
    };
    assert_eq!(picture.url, "https://x/img.jpg");
    assert_eq!(picture.title, "Nebula");
    assert_eq!(picture.explanation, "A nebula.");
    assert_eq!(*server.hits.lock().await, 1);
}

#[tokio::test]
async fn api_key_is_sent_as_query_parameter() {
    let (endpoint, server) = spawn_apod_server(
        StatusCode::OK,
        r#"{"url":"u","title":"t","explanation":"e"}"#,
    )
    .await
    .expect("spawn server");

    HttpFetcher::new()
        .fetch(&RequestConfig::new(endpoint, "key with space"))
        .await;

    let query = server.last_query.lock().await.clone().expect("query seen");
    assert_eq!(
        query.get("api_key").map(String::as_str),
        Some("key with space")
    );
}

#[tokio::test]
async fn failure_body_classifies_as_api_failure_regardless_of_status() {
    let (endpoint, _server) = spawn_apod_server(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"error":{"code":"OVER_RATE_LIMIT","message":"Too many requests"}}"#,
    )
    .await
    .expect("spawn server");

    let outcome = HttpFetcher::new()
        .fetch(&RequestConfig::new(endpoint, "k"))
        .await;

    let err = match outcome {
        Outcome::ApiFailure(err) => err,
        other => panic!("expected api failure, got {other:?}"),
    };
    assert_eq!(err.code, ErrorCode::Text("OVER_RATE_LIMIT".into()));
    assert_eq!(err.message, "Too many requests");
}

#[tokio::test]
async fn failure_body_with_ok_status_is_still_api_failure() {
    let (endpoint, _server) = spawn_apod_server(
        StatusCode::OK,
        r#"{"error":{"code":403,"message":"API_KEY_INVALID"}}"#,
    )
    .await
    .expect("spawn server");

    let outcome = HttpFetcher::new()
        .fetch(&RequestConfig::new(endpoint, "k"))
        .await;

    assert!(matches!(
        outcome,
        Outcome::ApiFailure(ref err) if err.code == ErrorCode::Number(403.into())
    ));
}

#[tokio::test]
async fn failure_body_with_float_or_oversized_code_is_api_failure() {
    for body in [
        r#"{"error":{"code":429.0,"message":"Too many requests"}}"#,
        r#"{"error":{"code":18446744073709551615,"message":"Too many requests"}}"#,
    ] {
        let (endpoint, _server) = spawn_apod_server(StatusCode::TOO_MANY_REQUESTS, body)
            .await
            .expect("spawn server");

        let outcome = HttpFetcher::new()
            .fetch(&RequestConfig::new(endpoint, "k"))
            .await;

        let err = match outcome {
            Outcome::ApiFailure(err) => err,
            other => panic!("expected api failure for {body}, got {other:?}"),
        };
        assert!(matches!(err.code, ErrorCode::Number(_)));
        assert_eq!(err.message, "Too many requests");
    }
}

#[tokio::test]
async fn fetch_through_caller_supplied_client() {
    let (endpoint, server) = spawn_apod_server(
        StatusCode::OK,
        r#"{"url":"u","title":"t","explanation":"e"}"#,
    )
    .await
    .expect("spawn server");
    let client = Client::builder().no_proxy().build().expect("client");

    let outcome = HttpFetcher::with_client(client)
        .fetch(&RequestConfig::new(endpoint, "k"))
        .await;

    assert!(matches!(outcome, Outcome::Ok(ref picture) if picture.title == "t"));
    assert_eq!(*server.hits.lock().await, 1);
}

#[tokio::test]
async fn non_json_body_is_transport_decode_failure() {
    let (endpoint, _server) =
        spawn_apod_server(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
            .await
            .expect("spawn server");

    let outcome = HttpFetcher::new()
        .fetch(&RequestConfig::new(endpoint, "k"))
        .await;

    assert!(matches!(
        outcome,
        Outcome::TransportFailure(TransportError::Decode(_))
    ));
}

#[tokio::test]
async fn success_shape_missing_fields_is_malformed_payload() {
    let (endpoint, _server) = spawn_apod_server(StatusCode::OK, r#"{"url":"u","title":"t"}"#)
        .await
        .expect("spawn server");

    let outcome = HttpFetcher::new()
        .fetch(&RequestConfig::new(endpoint, "k"))
        .await;

    assert!(matches!(
        outcome,
        Outcome::TransportFailure(TransportError::MalformedPayload(_))
    ));
}

#[tokio::test]
async fn connection_refused_is_transport_request_failure() {
    let endpoint = refused_endpoint().await.expect("free port");

    let outcome = HttpFetcher::new()
        .fetch(&RequestConfig::new(endpoint, "secret-key"))
        .await;

    let err = match outcome {
        Outcome::TransportFailure(err) => err,
        other => panic!("expected transport failure, got {other:?}"),
    };
    assert!(matches!(err, TransportError::Request(_)));
    assert!(
        !err.to_string().contains("secret-key"),
        "transport error leaked the api key: {err}"
    );
}

#[tokio::test]
async fn invalid_endpoint_fails_before_any_request() {
    let outcome = HttpFetcher::new()
        .fetch(&RequestConfig::new("not a url", "k"))
        .await;

    assert!(matches!(
        outcome,
        Outcome::TransportFailure(TransportError::InvalidEndpoint(_))
    ));
}

#[tokio::test]
async fn endpoint_without_query_support_fails_before_any_request() {
    let outcome = HttpFetcher::new()
        .fetch(&RequestConfig::new("mailto:apod@example.test", "k"))
        .await;

    assert!(matches!(
        outcome,
        Outcome::TransportFailure(TransportError::InvalidEndpoint(
            EndpointError::CannotBeABase(_)
        ))
    ));
}

#[test]
fn outcome_kind_names_each_variant() {
    let ok = Outcome::Ok(PictureOfTheDay {
        url: "u".into(),
        title: "t".into(),
        explanation: "e".into(),
    });
    let api = Outcome::ApiFailure(ServiceError::new(ErrorCode::Number(400.into()), "bad"));
    let transport = Outcome::TransportFailure(TransportError::Decode(
        serde_json::from_str::<Value>("{").expect_err("invalid json"),
    ));
    assert_eq!(ok.kind(), "ok");
    assert_eq!(api.kind(), "api_failure");
    assert_eq!(transport.kind(), "transport_failure");
}
