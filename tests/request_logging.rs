//! End-to-end tests for the request logging stage.

use std::time::Duration;

use axum::{body::Body, http::Request, routing::get, Router};
use logpipe::http::RequestLogLayer;
use logpipe::logger::Logger;
use logpipe::record::Level;
use tower::ServiceExt;

mod common;

async fn boom() -> &'static str {
    panic!("handler blew up")
}

fn app(logger: Logger, verbose: bool) -> Router {
    Router::new()
        .route("/orders", get(|| async { "ok" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                "slow"
            }),
        )
        .route("/boom", get(boom))
        .layer(RequestLogLayer::new(logger).verbose(verbose))
}

#[tokio::test]
async fn test_generates_correlation_id() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let app = app(logger.clone(), false);

    let response = app
        .oneshot(Request::get("/orders").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let id = response
        .headers()
        .get("x-correlation-id")
        .expect("response must carry correlation header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    logger.flush().await;
    let records = sink.records();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.extra["correlation_id"], serde_json::json!(id));
    }
}

#[tokio::test]
async fn test_adopted_id_appears_everywhere() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let app = app(logger.clone(), false);

    let response = app
        .oneshot(
            Request::get("/orders")
                .header("x-correlation-id", "client-supplied-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        "client-supplied-token"
    );

    logger.flush().await;
    let records = sink.records();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(
            record.extra["correlation_id"],
            serde_json::json!("client-supplied-token")
        );
    }
}

#[tokio::test]
async fn test_record_pair_ordering_and_duration() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let app = app(logger.clone(), false);

    app.oneshot(Request::get("/slow").body(Body::empty()).unwrap())
        .await
        .unwrap();

    logger.flush().await;
    let records = sink.records();
    assert_eq!(records.len(), 2);

    let incoming = &records[0];
    let outgoing = &records[1];
    assert_eq!(incoming.message, "Incoming request");
    assert_eq!(outgoing.message, "Request completed");
    assert!(incoming.timestamp <= outgoing.timestamp);
    assert_eq!(outgoing.context["status"], serde_json::json!(200));

    let duration_ms = outgoing.context["duration_ms"].as_u64().unwrap();
    assert!(duration_ms >= 30, "slow handler took {duration_ms}ms");

    let span_ms = (outgoing.timestamp - incoming.timestamp).num_milliseconds() as u64;
    assert!(
        duration_ms.abs_diff(span_ms) <= 50,
        "duration {duration_ms}ms vs timestamp span {span_ms}ms"
    );
}

#[tokio::test]
async fn test_verbose_headers_are_redacted() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let app = app(logger.clone(), true);

    app.oneshot(
        Request::get("/orders")
            .header("authorization", "Bearer secret-token")
            .header("x-foo", "bar")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    logger.flush().await;
    let records = sink.records();
    let headers = records[0].context["headers"].as_object().unwrap();

    assert_eq!(headers["authorization"], serde_json::json!(["REDACTED"]));
    assert_eq!(headers["x-foo"], serde_json::json!(["bar"]));
}

#[tokio::test]
async fn test_panic_still_closes_the_pair() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let app = app(logger.clone(), false);

    let response = app
        .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert!(response.headers().contains_key("x-correlation-id"));

    logger.flush().await;
    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message, "Incoming request");
    assert_eq!(records[1].message, "Request aborted by panic");
    assert_eq!(records[1].level, Level::Error);
}

#[tokio::test]
async fn test_concurrent_requests_do_not_share_ids() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let app = app(logger.clone(), false);

    let first = app.clone().oneshot(
        Request::get("/slow")
            .header("x-correlation-id", "token-one")
            .body(Body::empty())
            .unwrap(),
    );
    let second = app.oneshot(
        Request::get("/slow")
            .header("x-correlation-id", "token-two")
            .body(Body::empty())
            .unwrap(),
    );
    let (first, second) = tokio::join!(first, second);
    first.unwrap();
    second.unwrap();

    logger.flush().await;
    let records = sink.records();
    assert_eq!(records.len(), 4);

    for token in ["token-one", "token-two"] {
        let count = records
            .iter()
            .filter(|record| record.extra["correlation_id"] == serde_json::json!(token))
            .count();
        assert_eq!(count, 2, "each request owns exactly its own record pair");
    }
}
