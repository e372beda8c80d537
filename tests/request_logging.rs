//! End-to-end behavior of the request-logging middleware, driven through
//! `Router::handle` without a network listener.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Method, StatusCode};
use serde_json::Value;

use seqlog::{
    Attr, Level, MemoryWriter, Request, RequestLoggerFactory, RequestLogging, Response, Router,
    Sink, TRAILER_MESSAGE, request_logger,
};

fn app(out: &MemoryWriter) -> Router {
    let factory = RequestLoggerFactory::new(Sink::from_writer(out.clone()));
    Router::new()
        .get("/quiet", quiet)
        .get("/chatty", chatty)
        .get("/fan-out/{n}", fan_out)
        .get("/slow", slow)
        .get("/boom", boom)
        .layer(RequestLogging::with_factory(factory))
}

fn request(uri: &str, headers: &[(&str, &str)]) -> Request {
    let mut builder = http::Request::builder().method(Method::GET).uri(uri);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    Request::from_http(builder.body(Bytes::new()).unwrap())
}

fn for_request<'a>(records: &'a [Value], request_id: &str) -> Vec<&'a Value> {
    records.iter().filter(|r| r["request_id"] == request_id).collect()
}

async fn quiet(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn chatty(req: Request) -> &'static str {
    let log = request_logger(&req).expect("logger installed by middleware");
    log.info("one", &[Attr::new("step", 1)]);
    log.warn("two", &[Attr::new("step", 2)]);
    log.error("three", &[Attr::new("step", 3)]);
    "ok"
}

async fn fan_out(req: Request) -> Response {
    let n: u64 = req.param("n").and_then(|n| n.parse().ok()).unwrap_or(0);
    let log = request_logger(&req).expect("logger installed by middleware");

    let tasks: Vec<_> = (0..n)
        .map(|i| {
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                log.log(Level::INFO, "work", &[Attr::new("task", i)]);
            })
        })
        .collect();
    for t in tasks {
        t.await.unwrap();
    }

    Response::text(log.counter().to_string())
}

async fn slow(req: Request) -> &'static str {
    let log = request_logger(&req).expect("logger installed by middleware");
    log.info("started", &[]);
    tokio::time::sleep(Duration::from_secs(60)).await;
    "finished"
}

async fn boom(req: Request) -> &'static str {
    let log = request_logger(&req).expect("logger installed by middleware");
    log.info("started", &[]);
    panic!("handler failed");
}

fn messages(out: &MemoryWriter) -> Vec<String> {
    out.records()
        .iter()
        .map(|r| r["message"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn silent_handler_still_gets_exactly_one_trailer() {
    let out = MemoryWriter::new();
    let res = app(&out).handle(request("/quiet", &[])).await;

    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    let lines = out.lines();
    assert_eq!(lines.len(), 1);

    let rec: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(rec["severity"], "INFO");
    assert_eq!(rec["message"], TRAILER_MESSAGE);
    assert_eq!(rec["order_index"], 0);
}

#[tokio::test]
async fn records_carry_normalized_fields_and_headers() {
    let out = MemoryWriter::new();
    let req = request("/chatty", &[("X-Session-Id", "s1"), ("X-Request-Id", "r1")]);
    app(&out).handle(req).await;

    let records = out.records();
    assert_eq!(records.len(), 4);

    for rec in &records {
        assert_eq!(rec["session_id"], "s1");
        assert_eq!(rec["request_id"], "r1");
        assert_eq!(rec["test_id"], "");
        assert!(rec.get("level").is_none());
        assert!(rec.get("msg").is_none());

        let time = rec["time"].as_str().unwrap();
        assert!(time.ends_with('Z'), "{time}");
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok(), "{time}");
    }

    let summary: Vec<(String, String, u64)> = records
        .iter()
        .map(|r| {
            (
                r["severity"].as_str().unwrap().to_owned(),
                r["message"].as_str().unwrap().to_owned(),
                r["order_index"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        [
            ("INFO".to_owned(), "one".to_owned(), 0),
            ("WARN".to_owned(), "two".to_owned(), 1),
            ("ERROR".to_owned(), "three".to_owned(), 2),
            ("INFO".to_owned(), TRAILER_MESSAGE.to_owned(), 3),
        ]
    );
    assert_eq!(records[0]["step"], 1);
}

#[tokio::test]
async fn fan_out_inside_one_request_gets_distinct_indices() {
    const N: u64 = 64;
    let out = MemoryWriter::new();
    let res = app(&out).handle(request(&format!("/fan-out/{N}"), &[])).await;
    assert_eq!(res.body(), N.to_string().as_bytes());

    let records = out.records();
    let work: BTreeSet<u64> = records
        .iter()
        .filter(|r| r["message"] == "work")
        .map(|r| r["order_index"].as_u64().unwrap())
        .collect();
    assert_eq!(work, (1..=N).collect::<BTreeSet<_>>());

    let trailer = records.last().unwrap();
    assert_eq!(trailer["message"], TRAILER_MESSAGE);
    assert_eq!(trailer["order_index"], N);
}

#[tokio::test]
async fn concurrent_requests_are_isolated() {
    let out = MemoryWriter::new();
    let app = Arc::new(app(&out));

    let a = {
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            let req = request("/fan-out/20", &[("x-request-id", "a"), ("x-session-id", "sa")]);
            app.handle(req).await
        })
    };
    let b = {
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            let req = request("/fan-out/30", &[("x-request-id", "b"), ("x-session-id", "sb")]);
            app.handle(req).await
        })
    };
    let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
    assert_eq!(ra.body(), b"20");
    assert_eq!(rb.body(), b"30");

    let records = out.records();
    let recs_a = for_request(&records, "a");
    let recs_b = for_request(&records, "b");
    assert_eq!(recs_a.len(), 21);
    assert_eq!(recs_b.len(), 31);
    assert!(recs_a.iter().all(|r| r["session_id"] == "sa"));
    assert!(recs_b.iter().all(|r| r["session_id"] == "sb"));

    let idx = |recs: &[&Value]| -> BTreeSet<u64> {
        recs.iter()
            .filter(|r| r["message"] == "work")
            .map(|r| r["order_index"].as_u64().unwrap())
            .collect()
    };
    assert_eq!(idx(&recs_a), (1..=20).collect::<BTreeSet<_>>());
    assert_eq!(idx(&recs_b), (1..=30).collect::<BTreeSet<_>>());
}

#[tokio::test]
async fn sequential_requests_start_from_zero() {
    let out = MemoryWriter::new();
    let app = app(&out);
    app.handle(request("/chatty", &[("x-request-id", "first")])).await;
    app.handle(request("/chatty", &[("x-request-id", "second")])).await;

    let records = out.records();
    for id in ["first", "second"] {
        let indices: Vec<u64> = for_request(&records, id)
            .iter()
            .map(|r| r["order_index"].as_u64().unwrap())
            .collect();
        assert_eq!(indices, [0, 1, 2, 3], "request {id}");
    }
}

#[tokio::test]
async fn unrouted_request_is_logged_too() {
    let out = MemoryWriter::new();
    let res = app(&out).handle(request("/nope", &[("x-test-id", "t1")])).await;

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    let records = out.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["message"], TRAILER_MESSAGE);
    assert_eq!(records[0]["test_id"], "t1");
}

#[tokio::test]
async fn handler_without_middleware_sees_no_logger() {
    let app = Router::new().get("/", |req: Request| async move {
        match request_logger(&req) {
            Some(_) => "found",
            None => "absent",
        }
    });
    let res = app.handle(request("/", &[])).await;
    assert_eq!(res.body(), b"absent");
}

#[tokio::test]
async fn cancelled_request_gets_no_trailer() {
    let out = MemoryWriter::new();
    let app = app(&out);

    let handling = app.handle(request("/slow", &[]));
    let res = tokio::time::timeout(Duration::from_millis(50), handling).await;
    assert!(res.is_err(), "slow handler should have been cut off");

    let records = out.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["message"], "started");
    assert_eq!(records[0]["order_index"], 0);
}

#[tokio::test]
async fn panicking_handler_gets_no_trailer() {
    let out = MemoryWriter::new();
    let app = Arc::new(app(&out));

    let task = {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.handle(request("/boom", &[])).await })
    };
    let err = task.await.unwrap_err();
    assert!(err.is_panic());

    assert_eq!(messages(&out), ["started"]);

    // The router is still usable and later requests are logged normally.
    app.handle(request("/quiet", &[])).await;
    assert_eq!(messages(&out), ["started", TRAILER_MESSAGE]);
}
