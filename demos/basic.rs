//! Minimal seqlog example: request-scoped, order-indexed JSON logs.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -H 'X-Session-Id: s1' -H 'X-Request-Id: r1' http://localhost:3000/users/42
//!   curl -X POST -H 'X-Test-Id: t7' http://localhost:3000/users -d '{"name":"alice"}'
//!   curl http://localhost:3000/fan-out
//!
//! Each request prints its records to stdout, closed by `end-of-request`.

use std::sync::Arc;

use http::StatusCode;
use seqlog::{
    Attr, Level, Request, RequestLogging, Response, Router, SequencedLogger, Server,
    request_logger,
};

#[tokio::main]
async fn main() {
    // Server diagnostics go to stderr so they don't mix with the JSON lines.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let app = Router::new()
        .get("/users/{id}", get_user)
        .post("/users", create_user)
        .get("/fan-out", fan_out)
        .layer(RequestLogging::new());

    if let Err(e) = Server::bind("0.0.0.0:3000").serve(app).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown").to_owned();
    if let Some(log) = request_logger(&req) {
        log.info("loading user", &[Attr::new("id", id.as_str())]);
        log.debug("cache miss", &[]);
    }
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// POST /users
async fn create_user(req: Request) -> Response {
    let log = request_logger(&req);
    if req.body().is_empty() {
        if let Some(log) = &log {
            log.warn("empty body", &[]);
        }
        return Response::status(StatusCode::BAD_REQUEST);
    }

    if let Some(log) = &log {
        log.log(Level::INFO, "user created", &[Attr::new("bytes", req.body().len())]);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#.to_owned().into_bytes())
}

// GET /fan-out: lines reach stdout in any order; order_index restores it.
async fn fan_out(req: Request) -> Response {
    let Some(log) = request_logger(&req) else {
        return Response::status(StatusCode::INTERNAL_SERVER_ERROR);
    };

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let log: Arc<SequencedLogger> = Arc::clone(&log);
            tokio::spawn(async move {
                log.log(Level::INFO, "worker done", &[Attr::new("worker", worker)]);
            })
        })
        .collect();
    for w in workers {
        if let Err(e) = w.await {
            tracing::warn!("fan-out worker failed: {e}");
        }
    }

    Response::text("done")
}
