//! End-to-end tests for the HTTP boundary over a real loopback listener.

use std::net::SocketAddr;
use std::time::Duration;

use hashq::api::{CreateResponse, ErrorResponse, Server, ShutdownResponse, StatsResponse};
use hashq::config::EngineConfig;
use hashq::engine::HashService;
use reqwest::StatusCode;
use tokio::task::JoinHandle;

const ANGRY_MONKEY: &str =
    "ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzpM2wy1mtVSoI9TxJt4FK5TnFf9LgNwBfZLOBF/TD2Cq2VLA==";

const MIN_DELAY: Duration = Duration::from_millis(300);

struct TestServer {
    base: String,
    service: HashService,
    task: JoinHandle<hashq::error::Result<()>>,
}

async fn spawn_server() -> TestServer {
    let service = HashService::start(EngineConfig {
        min_delay: MIN_DELAY,
        idle_backoff: Duration::from_millis(20),
    });
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let server = Server::bind(addr, service.clone(), Duration::from_secs(2))
        .await
        .expect("bind");
    let base = format!("http://{}", server.local_addr().unwrap());
    let task = tokio::spawn(server.run());
    TestServer {
        base,
        service,
        task,
    }
}

async fn submit(client: &reqwest::Client, base: &str, password: &str) -> CreateResponse {
    let resp = client
        .post(format!("{base}/hash"))
        .form(&[("password", password)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

// ---------------------------------------------------------------------------
// /hash
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_then_fetch_digest() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();

    let created = submit(&client, &srv.base, "angryMonkey").await;
    assert_eq!(created.request_id.0, 1);

    let early = client
        .get(format!("{}/hash/1", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(early.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = early.json().await.unwrap();
    assert!(body.error.starts_with("Hash password not found for 1."));

    tokio::time::sleep(MIN_DELAY * 2).await;

    let ready = client
        .get(format!("{}/hash/1", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
    let digest: String = ready.json().await.unwrap();
    assert_eq!(digest, ANGRY_MONKEY);
}

#[tokio::test]
async fn create_response_uses_request_id_key() {
    let srv = spawn_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/hash", srv.base))
        .form(&[("password", "abc")])
        .send()
        .await
        .unwrap();
    let raw: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(raw, serde_json::json!({ "RequestId": 1 }));
}

#[tokio::test]
async fn password_in_query_string_is_accepted() {
    let srv = spawn_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/hash?password=fromquery", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(srv.service.pending(), 1);
}

#[tokio::test]
async fn missing_password_is_rejected() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();

    for resp in [
        client.post(format!("{}/hash", srv.base)).send().await.unwrap(),
        client
            .post(format!("{}/hash", srv.base))
            .form(&[("password", "")])
            .send()
            .await
            .unwrap(),
    ] {
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = resp.json().await.unwrap();
        assert_eq!(body.error, "'password' parameter is required.");
    }

    assert_eq!(srv.service.last_issued(), 0);
}

#[tokio::test]
async fn unknown_or_malformed_id_is_not_found() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();

    for path in ["/hash/42", "/hash/not-a-number"] {
        let resp = client
            .get(format!("{}{path}", srv.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let srv = spawn_server().await;
    let resp = reqwest::get(format!("{}/nope", srv.base)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// /stats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stats_start_at_zero() {
    let srv = spawn_server().await;
    let resp = reqwest::get(format!("{}/stats", srv.base)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let stats: StatsResponse = resp.json().await.unwrap();
    assert_eq!(stats.total, "0");
    assert_eq!(stats.average, "0");
}

#[tokio::test]
async fn stats_reflect_completed_jobs() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();
    submit(&client, &srv.base, "one").await;
    submit(&client, &srv.base, "two").await;

    tokio::time::sleep(MIN_DELAY * 2).await;

    let stats: StatsResponse = reqwest::get(format!("{}/stats", srv.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.total, "2");
    assert_eq!(
        stats.average,
        srv.service.stats().average_micros.to_string()
    );
}

// ---------------------------------------------------------------------------
// /shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_drains_then_stops_listener() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();
    let created = submit(&client, &srv.base, "angryMonkey").await;

    let resp = client
        .post(format!("{}/shutdown", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ShutdownResponse = resp.json().await.unwrap();
    assert_eq!(body.status, "stopped");

    // Drained before the response was sent.
    assert_eq!(srv.service.lookup(created.request_id).unwrap(), ANGRY_MONKEY);

    tokio::time::timeout(Duration::from_secs(5), srv.task)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    assert!(matches!(
        srv.service.submit("late"),
        Err(hashq::error::Error::ShuttingDown)
    ));
}

#[tokio::test]
async fn bind_on_taken_address_is_an_io_error() {
    let srv = spawn_server().await;
    let taken: SocketAddr = srv.base.trim_start_matches("http://").parse().unwrap();

    let result = Server::bind(taken, srv.service.clone(), Duration::from_secs(1)).await;
    assert!(matches!(result, Err(hashq::error::Error::Io(_))));

    srv.task.abort();
}

#[tokio::test]
async fn unknown_and_malformed_ids_share_not_found_body() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();

    for id in ["999", "abc"] {
        let resp = client
            .get(format!("{}/hash/{id}", srv.base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = resp.json().await.unwrap();
        assert!(
            body.error
                .starts_with(&format!("Hash password not found for {id}.")),
            "{}",
            body.error
        );
    }

    srv.task.abort();
}
