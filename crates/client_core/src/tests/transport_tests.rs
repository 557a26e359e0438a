use super::*;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use shared::error::MalformedResponse;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
    hits: Arc<AtomicUsize>,
    content_types: Arc<Mutex<Vec<Option<String>>>>,
}

impl ServerState {
    fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
            hits: Arc::new(AtomicUsize::new(0)),
            content_types: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

async fn handle_simulate(State(state): State<ServerState>, headers: HeaderMap) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.content_types.lock().await.push(
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

async fn spawn_simulation_server(state: ServerState, prefix: &str) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route(&format!("{prefix}/simulate"), get(handle_simulate))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}{prefix}"))
}

fn client_for(base_url: &str) -> HttpSimulationClient {
    HttpSimulationClient::new(&ClientSettings::default().with_base_url(base_url))
        .expect("client")
}

const SUCCESS_BODY: &str = r#"{"error":false,"probabilities":{"Max Verstappen":55.5,"Lando Norris":44.5},"simulationsRun":1000,"remainingRaces":2}"#;

#[test]
fn construction_fails_fast_without_base_url() {
    let err = HttpSimulationClient::new(&ClientSettings::default())
        .err()
        .expect("missing base url must fail");
    assert!(matches!(err, ConfigError::MissingBaseUrl { .. }));

    let err = HttpSimulationClient::new(&ClientSettings::default().with_base_url("   "))
        .err()
        .expect("blank base url must fail");
    assert!(matches!(err, ConfigError::MissingBaseUrl { .. }));
}

#[test]
fn construction_rejects_unusable_base_urls() {
    for base in ["not a url", "ftp://example.com", "http://example.com/?x=1"] {
        let err = HttpSimulationClient::new(&ClientSettings::default().with_base_url(base))
            .err()
            .expect("invalid base url must fail");
        assert!(
            matches!(err, ConfigError::InvalidBaseUrl { .. }),
            "unexpected error for {base}: {err}"
        );
    }
}

#[test]
fn simulate_path_is_appended_to_base_path() {
    assert_eq!(
        simulate_endpoint(Some("http://localhost:8080/api/v1")).expect("url").as_str(),
        "http://localhost:8080/api/v1/simulate"
    );
    assert_eq!(
        simulate_endpoint(Some("http://localhost:8080/api/v1/")).expect("url").as_str(),
        "http://localhost:8080/api/v1/simulate"
    );
    assert_eq!(
        simulate_endpoint(Some("https://redline.example")).expect("url").as_str(),
        "https://redline.example/simulate"
    );
}

#[tokio::test]
async fn fetches_and_classifies_success_payload() {
    let state = ServerState::new(StatusCode::OK, SUCCESS_BODY);
    let content_types = state.content_types.clone();
    let base = spawn_simulation_server(state, "/api/v1").await.expect("server");

    let result = client_for(&base).fetch_simulation().await.expect("fetch");

    match result {
        SimulationResult::Success {
            probabilities,
            simulations_run,
            remaining_races,
        } => {
            assert_eq!(probabilities.get("Max Verstappen"), Some(55.5));
            assert_eq!(probabilities.get("Lando Norris"), Some(44.5));
            assert_eq!(simulations_run, 1000);
            assert_eq!(remaining_races, 2);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert_eq!(
        content_types.lock().await.as_slice(),
        [Some("application/json".to_string())]
    );
}

#[tokio::test]
async fn application_error_travels_over_http_200() {
    let state = ServerState::new(
        StatusCode::OK,
        r#"{"error":true,"message":"Missing data or season ended."}"#,
    );
    let base = spawn_simulation_server(state, "").await.expect("server");

    let result = client_for(&base).fetch_simulation().await.expect("fetch");
    assert_eq!(
        result,
        SimulationResult::Failure {
            message: "Missing data or season ended.".to_string()
        }
    );
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let state = ServerState::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":true,"message":"boom"}"#,
    );
    let hits = state.hits.clone();
    let base = spawn_simulation_server(state, "").await.expect("server");

    let err = client_for(&base)
        .fetch_simulation()
        .await
        .expect_err("status must fail");
    assert_eq!(err, FetchError::Status { status: 500 });
    assert_eq!(hits.load(Ordering::SeqCst), 1, "no internal retry");
}

#[tokio::test]
async fn unparsable_body_is_malformed() {
    let state = ServerState::new(StatusCode::OK, "<html>gateway</html>");
    let base = spawn_simulation_server(state, "").await.expect("server");

    let err = client_for(&base)
        .fetch_simulation()
        .await
        .expect_err("body must fail");
    assert!(matches!(
        err,
        FetchError::Malformed(MalformedResponse::InvalidJson(_))
    ));
    assert!(err.is_malformed());
}

#[tokio::test]
async fn slow_server_times_out() {
    let state = ServerState::new(StatusCode::OK, SUCCESS_BODY).with_delay(Duration::from_secs(5));
    let base = spawn_simulation_server(state, "").await.expect("server");

    let settings = ClientSettings::default()
        .with_base_url(&base)
        .with_request_timeout(Duration::from_millis(200));
    let client = HttpSimulationClient::new(&settings).expect("client");

    let err = client.fetch_simulation().await.expect_err("must time out");
    assert_eq!(err, FetchError::Timeout(Duration::from_millis(200)));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client_for(&format!("http://{addr}"))
        .fetch_simulation()
        .await
        .expect_err("connection must fail");
    assert_eq!(err.kind(), "network");
}
