use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener},
    thread,
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tower_http::cors::{Any, CorsLayer};

use crate::driver::SessionCmd;
use crate::palette::ColorToken;
use crate::session::SessionSnapshot;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub event_id: String,
    #[serde(default)]
    pub color: Option<ColorToken>,
    #[serde(default)]
    pub level: Option<u8>,
}

/// Maps a wire event onto a session command. Ids mirror the session
/// operations one to one; events missing their payload map to nothing.
pub fn event_from_request(request: &EventRequest) -> Option<SessionCmd> {
    match request.event_id.as_str() {
        "startGame" => Some(SessionCmd::StartFromHomepage),
        "startLevel" => request.level.map(SessionCmd::StartLevel),
        "selectLevel" => request.level.map(SessionCmd::SelectLevel),
        "click" => request.color.map(SessionCmd::Click),
        "continueToNextLevel" => Some(SessionCmd::ContinueToNextLevel),
        "retryLevel" => Some(SessionCmd::RetryLevel),
        "returnToHomepage" => Some(SessionCmd::ReturnToHomepage),
        "reset" => Some(SessionCmd::Reset),
        _ => None,
    }
}

#[derive(Clone)]
struct ApiState {
    tx: mpsc::UnboundedSender<SessionCmd>,
}

async fn health() -> &'static str {
    "ok"
}

async fn request_snapshot(
    tx: &mpsc::UnboundedSender<SessionCmd>,
) -> Result<SessionSnapshot, (StatusCode, String)> {
    let (respond, rx) = oneshot::channel();
    tx.send(SessionCmd::Snapshot { respond }).map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "session command channel closed".to_string(),
        )
    })?;

    match tokio::time::timeout(Duration::from_secs(2), rx).await {
        Ok(Ok(snapshot)) => Ok(snapshot),
        Ok(Err(_)) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "session did not respond".to_string(),
        )),
        Err(_) => Err((StatusCode::GATEWAY_TIMEOUT, "session timed out".to_string())),
    }
}

async fn session_state(
    State(state): State<ApiState>,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    let snapshot = request_snapshot(&state.tx).await?;
    Ok(Json(snapshot))
}

async fn session_event(
    State(state): State<ApiState>,
    Json(payload): Json<EventRequest>,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    let Some(cmd) = event_from_request(&payload) else {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("unknown or incomplete event: {}", payload.event_id),
        ));
    };

    state.tx.send(cmd).map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "session command channel closed".to_string(),
        )
    })?;

    // Commands are processed in order, so this snapshot observes the event.
    let snapshot = request_snapshot(&state.tx).await?;
    Ok(Json(snapshot))
}

pub fn router(tx: mpsc::UnboundedSender<SessionCmd>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/session/state", get(session_state))
        .route("/api/session/event", post(session_event))
        .with_state(ApiState { tx })
        .layer(cors)
}

pub struct HostServer {
    shutdown: Option<oneshot::Sender<()>>,
    pub addr: SocketAddr,
}

impl HostServer {
    /// Binds synchronously (fail fast on a taken port) and serves on a
    /// dedicated runtime thread until shutdown.
    pub fn start(port: u16, tx: mpsc::UnboundedSender<SessionCmd>) -> io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
        let std_listener = TcpListener::bind(addr)?;
        std_listener.set_nonblocking(true)?;
        let addr = std_listener.local_addr()?;

        thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().expect("host api tokio runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(std_listener)
                    .expect("host api listener should convert");
                let app = router(tx);

                let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });

                if let Err(err) = serve.await {
                    tracing::error!(%err, "host api server error");
                }
            });
        });

        Ok(Self {
            shutdown: Some(shutdown_tx),
            addr,
        })
    }

    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::announcer::NullAnnouncer;
    use crate::clock::ManualClock;
    use crate::driver;
    use crate::phase::GamePhase;
    use crate::session::GameSession;

    fn rig() -> (Router, tokio::task::JoinHandle<GameSession>) {
        let (tx, rx) = driver::channel();
        let handle = tokio::spawn(driver::run_session_loop(
            GameSession::new(7),
            ManualClock::default(),
            Arc::new(NullAnnouncer),
            rx,
        ));
        (router(tx), handle)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let (app, _handle) = rig();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn state_reports_the_homepage_snapshot() {
        let (app, _handle) = rig();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/session/state")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["phase"], "homepage");
        assert_eq!(body["level"], 1);
        assert_eq!(body["unlockedLevels"], serde_json::json!([1]));
    }

    #[tokio::test]
    async fn start_level_event_enters_playing() {
        let (app, _handle) = rig();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/session/event")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"eventId":"startLevel","level":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["phase"], "playing");
        assert_eq!(body["roundIndex"], 0);
        assert_eq!(body["board"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_event_is_rejected() {
        let (app, _handle) = rig();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/session/event")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"eventId":"doesNotExist"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn click_event_without_color_is_rejected() {
        let (app, _handle) = rig();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/session/event")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"eventId":"click"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn phase_serializes_to_wire_names() {
        let json = serde_json::to_value(GamePhase::Homepage).unwrap();
        assert_eq!(json, serde_json::json!("homepage"));
    }
}
