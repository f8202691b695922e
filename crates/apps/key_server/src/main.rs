use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Serves the Maps API key and the campus client")]
struct Config {
    /// Address to listen on.
    #[arg(long, env = "KEY_SERVER_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Maps JavaScript API key handed to the client.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: ApiKey,

    /// Origins allowed to fetch the key, comma separated.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Directory served for every other path.
    #[arg(long, env = "STATIC_DIR", default_value = "client")]
    static_dir: PathBuf,
}

/// The key never shows up in logs or `Debug` output.
#[derive(Clone)]
struct ApiKey(String);

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug)]
enum ServerError {
    EmptyKey,
    Bind(SocketAddr, std::io::Error),
    Serve(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::EmptyKey => write!(f, "API_KEY is empty"),
            ServerError::Bind(addr, err) => write!(f, "cannot listen on {addr}: {err}"),
            ServerError::Serve(err) => write!(f, "server stopped: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

#[derive(Clone)]
struct AppState {
    api_key: ApiKey,
    allowed_origins: Arc<[HeaderValue]>,
}

impl AppState {
    fn new(api_key: ApiKey, origins: &[String]) -> Self {
        let allowed_origins = origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("ignoring malformed origin {origin:?}");
                    None
                }
            })
            .collect();
        Self {
            api_key,
            allowed_origins,
        }
    }

    /// Requests without an `Origin` header, or whose origin is the host
    /// they were sent to, come from the server's own page.
    fn origin_allowed(&self, headers: &HeaderMap) -> bool {
        let Some(origin) = headers.get(header::ORIGIN) else {
            return true;
        };
        same_origin(origin, headers.get(header::HOST)) || self.allowed_origins.contains(origin)
    }
}

fn same_origin(origin: &HeaderValue, host: Option<&HeaderValue>) -> bool {
    let (Ok(origin), Some(Ok(host))) = (origin.to_str(), host.map(HeaderValue::to_str)) else {
        return false;
    };
    origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
        .is_some_and(|authority| authority.eq_ignore_ascii_case(host))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyResponse<'a> {
    api_key: &'a str,
}

fn router(state: AppState, static_dir: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.allowed_origins.iter().cloned()))
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/key", get(get_key))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_key(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !state.origin_allowed(&headers) {
        warn!("key request from disallowed origin {:?}", headers.get(header::ORIGIN));
        return (StatusCode::FORBIDDEN, "origin not allowed").into_response();
    }
    Json(KeyResponse {
        api_key: &state.api_key.0,
    })
    .into_response()
}

async fn run(config: Config) -> Result<(), ServerError> {
    if config.api_key.0.trim().is_empty() {
        return Err(ServerError::EmptyKey);
    }
    if config.allowed_origins.is_empty() {
        warn!("no allowed origins configured, cross-origin key requests will be refused");
    }

    let state = AppState::new(config.api_key, &config.allowed_origins);
    let app = router(state, config.static_dir.clone());

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|err| ServerError::Bind(config.addr, err))?;
    info!(
        "key server listening on http://{} serving {}",
        config.addr,
        config.static_dir.display()
    );
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::parse();
    if let Err(err) = run(config).await {
        error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use http::Request;
    use tower::ServiceExt;

    const ORIGIN: &str = "http://localhost:5173";

    fn app() -> Router {
        let state = AppState::new(ApiKey::from("secret".to_string()), &[ORIGIN.to_string()]);
        router(state, PathBuf::from("client"))
    }

    fn key_request(origin: Option<&str>) -> Request<Body> {
        let mut request = Request::builder().uri("/api/key");
        if let Some(origin) = origin {
            request = request.header(header::ORIGIN, origin);
        }
        request.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn key_is_served_as_json() {
        let response = app().oneshot(key_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "apiKey": "secret" }));
    }

    #[tokio::test]
    async fn disallowed_origin_is_refused() {
        let response = app()
            .oneshot(key_request(Some("https://evil.example")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("secret"));
    }

    #[tokio::test]
    async fn allowed_origin_gets_cors_headers() {
        let response = app().oneshot(key_request(Some(ORIGIN))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            ORIGIN
        );
    }

    #[tokio::test]
    async fn page_served_by_this_server_gets_the_key() {
        let config = Config::try_parse_from(["key_server", "--api-key", "k"]).unwrap();
        let state = AppState::new(config.api_key, &config.allowed_origins);
        let app = router(state, config.static_dir);

        let host = config.addr.to_string();
        let request = Request::builder()
            .uri("/api/key")
            .header(header::HOST, host.as_str())
            .header(header::ORIGIN, format!("http://{host}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn foreign_origin_is_refused_even_with_matching_port() {
        let request = Request::builder()
            .uri("/api/key")
            .header(header::HOST, "127.0.0.1:8080")
            .header(header::ORIGIN, "http://evil.example:8080")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn missing_static_file_is_not_found() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/no-such-file.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn blank_and_malformed_origins_are_dropped() {
        let state = AppState::new(
            ApiKey::from("k".to_string()),
            &[" ".to_string(), "bad\norigin".to_string(), ORIGIN.to_string()],
        );
        assert_eq!(state.allowed_origins.len(), 1);
    }

    #[test]
    fn debug_output_hides_the_key() {
        let key = ApiKey::from("super-secret".to_string());
        let printed = format!("{key:?}");
        assert!(!printed.contains("super-secret"));
        assert_eq!(printed, "ApiKey(<redacted>)");
    }

    #[test]
    fn config_parses_origin_list() {
        let config = Config::try_parse_from([
            "key_server",
            "--api-key",
            "abc",
            "--allowed-origins",
            "http://a.test,http://b.test",
        ])
        .unwrap();
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.static_dir, PathBuf::from("client"));
    }
}
