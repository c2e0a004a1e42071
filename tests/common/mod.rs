//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use raccoon_lam_proxy::config::{ProxyConfig, SecretKey, SecretStore};
use raccoon_lam_proxy::http::{build_router, AppState, HttpServer};
use raccoon_lam_proxy::Shutdown;

pub const SECRET: &str = "sk-raccoon-test";
pub const PASSCODE: &str = "raccoon-1234";

/// A request as seen by a mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Mock LAM API that records every request it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }
}

/// Start a mock upstream that answers every request with a fixed response.
pub async fn start_mock_upstream(status: StatusCode, body: &'static str) -> MockUpstream {
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = recorded.clone();

    let app = Router::new().fallback(move |request: Request| {
        let sink = sink.clone();
        async move {
            let (parts, body_in) = request.into_parts();
            let bytes = axum::body::to_bytes(body_in, usize::MAX).await.unwrap();
            sink.lock().unwrap().push(Recorded {
                method: parts.method,
                path: parts.uri.path().to_string(),
                headers: parts.headers,
                body: bytes,
            });
            (status, body)
        }
    });

    let addr = serve(app).await;
    MockUpstream { addr, recorded }
}

/// Start an upstream whose 200 body is fed chunk by chunk through the
/// returned sender. Dropping the sender ends the body.
pub async fn start_channel_upstream() -> (SocketAddr, mpsc::Sender<Bytes>) {
    let (tx, rx) = mpsc::channel::<Bytes>(8);
    let rx = Arc::new(Mutex::new(Some(rx)));

    let app = Router::new().fallback(move || {
        let rx = rx.lock().unwrap().take();
        async move {
            let Some(rx) = rx else {
                return (StatusCode::GONE, Body::empty());
            };
            let chunks = futures_util::stream::unfold(rx, |mut rx| async move {
                rx.recv()
                    .await
                    .map(|chunk| (Ok::<_, std::io::Error>(chunk), rx))
            });
            (StatusCode::OK, Body::from_stream(chunks))
        }
    });

    (serve(app).await, tx)
}

/// Start an upstream that promises more body than it sends, then hangs up.
pub async fn start_truncating_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let response =
                    "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"ok\"";
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(50)).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Consume one HTTP/1.1 request (head plus `Content-Length` body).
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);

        let Some(head_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&data[..head_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if data.len() >= head_end + 4 + content_length {
            return;
        }
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn config_for(base_url: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = base_url.to_string();
    config.upstream.connect_timeout_secs = Some(2);
    config.upstream.system_proxy = false;
    config
}

pub fn fixed_secret() -> SecretStore {
    SecretStore::fixed(SecretKey::parse(SECRET).unwrap())
}

/// Router wired to `base_url`, for `oneshot` tests.
pub fn proxy_router(base_url: &str, secrets: SecretStore) -> Router {
    build_router(AppState::new(&config_for(base_url), secrets).unwrap())
}

/// A proxy listening on an ephemeral port.
pub struct RunningProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningProxy {
    pub fn run_url(&self, app_name: &str) -> String {
        format!("http://{}/lam/{}/run", self.addr, app_name)
    }
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn spawn_proxy(base_url: &str, secrets: SecretStore) -> RunningProxy {
    let server = HttpServer::new(config_for(base_url), secrets).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningProxy { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
