//! Loopback exec endpoint for session tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use panther_exec::{CloseOutcome, SessionError, SessionFactory, SessionObserver};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use url::Url;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub type ServerWs = WebSocketStream<TcpStream>;

/// A WebSocket server on 127.0.0.1 that hands each accepted connection and
/// its request URI to `handler`.
pub struct TestServer {
    pub addr: SocketAddr,
    accepted: Arc<AtomicUsize>,
    uris: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub async fn start<H, Fut>(handler: H) -> Self
    where
        H: Fn(String, ServerWs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let uris = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let server_accepted = Arc::clone(&accepted);
        let server_uris = Arc::clone(&uris);
        let _ = tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                let _ = server_accepted.fetch_add(1, Ordering::SeqCst);
                let handler = Arc::clone(&handler);
                let uris = Arc::clone(&server_uris);
                let _ = tokio::spawn(async move {
                    let slot = Arc::new(Mutex::new(String::new()));
                    let record = Arc::clone(&slot);
                    let callback = move |req: &Request,
                                         resp: Response|
                          -> Result<Response, ErrorResponse> {
                        let uri = req.uri().to_string();
                        uris.lock().push(uri.clone());
                        *record.lock() = uri;
                        Ok(resp)
                    };
                    let Ok(ws) = accept_hdr_async(tcp, callback).await else {
                        return;
                    };
                    let uri = slot.lock().clone();
                    handler(uri, ws).await;
                });
            }
        });

        Self {
            addr,
            accepted,
            uris,
        }
    }

    pub fn exec_url(&self) -> Url {
        Url::parse(&format!("ws://{}/api/v1/exec", self.addr)).unwrap()
    }

    pub fn factory(&self) -> SessionFactory {
        SessionFactory::new(self.exec_url())
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn uris(&self) -> Vec<String> {
        self.uris.lock().clone()
    }
}

/// Decoded query pairs of a request URI such as `/api/v1/exec?mode=cmd`.
pub fn query(uri: &str) -> Vec<(String, String)> {
    Url::parse(&format!("ws://localhost{uri}"))
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

pub fn mode_of(uri: &str) -> String {
    query(uri)
        .into_iter()
        .find(|(k, _)| k == "mode")
        .map(|(_, v)| v)
        .unwrap_or_default()
}

pub async fn send_json(ws: &mut ServerWs, value: &Value) {
    ws.send(Message::Text(value.to_string().into())).await.unwrap();
}

pub async fn close(ws: &mut ServerWs, code: u16, reason: &str) {
    let frame = CloseFrame {
        code: CloseCode::from(code),
        reason: reason.to_string().into(),
    };
    let _ = ws.close(Some(frame)).await;
}

/// Next text frame from the client; `None` once the client closes.
pub async fn next_text(ws: &mut ServerWs) -> Option<String> {
    while let Some(Ok(msg)) = ws.next().await {
        match msg {
            Message::Text(text) => return Some(text.as_str().to_owned()),
            Message::Close(_) => return None,
            _ => {}
        }
    }
    None
}

/// Keep reading until the client goes away.
pub async fn hold(mut ws: ServerWs) {
    while ws.next().await.is_some() {}
}

/// Observer that records every event as a short string.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

impl SessionObserver for RecordingObserver {
    fn opened(&self, mode: &'static str, _url: &Url) {
        self.events.lock().push(format!("opened:{mode}"));
    }

    fn closed(&self, _mode: &'static str, outcome: &CloseOutcome) {
        self.events.lock().push(format!("closed:{outcome}"));
    }

    fn failed(&self, _mode: &'static str, error: &SessionError) {
        self.events.lock().push(format!("failed:{error}"));
    }

    fn malformed(&self, _mode: &'static str, reason: &str) {
        self.events.lock().push(format!("malformed:{reason}"));
    }
}
