//! Exec channel sessions over `tokio-tungstenite`.
//!
//! A [`Session`] makes at most one connection attempt. The first successful
//! [`Session::connect`] spawns a reader task that decodes inbound frames and
//! fans them out to every [`Subscription`]; later calls return the same
//! [`ExecChannel`]. Messages that arrive before anyone subscribes are buffered
//! for the first subscriber, up to [`BACKLOG_LIMIT`] of the newest.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, Stream, StreamExt};
use panther_core::{Order, Target};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::{OnceCell, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};
use url::Url;

use crate::errors::SessionError;
use crate::mode::ExecMode;
use crate::observer::{CloseOutcome, SessionObserver};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Close reason sent by [`ExecChannel::disconnect`].
pub const CLOSE_REASON: &str = "Done.";

/// How long the reader keeps draining after a close frame so the handshake
/// reply reaches the server.
const CLOSE_DRAIN: Duration = Duration::from_secs(1);

/// Messages kept for the first subscriber. Older ones are discarded once a
/// channel that nobody reads from passes this many.
pub const BACKLOG_LIMIT: usize = 64;

/// Connection lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No connection attempt yet.
    Unconnected,
    /// Handshake in flight.
    Connecting,
    /// Frames can be sent and received.
    Open,
    /// The connection ended (or the attempt failed).
    Closed,
}

/// One exec endpoint connection in mode `M`.
pub struct Session<M: ExecMode> {
    endpoint: Url,
    target: Target,
    observer: Arc<dyn SessionObserver>,
    state: Arc<watch::Sender<SessionState>>,
    attempted: AtomicBool,
    channel: OnceCell<ExecChannel<M>>,
}

impl<M: ExecMode> Session<M> {
    /// Create an unconnected session. No I/O happens until [`connect`](Self::connect).
    pub fn new(endpoint: Url, target: Target, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            endpoint,
            target,
            observer,
            state: Arc::new(watch::Sender::new(SessionState::Unconnected)),
            attempted: AtomicBool::new(false),
            channel: OnceCell::new(),
        }
    }

    /// The URL this session dials, including the mode query.
    pub fn url(&self) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            let _ = query.append_pair("mode", M::NAME);
            if let Some(watch) = M::watch(&self.target) {
                let _ = query.append_pair("watch", &watch);
            }
        }
        url
    }

    /// Hosts this session watches.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Open the connection, or return the already-open channel.
    ///
    /// Resolves once the handshake completes. Concurrent callers share one
    /// attempt. After a failed attempt every later call returns
    /// [`SessionError::Spent`].
    pub async fn connect(&self) -> Result<ExecChannel<M>, SessionError> {
        self.channel.get_or_try_init(|| self.open()).await.cloned()
    }

    /// The open channel, if [`connect`](Self::connect) has succeeded.
    pub fn channel(&self) -> Option<&ExecChannel<M>> {
        self.channel.get()
    }

    /// Send an order on the open channel.
    pub async fn send(&self, order: &Order) -> Result<(), SessionError> {
        match self.channel.get() {
            Some(channel) => channel.send(order).await,
            None => Err(SessionError::NotConnected),
        }
    }

    /// Close the channel if one is open. Idempotent.
    ///
    /// Called while a connection attempt is in flight, it waits for the
    /// handshake and then closes, so the attempt never leaves a socket open.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        if let Some(channel) = self.channel.get() {
            return channel.disconnect().await;
        }
        if !self.attempted.load(Ordering::SeqCst) {
            return Ok(());
        }
        match self.connect().await {
            Ok(channel) => channel.disconnect().await,
            Err(_) => Ok(()),
        }
    }

    async fn open(&self) -> Result<ExecChannel<M>, SessionError> {
        if self.attempted.swap(true, Ordering::SeqCst) {
            return Err(SessionError::Spent);
        }

        let url = self.url();
        let _ = self.state.send_replace(SessionState::Connecting);
        debug!(mode = M::NAME, %url, "opening exec session");

        let (ws, _) = match connect_async(url.as_str()).await {
            Ok(pair) => pair,
            Err(e) => {
                let _ = self.state.send_replace(SessionState::Closed);
                let err = SessionError::Connect {
                    url: url.to_string(),
                    message: e.to_string(),
                };
                self.observer.failed(M::NAME, &err);
                return Err(err);
            }
        };

        let _ = self.state.send_replace(SessionState::Open);
        self.observer.opened(M::NAME, &url);

        let (sink, stream) = ws.split();
        let shared = Arc::new(Shared {
            hub: Mutex::new(Hub::new(BACKLOG_LIMIT)),
            state: Arc::clone(&self.state),
            observer: Arc::clone(&self.observer),
        });
        let reader = tokio::spawn(read_loop::<M>(stream, Arc::clone(&shared)));

        Ok(ExecChannel {
            link: Arc::new(Link {
                sink: tokio::sync::Mutex::new(sink),
                shared,
                closing: AtomicBool::new(false),
                reader,
                _mode: PhantomData,
            }),
        })
    }
}

impl<M: ExecMode> std::fmt::Debug for Session<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &M::NAME)
            .field("target", &self.target)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Handle to an open connection. Clones share the connection.
pub struct ExecChannel<M: ExecMode> {
    link: Arc<Link<M>>,
}

impl<M: ExecMode> Clone for ExecChannel<M> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
        }
    }
}

impl<M: ExecMode> std::fmt::Debug for ExecChannel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecChannel")
            .field("mode", &M::NAME)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<M: ExecMode> ExecChannel<M> {
    /// A new stream of decoded results.
    ///
    /// The first subscription also receives what was buffered since the
    /// connection opened (at most [`BACKLOG_LIMIT`] messages). Subscribing after termination yields a stream that
    /// ends at once (after the error, if the connection failed).
    pub fn subscribe(&self) -> Subscription<M::Message> {
        self.link.shared.hub.lock().subscribe()
    }

    /// Serialize `order` and send it as one text frame.
    pub async fn send(&self, order: &Order) -> Result<(), SessionError> {
        if self.state() != SessionState::Open || self.link.closing.load(Ordering::SeqCst) {
            return Err(SessionError::Closed);
        }
        let text = serde_json::to_string(order).map_err(|e| SessionError::Encode {
            message: e.to_string(),
        })?;
        debug!(mode = M::NAME, commands = order.len(), "sending order");
        self.link
            .sink
            .lock()
            .await
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| SessionError::Transport {
                message: e.to_string(),
            })
    }

    /// Close with code 1000 and reason `"Done."`. Idempotent.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        if self.state() != SessionState::Open || self.link.closing.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: CLOSE_REASON.into(),
        };
        match self.link.sink.lock().await.send(Message::Close(Some(frame))).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(SessionError::Transport {
                message: e.to_string(),
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.link.shared.state.borrow()
    }

    /// How the connection ended, once it has ended with a close.
    pub fn close_outcome(&self) -> Option<CloseOutcome> {
        match &self.link.shared.hub.lock().finished {
            Some(Termination::Completed(outcome)) => Some(outcome.clone()),
            _ => None,
        }
    }

    /// Wait until the connection has terminated.
    pub async fn closed(&self) {
        let mut rx = self.link.shared.state.subscribe();
        let _ = rx.wait_for(|s| *s == SessionState::Closed).await;
    }

    /// Whether both handles refer to the same connection.
    pub fn same_channel(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.link, &other.link)
    }
}

/// A stream of decoded results from one channel.
///
/// Yields `Ok` per decoded frame. A transport failure yields one `Err` and
/// then the stream ends; any close ends the stream without an error.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<Result<T, SessionError>>,
}

impl<T> Subscription<T> {
    /// Receive the next item; `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<Result<T, SessionError>> {
        self.rx.recv().await
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Result<T, SessionError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

// ─── Internals ──────────────────────────────────────────────────────────────

struct Link<M: ExecMode> {
    sink: tokio::sync::Mutex<WsSink>,
    shared: Arc<Shared<M::Message>>,
    closing: AtomicBool,
    reader: JoinHandle<()>,
    _mode: PhantomData<M>,
}

impl<M: ExecMode> Drop for Link<M> {
    fn drop(&mut self) {
        if *self.shared.state.borrow() == SessionState::Open
            && !self.closing.load(Ordering::SeqCst)
        {
            warn!(mode = M::NAME, "exec session dropped while open; call disconnect() first");
        }
        self.reader.abort();
    }
}

/// State shared between channel handles and the reader task.
struct Shared<T> {
    hub: Mutex<Hub<T>>,
    state: Arc<watch::Sender<SessionState>>,
    observer: Arc<dyn SessionObserver>,
}

enum Termination {
    Completed(CloseOutcome),
    Failed(SessionError),
}

struct Hub<T> {
    subscribers: Vec<mpsc::UnboundedSender<Result<T, SessionError>>>,
    /// Messages held for the first subscriber; `None` once it has subscribed.
    backlog: Option<VecDeque<T>>,
    limit: usize,
    finished: Option<Termination>,
}

impl<T: Clone> Hub<T> {
    fn new(limit: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            backlog: Some(VecDeque::new()),
            limit,
            finished: None,
        }
    }

    fn subscribe(&mut self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        for message in self.backlog.take().into_iter().flatten() {
            let _ = tx.send(Ok(message));
        }
        match &self.finished {
            None => self.subscribers.push(tx),
            Some(Termination::Failed(err)) => {
                let _ = tx.send(Err(err.clone()));
            }
            Some(Termination::Completed(_)) => {}
        }
        Subscription { rx }
    }

    fn publish(&mut self, message: &T) {
        if let Some(backlog) = &mut self.backlog {
            if backlog.len() == self.limit {
                let _ = backlog.pop_front();
            }
            backlog.push_back(message.clone());
        }
        self.subscribers
            .retain(|tx| tx.send(Ok(message.clone())).is_ok());
    }

    fn finish(&mut self, termination: Termination) {
        if let Termination::Failed(err) = &termination {
            for tx in &self.subscribers {
                let _ = tx.send(Err(err.clone()));
            }
        }
        self.subscribers.clear();
        self.finished = Some(termination);
    }
}

async fn read_loop<M: ExecMode>(mut stream: SplitStream<WsStream>, shared: Arc<Shared<M::Message>>) {
    let mut saw_close = false;
    let termination = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => match M::decode(&text) {
                Ok(message) => shared.hub.lock().publish(&message),
                Err(e) => shared.observer.malformed(M::NAME, &e.to_string()),
            },
            Some(Ok(Message::Binary(_))) => {
                shared.observer.malformed(M::NAME, "binary frame");
            }
            Some(Ok(Message::Close(frame))) => {
                saw_close = true;
                let outcome = match frame {
                    Some(frame) => CloseOutcome::from_code(u16::from(frame.code), frame.reason.as_str()),
                    None => CloseOutcome::from_code(1005, ""),
                };
                break Termination::Completed(outcome);
            }
            Some(Ok(_)) => {}
            Some(Err(
                WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)
                | WsError::ConnectionClosed
                | WsError::AlreadyClosed,
            ))
            | None => break Termination::Completed(CloseOutcome::PeerGone),
            Some(Err(e)) => {
                break Termination::Failed(SessionError::Transport {
                    message: e.to_string(),
                });
            }
        }
    };

    let _ = shared.state.send_replace(SessionState::Closed);
    match &termination {
        Termination::Completed(outcome) => shared.observer.closed(M::NAME, outcome),
        Termination::Failed(err) => shared.observer.failed(M::NAME, err),
    }
    shared.hub.lock().finish(termination);

    if saw_close {
        // Reading past the close frame flushes the handshake reply.
        let _ = tokio::time::timeout(CLOSE_DRAIN, async {
            while stream.next().await.is_some() {}
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{Cmd, Scan};
    use crate::observer::TracingObserver;
    use assert_matches::assert_matches;

    fn session<M: ExecMode>(target: Target) -> Session<M> {
        let url = Url::parse("ws://127.0.0.1:1/api/v1/exec").unwrap();
        Session::new(url, target, Arc::new(TracingObserver))
    }

    #[test]
    fn scan_url_carries_watch_list() {
        let s = session::<Scan>(Target::hosts(["h1", "h2"]));
        let url = s.url();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("mode".to_string(), "scan".to_string()),
                ("watch".to_string(), "h1,h2".to_string()),
            ]
        );
    }

    #[test]
    fn scan_all_watches_wildcard() {
        let url = session::<Scan>(Target::All).url();
        assert!(url.query_pairs().any(|(k, v)| k == "watch" && v == "*"));
    }

    #[test]
    fn cmd_url_has_only_mode() {
        let url = session::<Cmd>(Target::All).url();
        assert_eq!(url.query(), Some("mode=cmd"));
    }

    #[test]
    fn new_session_is_unconnected() {
        let s = session::<Cmd>(Target::All);
        assert_eq!(s.state(), SessionState::Unconnected);
        assert!(s.channel().is_none());
    }

    #[tokio::test]
    async fn send_before_connect_fails() {
        let s = session::<Cmd>(Target::All);
        let order = Order::broadcast(["h1"], "uptime");
        assert_matches!(s.send(&order).await, Err(SessionError::NotConnected));
    }

    #[tokio::test]
    async fn disconnect_before_connect_is_noop() {
        let s = session::<Scan>(Target::All);
        assert!(s.disconnect().await.is_ok());
        assert_eq!(s.state(), SessionState::Unconnected);
    }

    #[test]
    fn backlog_reaches_only_the_first_subscriber() {
        let mut hub = Hub::<u32>::new(BACKLOG_LIMIT);
        hub.publish(&1);
        hub.publish(&2);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        hub.publish(&3);

        assert_eq!(first.rx.try_recv().unwrap(), Ok(1));
        assert_eq!(first.rx.try_recv().unwrap(), Ok(2));
        assert_eq!(first.rx.try_recv().unwrap(), Ok(3));
        assert_eq!(second.rx.try_recv().unwrap(), Ok(3));
        assert!(second.rx.try_recv().is_err());
    }

    #[test]
    fn backlog_keeps_only_the_newest_messages() {
        let mut hub = Hub::<u32>::new(2);
        for n in 1..=5 {
            hub.publish(&n);
        }
        assert_eq!(hub.backlog.as_ref().map(VecDeque::len), Some(2));

        let mut first = hub.subscribe();
        assert_eq!(first.rx.try_recv().unwrap(), Ok(4));
        assert_eq!(first.rx.try_recv().unwrap(), Ok(5));
        assert!(first.rx.try_recv().is_err());
        assert!(hub.backlog.is_none());
    }

    #[test]
    fn backlog_precedes_failure_for_first_subscriber() {
        let mut hub = Hub::<u32>::new(BACKLOG_LIMIT);
        hub.publish(&7);
        let err = SessionError::Transport {
            message: "reset".into(),
        };
        hub.finish(Termination::Failed(err.clone()));

        let mut first = hub.subscribe();
        assert_eq!(first.rx.try_recv().unwrap(), Ok(7));
        assert_eq!(first.rx.try_recv().unwrap(), Err(err));
        assert_matches!(
            first.rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
    }

    #[test]
    fn failure_reaches_every_subscriber_then_ends() {
        let mut hub = Hub::<u32>::new(BACKLOG_LIMIT);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        let err = SessionError::Transport {
            message: "reset".into(),
        };
        hub.finish(Termination::Failed(err.clone()));

        assert_eq!(a.rx.try_recv().unwrap(), Err(err.clone()));
        assert_eq!(b.rx.try_recv().unwrap(), Err(err.clone()));
        assert_matches!(
            a.rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );

        let mut late = hub.subscribe();
        assert_eq!(late.rx.try_recv().unwrap(), Err(err));
        assert_matches!(
            late.rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
    }

    #[test]
    fn completion_ends_streams_without_error() {
        let mut hub = Hub::<u32>::new(BACKLOG_LIMIT);
        let mut a = hub.subscribe();
        hub.finish(Termination::Completed(CloseOutcome::Normal));
        assert_matches!(
            a.rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
        let mut late = hub.subscribe();
        assert_matches!(
            late.rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut hub = Hub::<u32>::new(BACKLOG_LIMIT);
        let first = hub.subscribe();
        drop(first);
        hub.publish(&1);
        assert!(hub.subscribers.is_empty());
    }
}
