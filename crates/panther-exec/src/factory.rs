//! Builds sessions against one exec endpoint.

use std::sync::Arc;

use panther_core::Target;
use url::Url;

use crate::mode::{Cmd, Scan};
use crate::observer::{SessionObserver, TracingObserver};
use crate::session::Session;

/// Creates exec sessions that share an endpoint and an observer.
///
/// Each call returns a fresh, unconnected [`Session`]. The factory holds no
/// connections itself.
#[derive(Clone)]
pub struct SessionFactory {
    endpoint: Url,
    observer: Arc<dyn SessionObserver>,
}

impl SessionFactory {
    /// Factory for `endpoint` (a `ws://` or `wss://` URL) logging through `tracing`.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the lifecycle observer for sessions created from now on.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The exec endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// A scan watch session over `target`.
    pub fn for_scan(&self, target: Target) -> Session<Scan> {
        Session::new(self.endpoint.clone(), target, Arc::clone(&self.observer))
    }

    /// A command execution session.
    pub fn for_cmd(&self) -> Session<Cmd> {
        Session::new(
            self.endpoint.clone(),
            Target::All,
            Arc::clone(&self.observer),
        )
    }
}

impl std::fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFactory")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    fn factory() -> SessionFactory {
        SessionFactory::new(Url::parse("ws://localhost:8080/api/v1/exec").unwrap())
    }

    #[test]
    fn scan_sessions_watch_their_target() {
        let s = factory().for_scan(Target::hosts(["web-1"]));
        assert_eq!(
            s.url().as_str(),
            "ws://localhost:8080/api/v1/exec?mode=scan&watch=web-1"
        );
        assert_eq!(s.state(), SessionState::Unconnected);
    }

    #[test]
    fn cmd_sessions_are_independent() {
        let f = factory();
        let a = f.for_cmd();
        let b = f.for_cmd();
        assert_eq!(a.url(), b.url());
        assert_eq!(a.url().query(), Some("mode=cmd"));
        assert!(a.channel().is_none() && b.channel().is_none());
    }

    #[test]
    fn endpoint_is_kept() {
        assert_eq!(factory().endpoint().path(), "/api/v1/exec");
    }
}
