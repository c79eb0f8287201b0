//! # panther-exec
//!
//! Client side of the Panther exec endpoint.
//!
//! - [`session`]: one WebSocket connection in `scan` or `cmd` mode, with a
//!   fan-out result stream and close classification
//! - [`factory`]: builds sessions against a configured endpoint
//! - [`dispatch`]: folds `cmd` results for one order into phases and a transcript
//! - [`scan`]: the scan table, severity partitions, and remediation
//!
//! ```text
//!   SessionFactory ──► Session<M> ──connect()──► ExecChannel<M>
//!                                                  │ send(Order)
//!                                                  │ subscribe() ──► Subscription
//!                                                  ▼
//!                       CommandDispatch / ScanBoard consume the stream
//! ```

#![deny(unsafe_code)]

pub mod dispatch;
pub mod errors;
pub mod factory;
pub mod mode;
pub mod observer;
pub mod scan;
pub mod session;

pub use dispatch::{CommandDispatch, CommandPhase, DispatchReport, TranscriptLine};
pub use errors::SessionError;
pub use factory::SessionFactory;
pub use mode::{Cmd, ExecMode, Scan};
pub use observer::{CloseOutcome, SessionObserver, TracingObserver};
pub use scan::{RemediationPlan, ScanBoard, SeverityBreakdown, remediate};
pub use session::{BACKLOG_LIMIT, ExecChannel, Session, SessionState, Subscription};
