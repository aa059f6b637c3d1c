//! Application shell: the navigation session and its lifecycle.
//!
//! A [`Session`] owns everything that changes while navigating. Views and the
//! CLI talk to it only through a [`SessionHandle`], which sends commands and
//! reads the latest [`SessionStatus`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Session task                          │
//! │                                                              │
//! │  PositionSource ──reading──┐                                 │
//! │                            ├──► select! ──► AlertEngine ──►  │
//! │  SessionHandle ──command───┤        │       (banner, voice)  │
//! │                            │        ▼                        │
//! │  CancellationToken ────────┘   HazardStore ──► KeyValueStore │
//! │                                                              │
//! │                   watch::Sender<SessionStatus>               │
//! └──────────────────────────────────────┬───────────────────────┘
//!                                        ▼
//!                          SessionHandle::status() / subscribe()
//! ```
//!
//! # Example
//!
//! ```ignore
//! use travelsafe::app::{AppConfig, Session};
//!
//! let (session, handle) = Session::new(AppConfig::default(), store, provider, sink)?;
//! let task = tokio::spawn(session.run());
//!
//! // Later: graceful shutdown
//! handle.shutdown();
//! let summary = task.await?;
//! ```

mod config;
mod error;
mod session;
mod status;

pub use config::AppConfig;
pub use error::AppError;
pub use session::{Session, SessionCommand, SessionHandle};
pub use status::SessionStatus;
