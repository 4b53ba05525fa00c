//! # caravel-actions: Action Layer for Caravel
//!
//! Every operation the application exposes — catalog CRUD, sale recording,
//! the purchase-request workflow, reporting and identity — implemented as
//! explicit-context methods behind a uniform result envelope.
//!
//! ## The Safe-Action Envelope
//! ```text
//! untrusted input
//!       │
//!       ▼
//! Validate  ──── per-field failures ────►  { fieldErrors: {...} }
//!       │
//!       ▼
//! handler (session check, repositories)
//!       │
//!       ├── business failure ───────────►  { error: "..." }
//!       │
//!       └── success ────────────────────►  { data: ... }
//! ```
//!
//! Handlers never panic or leak internals across this boundary: unexpected
//! failures are logged and surfaced as a generic retry-suggesting message.
//!
//! ## Explicit Caller Identity
//!
//! No operation reads an ambient session. Each takes
//! `Option<&OrgSession>`; `None` yields the unauthenticated error. The
//! [`session::SessionManager`] converts signed tokens into `OrgSession`
//! values at the transport boundary, and tests inject fabricated sessions
//! directly.

pub mod actions;
pub mod config;
pub mod error;
pub mod safe_action;
pub mod session;
pub mod views;

pub use actions::Actions;
pub use config::AppConfig;
pub use error::ActionError;
pub use safe_action::{ActionState, FieldErrors, Validate};
pub use session::{OrgSession, SessionManager};
pub use views::{NoopViewCache, ViewCache};
