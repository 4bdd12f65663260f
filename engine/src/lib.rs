//! Core engine for Civil - the moderation assistant's state machine and
//! orchestration.
//!
//! The moving parts, leaf-first:
//!
//! - [`Debouncer`] - coalesces bursts of input events into one capture per
//!   quiet period, latest element wins.
//! - [`Session`] - the analysis state machine: what was last sent, what is
//!   pending, whether the next empty capture is a self-induced force-clear.
//! - [`AdvisorySurface`] - owns the single advisory panel and its two
//!   controls.
//! - [`Assistant`] - the event loop tying them to a page, an adapter, and
//!   the classifier client.
//!
//! The pure pieces ([`Session`], panel composition) know nothing about
//! pages or the network; the [`Assistant`] is the only place the pieces
//! meet.

mod assistant;
mod config;
mod debounce;
mod session;
mod surface;

pub use assistant::Assistant;
pub use config::{CivilConfig, ClassifierConfig, ConfigError, analyze_url};
pub use debounce::{Debouncer, QUIET_PERIOD};
pub use session::{CaptureStep, Phase, Session, VerdictStep};
pub use surface::{Activation, AdvisorySurface};

// Re-export the crates a caller wires an assistant from.
pub use civil_adapters::{AdapterRegistry, RegistryError, SiteAdapter};
pub use civil_classifier::{CALLER_ID, ClassifierClient, ClassifyError, DEFAULT_ANALYZE_URL};
pub use civil_page::{HostPage, PageEvent};
pub use civil_types::{Action, Analysis, Decision, Tier};
