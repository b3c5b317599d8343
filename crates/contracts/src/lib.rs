//! # Contracts
//!
//! Shared interface contracts between the streaming crates: the event envelope,
//! decoded camera messages, service configuration, pixel/point containers and
//! the display collaborator traits.
//! Business crates depend on this crate, never the other way round.
//!
//! ## Time Model
//! - Every event carries a list of stamps tagged by semantic role and clock name
//! - Stamps are seconds (f64) on the named clock; `monotonic` is the usual one

mod error;
mod event;
mod grid;
mod message;
mod service_config;
mod sink;
mod uri;

pub use error::*;
pub use event::*;
pub use grid::*;
pub use message::*;
pub use service_config::*;
pub use sink::*;
pub use uri::*;
