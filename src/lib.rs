//! Travel planner
//!
//! A web form in front of a crew of planning agents. The operator describes a
//! trip, gets stay recommendations, picks one, and gets a day-by-day
//! itinerary. All planning happens in the external crew engine; this crate
//! owns the form, the per-session state machine and the two engine calls.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod form;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod web;

// Re-export core types for public API
pub use config::PlannerConfig;
pub use engine::{AgentEngine, Crew, EngineError, HttpAgentEngine, KickoffRequest};
pub use error::PlannerError;
pub use form::{FormOptions, StayForm, TravelForm};
pub use models::{Amenity, EngineOutput, StaySelection, StayType, TravelRequest, TripLength};
pub use pipeline::PipelineController;
pub use session::{Phase, PlannerSession, SessionId};
pub use store::SessionStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlannerError>;
