//! Data models for the travel planner
//!
//! This module contains the core domain models organized by concern:
//! - Vocabulary: fixed amenity and stay-type options, trip length bounds
//! - Request: travel and itinerary requests and the engine's opaque output

pub mod request;
pub mod vocabulary;

// Re-export all public types for convenient access
pub use request::{EngineInputs, EngineOutput, ItineraryRequest, StaySelection, TravelRequest};
pub use vocabulary::{Amenity, StayType, TripLength};
