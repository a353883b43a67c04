//! Agent engine boundary
//!
//! The crew engine runs the actual planning agents. This layer only knows how
//! to name the agents and tasks for each phase, hand over the inputs and take
//! back a block of text.

use std::fmt::{self, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{EngineInputs, EngineOutput};

pub mod http;

pub use http::HttpAgentEngine;

/// Tasks the engine knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskId {
    #[serde(rename = "intent_mapping_task")]
    IntentMapping,
    #[serde(rename = "finding_recommendations_task")]
    FindingRecommendations,
    #[serde(rename = "creating_itinerary_task")]
    CreatingItinerary,
}

impl TaskId {
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            TaskId::IntentMapping => "intent_mapping_task",
            TaskId::FindingRecommendations => "finding_recommendations_task",
            TaskId::CreatingItinerary => "creating_itinerary_task",
        }
    }
}

/// Agents assigned to a crew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentId {
    #[serde(rename = "intent_mapper_agent")]
    IntentMapper,
    #[serde(rename = "finder_agent")]
    Finder,
    #[serde(rename = "itinerary_maker_agent")]
    ItineraryMaker,
}

impl AgentId {
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            AgentId::IntentMapper => "intent_mapper_agent",
            AgentId::Finder => "finder_agent",
            AgentId::ItineraryMaker => "itinerary_maker_agent",
        }
    }
}

/// Ordered agents and tasks for one kickoff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub agents: Vec<AgentId>,
    pub tasks: Vec<TaskId>,
}

impl Crew {
    /// Phase 1: map the traveller's intent, then find matching stays
    #[must_use]
    pub fn recommendations() -> Self {
        Self {
            agents: vec![AgentId::IntentMapper, AgentId::Finder],
            tasks: vec![TaskId::IntentMapping, TaskId::FindingRecommendations],
        }
    }

    /// Phase 2: build a day-by-day itinerary around the selected stay
    #[must_use]
    pub fn itinerary() -> Self {
        Self {
            agents: vec![AgentId::ItineraryMaker],
            tasks: vec![TaskId::CreatingItinerary],
        }
    }
}

impl Display for Crew {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tasks: Vec<&str> = self.tasks.iter().map(|t| t.wire_name()).collect();
        write!(f, "[{}]", tasks.join(" -> "))
    }
}

/// A single crew run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KickoffRequest {
    #[serde(flatten)]
    pub crew: Crew,
    pub inputs: EngineInputs,
    pub verbose: bool,
}

/// Failures surfaced by the engine or the transport to it
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine unreachable: {0}")]
    Transport(String),

    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("engine reply could not be decoded: {0}")]
    InvalidResponse(String),

    #[error("engine failed: {0}")]
    Failed(String),
}

/// The crew engine: takes a crew and its inputs, returns the final text
#[async_trait]
pub trait AgentEngine: Send + Sync {
    async fn kickoff(&self, request: KickoffRequest) -> Result<EngineOutput, EngineError>;
}
