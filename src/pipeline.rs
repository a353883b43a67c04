//! Two-phase pipeline controller
//!
//! Drives the crew engine for one session: recommendations first, then an
//! itinerary for the stay the operator picked. Each phase is exactly one
//! kickoff. The caller holds the session exclusively for the whole call.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::engine::{AgentEngine, Crew, KickoffRequest};
use crate::models::{EngineOutput, ItineraryRequest, TravelRequest, TripLength};
use crate::session::PlannerSession;
use crate::{PlannerError, Result};

pub struct PipelineController {
    engine: Arc<dyn AgentEngine>,
    verbose: bool,
}

impl PipelineController {
    pub fn new(engine: Arc<dyn AgentEngine>, verbose: bool) -> Self {
        Self { engine, verbose }
    }

    /// "Submit Query": intent mapping and recommendation finding
    #[instrument(skip(self, session, request), fields(session = %session.id()))]
    pub async fn submit_query(
        &self,
        session: &mut PlannerSession,
        request: TravelRequest,
    ) -> Result<EngineOutput> {
        let prior = session.begin_recommendations(&request)?;
        info!(
            "Running crew to map intent and find recommendations for '{}'",
            request.user_query
        );

        let kickoff = KickoffRequest {
            crew: Crew::recommendations(),
            inputs: request.engine_inputs(),
            verbose: self.verbose,
        };

        let start_time = Instant::now();
        match self.engine.kickoff(kickoff).await {
            Ok(output) => {
                info!(
                    "Recommendations ready in {:.3}s",
                    start_time.elapsed().as_secs_f64()
                );
                session.complete_recommendations(request, output.clone());
                Ok(output)
            }
            Err(e) => {
                warn!("Recommendation crew failed: {}", e);
                session.abort(prior);
                Err(e.into())
            }
        }
    }

    /// "Get Itinerary": itinerary creation for the selected stay
    #[instrument(skip(self, session, stay), fields(session = %session.id()))]
    pub async fn request_itinerary(
        &self,
        session: &mut PlannerSession,
        stay: &str,
        days: Option<TripLength>,
    ) -> Result<EngineOutput> {
        let (selection, prior) = session.begin_itinerary(stay, days)?;

        // recommendations always come with the request that produced them
        let inputs = match session.request() {
            Some(trip) => ItineraryRequest {
                selection: &selection,
                trip,
            }
            .engine_inputs(),
            None => {
                session.abort(prior);
                return Err(PlannerError::general(
                    "Session has recommendations but no travel request",
                ));
            }
        };

        let kickoff = KickoffRequest {
            crew: Crew::itinerary(),
            inputs,
            verbose: self.verbose,
        };
        info!(
            "Running crew to build a {}-day itinerary around '{}'",
            selection.days.days(),
            selection.stay
        );

        let start_time = Instant::now();
        match self.engine.kickoff(kickoff).await {
            Ok(output) => {
                info!(
                    "Itinerary ready in {:.3}s",
                    start_time.elapsed().as_secs_f64()
                );
                session.complete_itinerary(selection, output.clone());
                Ok(output)
            }
            Err(e) => {
                warn!("Itinerary crew failed: {}", e);
                session.abort(prior);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::ScriptedEngine;
    use crate::engine::{AgentId, TaskId};
    use crate::models::request::fixtures::la_trip;
    use crate::session::Phase;
    use serde_json::json;
    use uuid::Uuid;

    fn controller(engine: &Arc<ScriptedEngine>) -> PipelineController {
        PipelineController::new(engine.clone(), true)
    }

    #[tokio::test]
    async fn test_empty_query_never_reaches_engine() {
        let engine = Arc::new(ScriptedEngine::new().reply("unused"));
        let mut session = PlannerSession::new(Uuid::new_v4());
        let mut request = la_trip();
        request.user_query = String::new();

        let err = controller(&engine)
            .submit_query(&mut session, request)
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::Validation { .. }));
        assert!(engine.calls().is_empty());
        assert!(session.recommendations().is_none());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_submit_dispatches_one_recommendation_kickoff() {
        let engine = Arc::new(ScriptedEngine::new().reply("Hotel A\nHotel B"));
        let mut session = PlannerSession::new(Uuid::new_v4());

        let output = controller(&engine)
            .submit_query(&mut session, la_trip())
            .await
            .unwrap();

        assert_eq!(output.as_str(), "Hotel A\nHotel B");
        let calls = engine.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].crew.tasks,
            vec![TaskId::IntentMapping, TaskId::FindingRecommendations]
        );
        assert_eq!(calls[0].crew.agents, vec![AgentId::IntentMapper, AgentId::Finder]);
        assert_eq!(calls[0].inputs, la_trip().engine_inputs());
        assert_eq!(session.recommendations().unwrap().as_str(), "Hotel A\nHotel B");
    }

    #[tokio::test]
    async fn test_engine_failure_keeps_prior_state() {
        let engine = Arc::new(ScriptedEngine::new().reply("Hotel A").fail("model overloaded"));
        let mut session = PlannerSession::new(Uuid::new_v4());
        let pipeline = controller(&engine);

        pipeline.submit_query(&mut session, la_trip()).await.unwrap();

        let mut second = la_trip();
        second.user_query = "Somewhere else".to_string();
        let err = pipeline.submit_query(&mut session, second).await.unwrap_err();

        assert!(matches!(err, PlannerError::Engine { .. }));
        assert_eq!(session.phase(), Phase::RecommendationsReady);
        assert_eq!(session.recommendations().unwrap().as_str(), "Hotel A");
        assert_eq!(session.user_query(), "Ahmedabad to Los Angeles for 5 days");
    }

    #[tokio::test]
    async fn test_itinerary_gate_blocks_engine_call() {
        let engine = Arc::new(ScriptedEngine::new().reply("Hotel A"));
        let mut session = PlannerSession::new(Uuid::new_v4());
        let pipeline = controller(&engine);
        pipeline.submit_query(&mut session, la_trip()).await.unwrap();

        let err = pipeline
            .request_itinerary(&mut session, "", Some(TripLength::default()))
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::Validation { .. }));
        assert_eq!(engine.calls().len(), 1);
        assert!(session.itinerary().is_none());
        assert_eq!(session.phase(), Phase::RecommendationsReady);
    }

    #[tokio::test]
    async fn test_itinerary_kickoff_excludes_query() {
        let engine = Arc::new(ScriptedEngine::new().reply("Hotel A\nHotel B").reply("Day 1"));
        let mut session = PlannerSession::new(Uuid::new_v4());
        let pipeline = controller(&engine);
        pipeline.submit_query(&mut session, la_trip()).await.unwrap();

        let itinerary = pipeline
            .request_itinerary(&mut session, "Hotel A", Some(TripLength::new(5).unwrap()))
            .await
            .unwrap();

        assert_eq!(itinerary.as_str(), "Day 1");
        let calls = engine.calls();
        assert_eq!(calls.len(), 2);
        let second = &calls[1];
        assert_eq!(second.crew.tasks, vec![TaskId::CreatingItinerary]);
        assert_eq!(second.crew.agents, vec![AgentId::ItineraryMaker]);
        assert_eq!(second.inputs["user_selected_stay"], "Hotel A");
        assert_eq!(second.inputs["days"], 5);
        assert_eq!(second.inputs["amenities"], json!(["Pool", "Gym"]));
        assert!(!second.inputs.contains_key("user_query"));
        assert_eq!(session.phase(), Phase::ItineraryReady);
    }

    #[tokio::test]
    async fn test_itinerary_failure_stores_nothing() {
        let engine = Arc::new(ScriptedEngine::new().reply("Hotel A").fail("timeout"));
        let mut session = PlannerSession::new(Uuid::new_v4());
        let pipeline = controller(&engine);
        pipeline.submit_query(&mut session, la_trip()).await.unwrap();

        let result = pipeline
            .request_itinerary(&mut session, "Hotel A", Some(TripLength::default()))
            .await;

        assert!(result.is_err());
        assert_eq!(session.phase(), Phase::RecommendationsReady);
        assert!(session.selection().is_none());
        assert!(session.itinerary().is_none());
    }
}
