//! Planning session state
//!
//! A session walks through two engine phases with a human decision in
//! between:
//!
//! ```text
//! Idle -> AwaitingRecommendations -> RecommendationsReady
//!      -> AwaitingItinerary -> ItineraryReady
//! ```
//!
//! The awaiting phases only exist while an engine call is in flight. A failed
//! call puts the session back into the phase it had before the call and
//! stores nothing. The guards below are pure functions over the session so
//! they can be checked without an engine.

use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{EngineOutput, StaySelection, TravelRequest, TripLength};
use crate::{PlannerError, Result};

pub type SessionId = Uuid;

pub const INVALID_QUERY: &str = "Please enter a valid travel query.";
pub const INCOMPLETE_SELECTION: &str =
    "Please make sure you have entered a preferred stay and the number of days.";
pub const NO_RECOMMENDATIONS: &str =
    "Recommendations are not available yet. Submit a travel query first.";
pub const BUSY: &str = "The planning agents are still working on the previous request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingRecommendations,
    RecommendationsReady,
    AwaitingItinerary,
    ItineraryReady,
}

impl Phase {
    #[must_use]
    pub fn is_awaiting(self) -> bool {
        matches!(
            self,
            Phase::AwaitingRecommendations | Phase::AwaitingItinerary
        )
    }
}

/// One operator's planning session
#[derive(Debug)]
pub struct PlannerSession {
    id: SessionId,
    phase: Phase,
    user_query: String,
    request: Option<TravelRequest>,
    recommendations: Option<EngineOutput>,
    selection: Option<StaySelection>,
    itinerary: Option<EngineOutput>,
    last_touched: Instant,
}

/// Query must be non-blank before Phase 1 may run
pub fn ensure_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        Err(PlannerError::validation(INVALID_QUERY))
    } else {
        Ok(())
    }
}

/// Phase 2 needs recommendations on record, a non-blank stay and a trip length
pub fn ensure_itinerary_ready(
    session: &PlannerSession,
    stay: &str,
    days: Option<TripLength>,
) -> Result<StaySelection> {
    let has_recommendations = session
        .recommendations
        .as_ref()
        .is_some_and(|r| !r.is_empty());
    if !has_recommendations {
        return Err(PlannerError::not_ready(NO_RECOMMENDATIONS));
    }

    match days {
        Some(days) if !stay.trim().is_empty() => Ok(StaySelection {
            stay: stay.to_string(),
            days,
        }),
        _ => Err(PlannerError::validation(INCOMPLETE_SELECTION)),
    }
}

impl PlannerSession {
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            phase: Phase::Idle,
            user_query: String::new(),
            request: None,
            recommendations: None,
            selection: None,
            itinerary: None,
            last_touched: Instant::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    #[must_use]
    pub fn request(&self) -> Option<&TravelRequest> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn recommendations(&self) -> Option<&EngineOutput> {
        self.recommendations.as_ref()
    }

    #[must_use]
    pub fn selection(&self) -> Option<&StaySelection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn itinerary(&self) -> Option<&EngineOutput> {
        self.itinerary.as_ref()
    }

    pub(crate) fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    #[must_use]
    pub fn idle_for(&self) -> std::time::Duration {
        self.last_touched.elapsed()
    }

    /// Enter `AwaitingRecommendations`; returns the phase to restore on failure.
    ///
    /// Allowed from any settled phase, so a query can be resubmitted.
    pub fn begin_recommendations(&mut self, request: &TravelRequest) -> Result<Phase> {
        ensure_query(&request.user_query)?;
        self.ensure_settled()?;
        let prior = self.phase;
        self.phase = Phase::AwaitingRecommendations;
        Ok(prior)
    }

    /// Store the Phase 1 result verbatim.
    ///
    /// A previous selection and itinerary are left in place.
    pub fn complete_recommendations(&mut self, request: TravelRequest, output: EngineOutput) {
        self.user_query = request.user_query.clone();
        self.request = Some(request);
        self.recommendations = Some(output);
        self.phase = Phase::RecommendationsReady;
    }

    /// Enter `AwaitingItinerary`; returns the checked selection and the phase to restore
    pub fn begin_itinerary(
        &mut self,
        stay: &str,
        days: Option<TripLength>,
    ) -> Result<(StaySelection, Phase)> {
        self.ensure_settled()?;
        let selection = ensure_itinerary_ready(self, stay, days)?;
        let prior = self.phase;
        self.phase = Phase::AwaitingItinerary;
        Ok((selection, prior))
    }

    pub fn complete_itinerary(&mut self, selection: StaySelection, output: EngineOutput) {
        self.selection = Some(selection);
        self.itinerary = Some(output);
        self.phase = Phase::ItineraryReady;
    }

    /// Drop back to `prior` after a failed engine call
    pub fn abort(&mut self, prior: Phase) {
        self.phase = prior;
    }

    /// Start over with a new query: clears every slot and returns to `Idle`
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_settled()?;
        self.phase = Phase::Idle;
        self.user_query.clear();
        self.request = None;
        self.recommendations = None;
        self.selection = None;
        self.itinerary = None;
        Ok(())
    }

    fn ensure_settled(&self) -> Result<()> {
        if self.phase.is_awaiting() {
            Err(PlannerError::not_ready(BUSY))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::fixtures::la_trip;

    fn days(n: i64) -> Option<TripLength> {
        Some(TripLength::new(n).unwrap())
    }

    fn session_with_recommendations(text: &str) -> PlannerSession {
        let mut session = PlannerSession::new(Uuid::new_v4());
        session.begin_recommendations(&la_trip()).unwrap();
        session.complete_recommendations(la_trip(), EngineOutput::new(text));
        session
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = PlannerSession::new(Uuid::new_v4());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.user_query(), "");
        assert!(session.recommendations().is_none());
        assert!(session.selection().is_none());
        assert!(session.itinerary().is_none());
    }

    #[test]
    fn test_blank_query_is_rejected_without_state_change() {
        let mut session = PlannerSession::new(Uuid::new_v4());
        let mut request = la_trip();
        request.user_query = "   ".to_string();

        let err = session.begin_recommendations(&request).unwrap_err();
        assert_eq!(err.user_message(), INVALID_QUERY);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.recommendations().is_none());
    }

    #[test]
    fn test_recommendations_are_stored_verbatim() {
        let session = session_with_recommendations("Hotel A\nHotel B");
        assert_eq!(session.phase(), Phase::RecommendationsReady);
        assert_eq!(session.recommendations().unwrap().as_str(), "Hotel A\nHotel B");
        assert_eq!(session.user_query(), "Ahmedabad to Los Angeles for 5 days");
    }

    #[test]
    fn test_abort_restores_prior_phase() {
        let mut session = PlannerSession::new(Uuid::new_v4());
        let prior = session.begin_recommendations(&la_trip()).unwrap();
        assert_eq!(session.phase(), Phase::AwaitingRecommendations);
        session.abort(prior);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.recommendations().is_none());
    }

    #[test]
    fn test_itinerary_gate_requires_recommendations() {
        let session = PlannerSession::new(Uuid::new_v4());
        let err = ensure_itinerary_ready(&session, "Hotel A", days(2)).unwrap_err();
        assert!(matches!(err, PlannerError::NotReady { .. }));

        let session = session_with_recommendations("");
        let err = ensure_itinerary_ready(&session, "Hotel A", days(2)).unwrap_err();
        assert!(matches!(err, PlannerError::NotReady { .. }));
    }

    #[test]
    fn test_itinerary_gate_requires_stay_and_days() {
        let session = session_with_recommendations("Hotel A");

        let err = ensure_itinerary_ready(&session, "", days(2)).unwrap_err();
        assert_eq!(err.user_message(), INCOMPLETE_SELECTION);

        let err = ensure_itinerary_ready(&session, "Hotel A", None).unwrap_err();
        assert_eq!(err.user_message(), INCOMPLETE_SELECTION);

        let selection = ensure_itinerary_ready(&session, "Hotel A", days(5)).unwrap();
        assert_eq!(selection.stay, "Hotel A");
        assert_eq!(selection.days.days(), 5);
    }

    #[test]
    fn test_unlisted_stay_is_accepted() {
        let session = session_with_recommendations("Hotel A\nHotel B");
        assert!(ensure_itinerary_ready(&session, "Somewhere Else Inn", days(3)).is_ok());
    }

    #[test]
    fn test_failed_gate_leaves_phase_unchanged() {
        let mut session = session_with_recommendations("Hotel A");
        assert!(session.begin_itinerary("", days(2)).is_err());
        assert_eq!(session.phase(), Phase::RecommendationsReady);
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_full_walk_through_both_phases() {
        let mut session = session_with_recommendations("Hotel A\nHotel B");
        let (selection, prior) = session.begin_itinerary("Hotel A", days(5)).unwrap();
        assert_eq!(prior, Phase::RecommendationsReady);
        assert_eq!(session.phase(), Phase::AwaitingItinerary);

        session.complete_itinerary(selection, EngineOutput::new("Day 1: beach"));
        assert_eq!(session.phase(), Phase::ItineraryReady);
        assert_eq!(session.itinerary().unwrap().as_str(), "Day 1: beach");
        assert_eq!(session.selection().unwrap().stay, "Hotel A");
    }

    #[test]
    fn test_resubmission_keeps_selection_and_itinerary() {
        let mut session = session_with_recommendations("Hotel A");
        let (selection, _) = session.begin_itinerary("Hotel A", days(2)).unwrap();
        session.complete_itinerary(selection, EngineOutput::new("Day 1"));

        let mut second = la_trip();
        second.user_query = "Ahmedabad to Paris".to_string();
        session.begin_recommendations(&second).unwrap();
        session.complete_recommendations(second, EngineOutput::new("Hotel P"));

        assert_eq!(session.phase(), Phase::RecommendationsReady);
        assert_eq!(session.recommendations().unwrap().as_str(), "Hotel P");
        assert_eq!(session.user_query(), "Ahmedabad to Paris");
        assert_eq!(session.itinerary().unwrap().as_str(), "Day 1");
        assert!(session.selection().is_some());
    }

    #[test]
    fn test_no_new_call_while_awaiting() {
        let mut session = PlannerSession::new(Uuid::new_v4());
        session.begin_recommendations(&la_trip()).unwrap();
        let err = session.begin_recommendations(&la_trip()).unwrap_err();
        assert!(matches!(err, PlannerError::NotReady { .. }));
        assert!(session.reset().is_err());
    }

    #[test]
    fn test_reset_clears_every_slot() {
        let mut session = session_with_recommendations("Hotel A");
        let (selection, _) = session.begin_itinerary("Hotel A", days(2)).unwrap();
        session.complete_itinerary(selection, EngineOutput::new("Day 1"));

        session.reset().unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.user_query(), "");
        assert!(session.request().is_none());
        assert!(session.recommendations().is_none());
        assert!(session.selection().is_none());
        assert!(session.itinerary().is_none());
    }
}
