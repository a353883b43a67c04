//! JSON API behind the travel form
//!
//! One planning session per browser tab. The two buttons of the form map to
//! `POST /sessions/{id}/query` and `POST /sessions/{id}/itinerary`.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use tokio::sync::{MutexGuard, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    PlannerError, Result,
    form::{FormOptions, StayForm, TravelForm},
    models::{EngineOutput, TravelRequest},
    pipeline::PipelineController,
    session::{BUSY, Phase, PlannerSession, SessionId},
    store::{SessionHandle, SessionStore},
};

pub mod error;

pub use error::{ApiError, ErrorBody};
use error::reject_body;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub pipeline: Arc<PipelineController>,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: SessionId,
}

/// Everything the page needs to redraw itself
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub phase: Phase,
    pub user_query: String,
    pub request: Option<TravelRequest>,
    pub recommendations: Option<EngineOutput>,
    pub selected_stay: Option<String>,
    pub days: Option<u8>,
    pub itinerary: Option<EngineOutput>,
}

impl From<&PlannerSession> for SessionView {
    fn from(session: &PlannerSession) -> Self {
        Self {
            session_id: session.id(),
            phase: session.phase(),
            user_query: session.user_query().to_string(),
            request: session.request().cloned(),
            recommendations: session.recommendations().cloned(),
            selected_stay: session.selection().map(|s| s.stay.clone()),
            days: session.selection().map(|s| s.days.days()),
            itinerary: session.itinerary().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationsBody {
    pub recommendations: EngineOutput,
}

#[derive(Debug, Serialize)]
pub struct ItineraryBody {
    pub itinerary: EngineOutput,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/options", get(get_options))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(end_session))
        .route("/sessions/{id}/query", post(submit_query))
        .route("/sessions/{id}/itinerary", post(get_itinerary))
        .route("/sessions/{id}/reset", post(reset_session))
        .with_state(state)
}

async fn get_options() -> Json<FormOptions> {
    Json(FormOptions::default())
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.store.create().await;
    tracing::info!(%session_id, "Planning session started");
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<SessionView>, ApiError> {
    let handle = lookup(&state, &id).await?;
    let session = try_claim(&handle)?;
    Ok(Json(SessionView::from(&*session)))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<StatusCode, ApiError> {
    let session_id = parse_id(&id)?;
    if state.store.remove(session_id).await {
        tracing::info!(%session_id, "Planning session ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(PlannerError::session_not_found(session_id).into())
    }
}

async fn submit_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<TravelForm>, JsonRejection>,
) -> std::result::Result<Json<RecommendationsBody>, ApiError> {
    let handle = lookup(&state, &id).await?;
    let Json(form) = payload.map_err(reject_body)?;
    let request = form.into_request()?;

    let pipeline = state.pipeline.clone();
    let recommendations = run_detached(handle, move |mut session| async move {
        let result = pipeline.submit_query(&mut session, request).await;
        session.touch();
        result
    })
    .await?;

    Ok(Json(RecommendationsBody { recommendations }))
}

async fn get_itinerary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<StayForm>, JsonRejection>,
) -> std::result::Result<Json<ItineraryBody>, ApiError> {
    let handle = lookup(&state, &id).await?;
    let Json(form) = payload.map_err(reject_body)?;
    let days = form.trip_length()?;

    let pipeline = state.pipeline.clone();
    let itinerary = run_detached(handle, move |mut session| async move {
        let result = pipeline
            .request_itinerary(&mut session, &form.selected_stay, days)
            .await;
        session.touch();
        result
    })
    .await?;

    Ok(Json(ItineraryBody { itinerary }))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<SessionView>, ApiError> {
    let handle = lookup(&state, &id).await?;
    let mut session = try_claim(&handle)?;
    session.reset()?;
    tracing::info!(session_id = %session.id(), "Session reset for a new query");
    Ok(Json(SessionView::from(&*session)))
}

fn parse_id(id: &str) -> Result<SessionId> {
    Uuid::parse_str(id).map_err(|_| PlannerError::session_not_found(id))
}

async fn lookup(state: &AppState, id: &str) -> Result<SessionHandle> {
    state.store.get(parse_id(id)?).await
}

/// Locks a session for a quick read or edit; a session busy with a crew
/// call is refused rather than waited on.
fn try_claim(handle: &SessionHandle) -> Result<MutexGuard<'_, PlannerSession>> {
    handle.try_lock().map_err(|_| PlannerError::not_ready(BUSY))
}

/// Runs a crew call on its own task with the session locked.
///
/// The lock is taken before spawning, so a second call on a busy session is
/// refused immediately. A client that disconnects mid-call would otherwise
/// drop the handler future and leave the session stuck in an awaiting phase.
async fn run_detached<F, Fut, T>(handle: SessionHandle, work: F) -> Result<T>
where
    F: FnOnce(OwnedMutexGuard<PlannerSession>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let session = handle
        .try_lock_owned()
        .map_err(|_| PlannerError::not_ready(BUSY))?;
    tokio::spawn(work(session))
        .await
        .map_err(|e| PlannerError::general(format!("Planning task failed: {e}")))?
}
