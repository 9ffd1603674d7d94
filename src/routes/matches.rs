use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    ErrorResponse, HealthResponse, MatchesResponse, ParticipantId, ParticipantsResponse,
    PreferencesResponse, RunMatchingRequest, RunMatchingResponse, SavePreferencesRequest, SavePreferencesResponse,
    ScoresResponse,
};
use crate::services::{PairingService, ServiceError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PairingService>,
}

/// Configure all pairing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/participants", web::get().to(list_participants))
        .route("/participants/{id}/scores", web::get().to(get_scores))
        .route("/participants/{id}/matches", web::get().to(get_matches))
        .route("/participants/{id}/preferences", web::get().to(get_preferences))
        .route("/participants/{id}/preferences", web::put().to(save_preferences))
        .route("/matches/run", web::post().to(run_matching));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state.service.health_check().await;
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/participants
async fn list_participants(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let participants = state.service.list_participants().await?;

    Ok(HttpResponse::Ok().json(ParticipantsResponse {
        total: participants.len(),
        participants,
    }))
}

/// Pairwise scores for one viewer
///
/// GET /api/v1/participants/{id}/scores
///
/// Returns the candidates the viewer ranked who rank the viewer back, best
/// score first.
async fn get_scores(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let viewer = ParticipantId::new(path.into_inner());
    let matches = state.service.compute_pairwise_scores(&viewer).await?;

    tracing::debug!("Returning {} scored candidates for {}", matches.len(), viewer);

    Ok(HttpResponse::Ok().json(ScoresResponse {
        participant_id: viewer,
        matches,
    }))
}

/// Persisted matches for one participant
///
/// GET /api/v1/participants/{id}/matches
async fn get_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let participant = ParticipantId::new(path.into_inner());
    let matches = state.service.matches_for(&participant).await?;

    Ok(HttpResponse::Ok().json(MatchesResponse {
        participant_id: participant,
        matches,
    }))
}

/// GET /api/v1/participants/{id}/preferences
async fn get_preferences(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let owner = ParticipantId::new(path.into_inner());
    let preferences = state.service.preferences_for(&owner).await?;

    Ok(HttpResponse::Ok().json(PreferencesResponse {
        participant_id: owner,
        preferences,
    }))
}

/// Replace a participant's preference list
///
/// PUT /api/v1/participants/{id}/preferences
///
/// Request body:
/// ```json
/// { "preferences": ["user456", "user789"] }
/// ```
async fn save_preferences(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<SavePreferencesRequest>,
) -> Result<HttpResponse, ServiceError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for save_preferences request: {:?}", errors);
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        }));
    }

    let owner = ParticipantId::new(path.into_inner());
    let count = state
        .service
        .save_preferences(&owner, req.into_inner().preferences)
        .await?;

    Ok(HttpResponse::Ok().json(SavePreferencesResponse {
        success: true,
        count,
    }))
}

/// Run population-wide matching and persist the result
///
/// POST /api/v1/matches/run
///
/// Request body:
/// ```json
/// { "strategy": "greedy|stable" }
/// ```
async fn run_matching(
    state: web::Data<AppState>,
    req: web::Json<RunMatchingRequest>,
) -> Result<HttpResponse, ServiceError> {
    let run = state.service.run_matching(req.strategy).await?;

    tracing::info!(
        "Matching run ({}) stored {} pairs",
        run.strategy,
        run.matches.len()
    );

    Ok(HttpResponse::Ok().json(RunMatchingResponse {
        success: true,
        strategy: run.strategy,
        match_count: run.matches.len(),
        matches: run.matches,
        unmatched: run.unmatched,
        violations: run.violations,
    }))
}
