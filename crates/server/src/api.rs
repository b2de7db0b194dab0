//! API route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use skillforge_core::models::HealthResponse;
use skillforge_core::{AnalysisRequest, Orchestrator};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub orchestrator: Orchestrator,
}

/// User feedback on resource relevance
#[derive(Deserialize, ToSchema)]
pub struct FeedbackRequest {
    pub job_id: String,
    pub skill_name: String,
    pub resource_url: String,
    /// Rating from 1-5
    pub rating: u8,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Skillforge API",
        description = "Multi-agent skill gap analysis and learning resource curation"
    ),
    paths(analyze, job_status, skill_resources, feedback, health)
)]
pub struct ApiDoc;

/// Run a full skill gap analysis and return the finished job
#[utoipa::path(
    post,
    path = "/api/v1/analyze",
    responses(
        (status = 200, description = "Analysis job record, completed or failed")
    )
)]
pub async fn analyze(
    State(state): State<SharedState>,
    Json(request): Json<AnalysisRequest>,
) -> impl IntoResponse {
    tracing::info!(target_job_title = %request.target_job_title, "received analysis request");
    let response = state.orchestrator.process_request(&request).await;
    Json(response)
}

/// Poll the status of a job
#[utoipa::path(
    get,
    path = "/api/v1/status/{job_id}",
    responses(
        (status = 200, description = "Current job status"),
        (status = 404, description = "Unknown job id")
    )
)]
pub async fn job_status(
    State(state): State<SharedState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.job_status(&job_id).await {
        Some(status) => Json(status).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": format!("Job '{job_id}' not found")})),
        )
            .into_response(),
    }
}

/// Additional resources for one skill, outside a job
#[utoipa::path(
    get,
    path = "/api/v1/resources/{skill_name}",
    responses(
        (status = 501, description = "Not implemented yet")
    )
)]
pub async fn skill_resources(Path(skill_name): Path<String>) -> impl IntoResponse {
    tracing::info!(skill = %skill_name, "additional resources requested");
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({"detail": "Additional resources endpoint coming soon"})),
    )
}

/// Record feedback on a curated resource
#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    responses((status = 200, description = "Feedback recorded"))
)]
pub async fn feedback(Json(request): Json<FeedbackRequest>) -> impl IntoResponse {
    tracing::info!(
        job_id = %request.job_id,
        skill = %request.skill_name,
        url = %request.resource_url,
        rating = request.rating,
        "received feedback"
    );
    Json(json!({"message": "Feedback received"}))
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Generated OpenAPI document
pub async fn openapi_doc() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillforge_core::pipeline::EventBus;
    use skillforge_core::search::SearchApiClient;
    use skillforge_core::session::OfflineSessions;
    use skillforge_core::state::MemoryJobStore;
    use skillforge_core::OrchestratorConfig;

    fn test_state() -> SharedState {
        Arc::new(AppState {
            orchestrator: Orchestrator::new(
                OrchestratorConfig {
                    enable_cache: false,
                    ..OrchestratorConfig::default()
                },
                Arc::new(OfflineSessions),
                Arc::new(SearchApiClient::new("", "https://api.example")),
                Arc::new(MemoryJobStore::default()),
                None,
                EventBus::disabled(),
            ),
        })
    }

    #[tokio::test]
    async fn test_unknown_job_is_404_with_detail() {
        let response = job_status(State(test_state()), Path("missing".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(payload["detail"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_skill_resources_is_501() {
        let response = skill_resources(Path("Kubernetes".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_feedback_acknowledges() {
        let request = FeedbackRequest {
            job_id: "job-1".to_string(),
            skill_name: "Kubernetes".to_string(),
            resource_url: "https://example.com/k8s".to_string(),
            rating: 4,
            comments: None,
        };
        let response = feedback(Json(request)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["message"], "Feedback received");
    }
}
