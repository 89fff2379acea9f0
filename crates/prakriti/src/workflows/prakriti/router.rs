use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Answer, UserId};
use super::plan::PlanError;
use super::repository::{
    AssessmentRecord, AssessmentRepository, MealCompletion, MealLog, ProgressLog, RepositoryError,
};
use super::service::{PlanOptions, PlanPreview, PrakritiService, PrakritiServiceError};
use super::wellness::ProgressEntryInput;

/// Body accepted by the assessment endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentSubmission {
    pub answers: Vec<Answer>,
}

/// Router builder exposing the questionnaire, assessment, plan, meal
/// progress, and wellness check-in endpoints.
pub fn prakriti_router<R, L, P>(service: Arc<PrakritiService<R, L, P>>) -> Router
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    Router::new()
        .route(
            "/api/v1/prakriti/questionnaire",
            get(questionnaire_handler::<R, L, P>),
        )
        .route(
            "/api/v1/prakriti/assessments/:user_id",
            post(assess_handler::<R, L, P>).get(assessment_handler::<R, L, P>),
        )
        .route(
            "/api/v1/prakriti/plans/:user_id",
            post(generate_plan_handler::<R, L, P>).get(plan_handler::<R, L, P>),
        )
        .route(
            "/api/v1/prakriti/plan-preview",
            post(plan_preview_handler::<R, L, P>),
        )
        .route(
            "/api/v1/prakriti/progress/:user_id/meals",
            post(record_meal_handler::<R, L, P>),
        )
        .route(
            "/api/v1/prakriti/progress/:user_id/entries",
            post(record_progress_handler::<R, L, P>).get(progress_history_handler::<R, L, P>),
        )
        .route(
            "/api/v1/prakriti/progress/:user_id",
            get(progress_handler::<R, L, P>),
        )
        .with_state(service)
}

pub(crate) async fn questionnaire_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let catalog = service.questionnaire();
    let payload = json!({
        "count": catalog.len(),
        "questions": catalog.questions(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn assess_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
    Path(user_id): Path<String>,
    axum::Json(submission): axum::Json<AssessmentSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let user = UserId(user_id);
    match service.assess(&user, &submission.answers) {
        Ok(record) => {
            (StatusCode::CREATED, axum::Json(assessment_payload(&record))).into_response()
        }
        Err(error) => failure(&user, error),
    }
}

pub(crate) async fn assessment_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let user = UserId(user_id);
    match service.assessment(&user) {
        Ok(record) => (StatusCode::OK, axum::Json(assessment_payload(&record))).into_response(),
        Err(error) => failure(&user, error),
    }
}

pub(crate) async fn generate_plan_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
    Path(user_id): Path<String>,
    axum::Json(options): axum::Json<PlanOptions>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let user = UserId(user_id);
    match service.generate_plan(&user, options) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => failure(&user, error),
    }
}

pub(crate) async fn plan_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let user = UserId(user_id);
    match service.plan_for(&user) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => failure(&user, error),
    }
}

pub(crate) async fn plan_preview_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
    axum::Json(preview): axum::Json<PlanPreview>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let user = UserId("preview".to_string());
    match service.preview_plan(preview) {
        Ok(plan) => (StatusCode::OK, axum::Json(plan)).into_response(),
        Err(error) => failure(&user, error),
    }
}

pub(crate) async fn record_meal_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
    Path(user_id): Path<String>,
    axum::Json(completion): axum::Json<MealCompletion>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let user = UserId(user_id);
    match service.record_meal(&user, completion) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => failure(&user, error),
    }
}

pub(crate) async fn progress_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let user = UserId(user_id);
    match service.progress(&user) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => failure(&user, error),
    }
}

pub(crate) async fn record_progress_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
    Path(user_id): Path<String>,
    axum::Json(input): axum::Json<ProgressEntryInput>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let user = UserId(user_id);
    match service.record_progress(&user, input) {
        Ok(history) => (StatusCode::CREATED, axum::Json(history)).into_response(),
        Err(error) => failure(&user, error),
    }
}

pub(crate) async fn progress_history_handler<R, L, P>(
    State(service): State<Arc<PrakritiService<R, L, P>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    let user = UserId(user_id);
    match service.progress_history(&user) {
        Ok(history) => (StatusCode::OK, axum::Json(history)).into_response(),
        Err(error) => failure(&user, error),
    }
}

fn assessment_payload(record: &AssessmentRecord) -> serde_json::Value {
    json!({
        "summary": record.summary(),
        "classification": record.classification,
        "recommendations": record.recommendations,
        "assessed_at": record.assessed_at,
    })
}

fn failure(user: &UserId, error: PrakritiServiceError) -> Response {
    let status = match &error {
        PrakritiServiceError::Validation(_)
        | PrakritiServiceError::Progress(_)
        | PrakritiServiceError::Wellness(_)
        | PrakritiServiceError::Plan(PlanError::InvalidDuration { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PrakritiServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PrakritiServiceError::Plan(PlanError::KnowledgeBase(_))
        | PrakritiServiceError::KnowledgeBase(_)
        | PrakritiServiceError::Repository(RepositoryError::Unavailable(_)) => {
            tracing::error!(user = %user, error = %error, "prakriti request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "user_id": user.0,
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
