//! Constitutional (prakriti) assessment and plan generation.
//!
//! Answers flow one way through the engine: the normalizer resolves each
//! answer against the question catalog, the aggregator sums weights per
//! category, the classifier picks dominant and secondary categories, and the
//! recommendation resolver and plan builder turn the classification into
//! guidance and a seeded multi-week meal plan. Everything up to the service
//! layer is synchronous and side-effect free. The service also keeps a meal
//! completion log per plan revision and a wellness check-in log with trends.

pub mod catalog;
pub mod classifier;
pub mod domain;
pub mod import;
pub mod knowledge;
pub mod normalizer;
pub mod plan;
pub mod recommendations;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod wellness;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, QuestionCatalog};
pub use classifier::{
    classify, Classification, ClassifierConfig, ClassifierConfigError, PriorityOrder,
};
pub use domain::{
    Answer, AnswerOption, AnswerPair, Dosha, MealSlot, OptionId, Question, QuestionDimension,
    QuestionId, UnknownCategory, UserId,
};
pub use import::{ImportError, ResponseSet, ResponseSetImporter};
pub use knowledge::{Dish, DoshaProfile, KnowledgeBase, KnowledgeBaseError};
pub use normalizer::{normalize_answers, ValidationError};
pub use plan::{
    build_plan, normalize_goals, DayPlan, MealAssignment, Plan, PlanError, PlanRequest, PlanSeed,
    DEFAULT_PLAN_WEEKS, MAX_PLAN_WEEKS,
};
pub use recommendations::{resolve_recommendations, RecommendationBundle};
pub use repository::{
    AssessmentRecord, AssessmentRepository, AssessmentSummary, LoggedMeal, MealCompletion,
    MealLog, PlanRecord, ProgressLog, RepositoryError,
};
pub use router::{prakriti_router, AssessmentSubmission};
pub use scoring::{aggregate_scores, CategoryScore, ScoreVector};
pub use service::{
    EngineConfig, PlanOptions, PlanPreview, PlanSource, PlanView, PrakritiService,
    PrakritiServiceError, ProgressError, ProgressSummary,
};
pub use wellness::{
    metric_trends, MetricTrend, ProgressEntry, ProgressEntryError, ProgressEntryInput,
    ProgressHistory, WellnessMetric,
};
