use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::Classification;
use super::domain::{MealSlot, UserId};
use super::plan::Plan;
use super::recommendations::RecommendationBundle;
use super::wellness::ProgressEntry;

/// Stored outcome of a completed questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub user_id: UserId,
    pub classification: Classification,
    pub recommendations: RecommendationBundle,
    pub assessed_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn summary(&self) -> AssessmentSummary {
        AssessmentSummary {
            user_id: self.user_id.clone(),
            constitution: self.classification.constitution_label(),
            dominant: self.classification.dominant.label(),
            elements: self.classification.dominant.elements(),
            percentages: self
                .classification
                .scores
                .entries
                .iter()
                .map(|entry| (entry.dosha.slug(), entry.percentage))
                .collect(),
            tie: self.classification.tie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub user_id: UserId,
    pub plan: Plan,
    /// Starts at 1 and increases each time the user's plan is regenerated.
    pub revision: u32,
    pub created_at: DateTime<Utc>,
}

/// One eaten meal, addressed by plan day and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MealCompletion {
    pub day_index: u32,
    pub slot: MealSlot,
}

impl MealCompletion {
    /// `breakfast-3` style key used by progress views.
    pub fn key(&self) -> String {
        format!("{}-{}", self.slot.label().to_lowercase(), self.day_index)
    }
}

/// A completion tied to the plan revision it was logged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoggedMeal {
    pub plan_revision: u32,
    pub completion: MealCompletion,
}

/// Storage for classification and plan snapshots. Saves replace the whole
/// snapshot for a user.
pub trait AssessmentRepository: Send + Sync {
    fn save_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn fetch_assessment(&self, user: &UserId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn save_plan(&self, record: PlanRecord) -> Result<(), RepositoryError>;
    fn fetch_plan(&self, user: &UserId) -> Result<Option<PlanRecord>, RepositoryError>;
}

/// Append-only log of completed meals.
pub trait MealLog: Send + Sync {
    /// Returns `false` when the completion was already recorded.
    fn record(&self, user: &UserId, meal: LoggedMeal) -> Result<bool, RepositoryError>;
    fn completions(&self, user: &UserId) -> Result<Vec<LoggedMeal>, RepositoryError>;
}

/// Append-only log of wellness check-ins.
pub trait ProgressLog: Send + Sync {
    fn append(&self, user: &UserId, entry: ProgressEntry) -> Result<(), RepositoryError>;
    fn entries(&self, user: &UserId) -> Result<Vec<ProgressEntry>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Compact view of an assessment for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentSummary {
    pub user_id: UserId,
    pub constitution: String,
    pub dominant: &'static str,
    pub elements: &'static str,
    pub percentages: BTreeMap<&'static str, u8>,
    pub tie: bool,
}
