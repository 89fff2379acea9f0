use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::catalog::QuestionCatalog;
use super::classifier::{
    classify, Classification, ClassifierConfig, ClassifierConfigError, PriorityOrder,
};
use super::domain::{Answer, Dosha, MealSlot, UserId};
use super::knowledge::{KnowledgeBase, KnowledgeBaseError};
use super::normalizer::{normalize_answers, ValidationError};
use super::plan::{
    build_plan, Plan, PlanError, PlanRequest, PlanSeed, DAYS_PER_WEEK, DEFAULT_PLAN_WEEKS,
};
use super::recommendations::resolve_recommendations;
use super::repository::{
    AssessmentRecord, AssessmentRepository, LoggedMeal, MealCompletion, MealLog, PlanRecord,
    ProgressLog, RepositoryError,
};
use super::scoring::aggregate_scores;
use super::wellness::{ProgressEntry, ProgressEntryError, ProgressEntryInput, ProgressHistory};
use crate::config::{AssessmentSettings, DEFAULT_SAMPLE_PLAN_SEED};

/// Tunables shared by every request the service handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub default_plan_weeks: u32,
    pub sample_plan_seed: PlanSeed,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            default_plan_weeks: DEFAULT_PLAN_WEEKS,
            sample_plan_seed: PlanSeed(DEFAULT_SAMPLE_PLAN_SEED),
        }
    }
}

impl EngineConfig {
    pub fn from_settings(settings: &AssessmentSettings) -> Result<Self, ClassifierConfigError> {
        Ok(Self {
            classifier: ClassifierConfig::new(
                PriorityOrder::default(),
                settings.secondary_threshold_pct,
            )?,
            default_plan_weeks: settings.default_plan_weeks,
            sample_plan_seed: PlanSeed(settings.sample_plan_seed),
        })
    }
}

/// Plan parameters a caller may supply; omitted values fall back to the
/// configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub restrictions: String,
    #[serde(default)]
    pub duration_weeks: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Plan parameters for a constitution supplied directly rather than assessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPreview {
    pub dosha: Dosha,
    #[serde(default)]
    pub secondary: Option<Dosha>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub restrictions: String,
    #[serde(default)]
    pub duration_weeks: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Stored,
    Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanView {
    pub source: PlanSource,
    /// Revision of the stored plan, 0 for a sample plan.
    pub revision: u32,
    pub plan: Plan,
}

/// Meal completion counts for a user's current plan revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub user_id: UserId,
    pub plan_source: PlanSource,
    pub completed: u32,
    pub total_meal_slots: u32,
    pub percent_complete: u8,
    /// Week holding the furthest recorded meal, 1 before any meal is logged.
    pub current_week: u32,
    pub completed_this_week: u32,
    pub weekly_meal_slots: u32,
    pub completed_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("day {day_index} is outside the {total_days}-day plan")]
    SlotOutOfRange { day_index: u32, total_days: u32 },
}

/// Service composing the pure engine with snapshot storage, the meal log,
/// and the wellness check-in log.
pub struct PrakritiService<R, L, P> {
    catalog: Arc<QuestionCatalog>,
    knowledge: Arc<KnowledgeBase>,
    config: EngineConfig,
    repository: Arc<R>,
    meals: Arc<L>,
    progress_log: Arc<P>,
}

impl<R, L, P> PrakritiService<R, L, P>
where
    R: AssessmentRepository + 'static,
    L: MealLog + 'static,
    P: ProgressLog + 'static,
{
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        knowledge: Arc<KnowledgeBase>,
        config: EngineConfig,
        repository: Arc<R>,
        meals: Arc<L>,
        progress_log: Arc<P>,
    ) -> Self {
        Self {
            catalog,
            knowledge,
            config,
            repository,
            meals,
            progress_log,
        }
    }

    /// Standard questionnaire and knowledge base with default tunables.
    pub fn standard(repository: Arc<R>, meals: Arc<L>, progress_log: Arc<P>) -> Self {
        Self::new(
            Arc::new(QuestionCatalog::standard()),
            Arc::new(KnowledgeBase::standard()),
            EngineConfig::default(),
            repository,
            meals,
            progress_log,
        )
    }

    pub fn questionnaire(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score a complete response set and replace the user's stored assessment.
    pub fn assess(
        &self,
        user: &UserId,
        responses: &[Answer],
    ) -> Result<AssessmentRecord, PrakritiServiceError> {
        let pairs = normalize_answers(responses, &self.catalog)?;
        let scores = aggregate_scores(&pairs);
        let classification = classify(&scores, &self.config.classifier);
        let recommendations = resolve_recommendations(&classification, &self.knowledge)?;

        let record = AssessmentRecord {
            user_id: user.clone(),
            classification,
            recommendations,
            assessed_at: Utc::now(),
        };
        self.repository.save_assessment(record.clone())?;

        info!(
            user = %user,
            constitution = %record.classification.constitution_label(),
            "stored constitutional assessment"
        );
        Ok(record)
    }

    pub fn assessment(&self, user: &UserId) -> Result<AssessmentRecord, PrakritiServiceError> {
        let record = self
            .repository
            .fetch_assessment(user)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Build and store a plan from the user's stored classification. The
    /// stored revision advances, so meals logged earlier stop counting.
    pub fn generate_plan(
        &self,
        user: &UserId,
        options: PlanOptions,
    ) -> Result<PlanRecord, PrakritiServiceError> {
        let assessment = self.assessment(user)?;
        let seed = options
            .seed
            .map(PlanSeed)
            .unwrap_or_else(|| PlanSeed::derive(&user.0));

        let request = PlanRequest {
            classification: assessment.classification,
            goals: options.goals,
            restrictions: options.restrictions,
            duration_weeks: options
                .duration_weeks
                .unwrap_or(self.config.default_plan_weeks),
        };
        let plan = build_plan(&request, &self.knowledge, seed)?;
        let revision = match self.repository.fetch_plan(user)? {
            Some(previous) => previous.revision + 1,
            None => 1,
        };

        let record = PlanRecord {
            user_id: user.clone(),
            plan,
            revision,
            created_at: Utc::now(),
        };
        self.repository.save_plan(record.clone())?;

        info!(
            user = %user,
            revision,
            weeks = record.plan.duration_weeks,
            seed = %seed,
            restriction_unsatisfiable = record.plan.restriction_unsatisfiable,
            "stored meal plan"
        );
        Ok(record)
    }

    /// The stored plan, or a sample plan built with the configured seed.
    pub fn plan_for(&self, user: &UserId) -> Result<PlanView, PrakritiServiceError> {
        if let Some(record) = self.repository.fetch_plan(user)? {
            return Ok(PlanView {
                source: PlanSource::Stored,
                revision: record.revision,
                plan: record.plan,
            });
        }

        let classification = match self.repository.fetch_assessment(user)? {
            Some(record) => record.classification,
            None => Classification::assumed(Dosha::Vata, None),
        };

        let mut request = PlanRequest::new(classification);
        request.duration_weeks = self.config.default_plan_weeks;
        let plan = build_plan(&request, &self.knowledge, self.config.sample_plan_seed)?;

        Ok(PlanView {
            source: PlanSource::Sample,
            revision: 0,
            plan,
        })
    }

    /// Build an unsaved plan for a named constitution using this service's
    /// knowledge base, default length, and sample seed.
    pub fn preview_plan(&self, preview: PlanPreview) -> Result<Plan, PrakritiServiceError> {
        let request = PlanRequest {
            classification: Classification::assumed(preview.dosha, preview.secondary),
            goals: preview.goals,
            restrictions: preview.restrictions,
            duration_weeks: preview
                .duration_weeks
                .unwrap_or(self.config.default_plan_weeks),
        };
        let seed = preview
            .seed
            .map(PlanSeed)
            .unwrap_or(self.config.sample_plan_seed);

        Ok(build_plan(&request, &self.knowledge, seed)?)
    }

    /// Log a completed meal against the user's current plan.
    pub fn record_meal(
        &self,
        user: &UserId,
        completion: MealCompletion,
    ) -> Result<ProgressSummary, PrakritiServiceError> {
        let view = self.plan_for(user)?;
        let total_days = view.plan.total_days();
        if completion.day_index >= total_days {
            return Err(ProgressError::SlotOutOfRange {
                day_index: completion.day_index,
                total_days,
            }
            .into());
        }

        let meal = LoggedMeal {
            plan_revision: view.revision,
            completion,
        };
        if self.meals.record(user, meal)? {
            info!(
                user = %user,
                revision = view.revision,
                meal = %completion.key(),
                "recorded meal completion"
            );
        }

        let completions = self.meals.completions(user)?;
        Ok(summarize(user, &view, &completions))
    }

    pub fn progress(&self, user: &UserId) -> Result<ProgressSummary, PrakritiServiceError> {
        let view = self.plan_for(user)?;
        let completions = self.meals.completions(user)?;
        Ok(summarize(user, &view, &completions))
    }

    /// Validate and append a wellness check-in, returning the updated history.
    pub fn record_progress(
        &self,
        user: &UserId,
        input: ProgressEntryInput,
    ) -> Result<ProgressHistory, PrakritiServiceError> {
        let entry = ProgressEntry::from_input(input, Utc::now())?;
        self.progress_log.append(user, entry)?;

        let history = self.progress_history(user)?;
        info!(
            user = %user,
            entries = history.entries.len(),
            "recorded wellness check-in"
        );
        Ok(history)
    }

    pub fn progress_history(&self, user: &UserId) -> Result<ProgressHistory, PrakritiServiceError> {
        let entries = self.progress_log.entries(user)?;
        Ok(ProgressHistory::new(user.clone(), entries))
    }
}

fn summarize(user: &UserId, view: &PlanView, logged: &[LoggedMeal]) -> ProgressSummary {
    let total_days = view.plan.total_days();
    let mut seen = HashSet::new();
    let in_plan: Vec<&MealCompletion> = logged
        .iter()
        .filter(|meal| meal.plan_revision == view.revision)
        .map(|meal| &meal.completion)
        .filter(|completion| completion.day_index < total_days)
        .filter(|completion| seen.insert(**completion))
        .collect();

    let completed = in_plan.len() as u32;
    let total_meal_slots = view.plan.total_meal_slots;
    let percent_complete = if total_meal_slots == 0 {
        0
    } else {
        ((completed * 200 + total_meal_slots) / (2 * total_meal_slots)) as u8
    };

    let current_week = in_plan
        .iter()
        .map(|completion| completion.day_index / DAYS_PER_WEEK + 1)
        .max()
        .unwrap_or(1);
    let completed_this_week = in_plan
        .iter()
        .filter(|completion| completion.day_index / DAYS_PER_WEEK + 1 == current_week)
        .count() as u32;

    ProgressSummary {
        user_id: user.clone(),
        plan_source: view.source,
        completed,
        total_meal_slots,
        percent_complete,
        current_week,
        completed_this_week,
        weekly_meal_slots: DAYS_PER_WEEK * MealSlot::ordered().len() as u32,
        completed_keys: in_plan.iter().map(|completion| completion.key()).collect(),
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum PrakritiServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    KnowledgeBase(#[from] KnowledgeBaseError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Wellness(#[from] ProgressEntryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
