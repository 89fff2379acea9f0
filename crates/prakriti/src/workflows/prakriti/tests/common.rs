use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::prakriti::domain::{Answer, UserId};
use crate::workflows::prakriti::repository::{
    AssessmentRecord, AssessmentRepository, LoggedMeal, MealLog, PlanRecord, ProgressLog,
    RepositoryError,
};
use crate::workflows::prakriti::wellness::ProgressEntry;
use crate::workflows::prakriti::{
    prakriti_router, EngineConfig, KnowledgeBase, PlanSeed, PrakritiService, QuestionCatalog,
};

pub(super) type TestService = PrakritiService<MemoryRepository, MemoryMealLog, MemoryProgressLog>;

pub(super) fn user(id: &str) -> UserId {
    UserId(id.to_string())
}

/// Seven Vata answers, two Pitta, one Kapha: totals 21/6/3.
pub(super) fn vata_answers() -> Vec<Answer> {
    let options = [1, 1, 1, 1, 1, 1, 1, 2, 2, 3];
    options
        .iter()
        .enumerate()
        .map(|(index, option)| Answer::new(index as u16 + 1, *option))
        .collect()
}

/// Five Pitta answers and four Kapha answers: Kapha reaches 80% of Pitta.
pub(super) fn pitta_kapha_answers() -> Vec<Answer> {
    let options = [2, 2, 2, 2, 2, 3, 3, 3, 3, 1];
    options
        .iter()
        .enumerate()
        .map(|(index, option)| Answer::new(index as u16 + 1, *option))
        .collect()
}

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<MemoryMealLog>) {
    let repository = Arc::new(MemoryRepository::default());
    let meals = Arc::new(MemoryMealLog::default());
    let service = PrakritiService::standard(
        repository.clone(),
        meals.clone(),
        Arc::new(MemoryProgressLog::default()),
    );
    (service, repository, meals)
}

/// Service over a three-dish clinic knowledge base with a two-week default
/// plan and sample seed 7.
pub(super) fn clinic_service() -> TestService {
    let json = include_str!("../../../../fixtures/compact_knowledge.json");
    let knowledge = KnowledgeBase::from_reader(Cursor::new(json)).expect("fixture loads");
    let config = EngineConfig {
        default_plan_weeks: 2,
        sample_plan_seed: PlanSeed(7),
        ..EngineConfig::default()
    };
    PrakritiService::new(
        Arc::new(QuestionCatalog::standard()),
        Arc::new(knowledge),
        config,
        Arc::new(MemoryRepository::default()),
        Arc::new(MemoryMealLog::default()),
        Arc::new(MemoryProgressLog::default()),
    )
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    assessments: Arc<Mutex<HashMap<UserId, AssessmentRecord>>>,
    plans: Arc<Mutex<HashMap<UserId, PlanRecord>>>,
}

impl MemoryRepository {
    pub(super) fn plan_count(&self) -> usize {
        self.plans.lock().expect("plan mutex poisoned").len()
    }
}

impl AssessmentRepository for MemoryRepository {
    fn save_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        guard.insert(record.user_id.clone(), record);
        Ok(())
    }

    fn fetch_assessment(&self, user: &UserId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(guard.get(user).cloned())
    }

    fn save_plan(&self, record: PlanRecord) -> Result<(), RepositoryError> {
        let mut guard = self.plans.lock().expect("plan mutex poisoned");
        guard.insert(record.user_id.clone(), record);
        Ok(())
    }

    fn fetch_plan(&self, user: &UserId) -> Result<Option<PlanRecord>, RepositoryError> {
        let guard = self.plans.lock().expect("plan mutex poisoned");
        Ok(guard.get(user).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMealLog {
    entries: Arc<Mutex<HashMap<UserId, Vec<LoggedMeal>>>>,
}

impl MealLog for MemoryMealLog {
    fn record(&self, user: &UserId, meal: LoggedMeal) -> Result<bool, RepositoryError> {
        let mut guard = self.entries.lock().expect("meal log mutex poisoned");
        let entries = guard.entry(user.clone()).or_default();
        if entries.contains(&meal) {
            return Ok(false);
        }
        entries.push(meal);
        Ok(true)
    }

    fn completions(&self, user: &UserId) -> Result<Vec<LoggedMeal>, RepositoryError> {
        let guard = self.entries.lock().expect("meal log mutex poisoned");
        Ok(guard.get(user).cloned().unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryProgressLog {
    entries: Arc<Mutex<HashMap<UserId, Vec<ProgressEntry>>>>,
}

impl ProgressLog for MemoryProgressLog {
    fn append(&self, user: &UserId, entry: ProgressEntry) -> Result<(), RepositoryError> {
        let mut guard = self.entries.lock().expect("progress log mutex poisoned");
        guard.entry(user.clone()).or_default().push(entry);
        Ok(())
    }

    fn entries(&self, user: &UserId) -> Result<Vec<ProgressEntry>, RepositoryError> {
        let guard = self.entries.lock().expect("progress log mutex poisoned");
        Ok(guard.get(user).cloned().unwrap_or_default())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn save_assessment(&self, _record: AssessmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_assessment(
        &self,
        _user: &UserId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_plan(&self, _record: PlanRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_plan(&self, _user: &UserId) -> Result<Option<PlanRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    prakriti_router(Arc::new(service))
}
