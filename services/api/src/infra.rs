use metrics_exporter_prometheus::PrometheusHandle;
use prakriti::config::AssessmentSettings;
use prakriti::error::AppError;
use prakriti::workflows::prakriti::{
    AssessmentRecord, AssessmentRepository, Dosha, EngineConfig, KnowledgeBase, LoggedMeal,
    MealLog, PlanRecord, PrakritiService, ProgressEntry, ProgressLog, QuestionCatalog,
    RepositoryError, UserId,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    assessments: Arc<Mutex<HashMap<UserId, AssessmentRecord>>>,
    plans: Arc<Mutex<HashMap<UserId, PlanRecord>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn save_assessment(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        guard.insert(record.user_id.clone(), record);
        Ok(())
    }

    fn fetch_assessment(
        &self,
        user: &UserId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
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
pub(crate) struct InMemoryMealLog {
    entries: Arc<Mutex<HashMap<UserId, Vec<LoggedMeal>>>>,
}

impl MealLog for InMemoryMealLog {
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
pub(crate) struct InMemoryProgressLog {
    entries: Arc<Mutex<HashMap<UserId, Vec<ProgressEntry>>>>,
}

impl ProgressLog for InMemoryProgressLog {
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

pub(crate) type AppService =
    PrakritiService<InMemoryAssessmentRepository, InMemoryMealLog, InMemoryProgressLog>;

/// Configuration data and tunables the engine runs with.
pub(crate) struct Engine {
    pub(crate) catalog: Arc<QuestionCatalog>,
    pub(crate) knowledge: Arc<KnowledgeBase>,
    pub(crate) config: EngineConfig,
}

/// Load the question catalog and knowledge base from the configured paths,
/// falling back to the built-in data.
pub(crate) fn load_engine(settings: &AssessmentSettings) -> Result<Engine, AppError> {
    let catalog = match &settings.question_catalog {
        Some(path) => {
            let catalog = QuestionCatalog::from_path(path)?;
            info!(path = %path.display(), questions = catalog.len(), "loaded question catalog");
            catalog
        }
        None => QuestionCatalog::standard(),
    };

    let knowledge = match &settings.knowledge_base {
        Some(path) => {
            let knowledge = KnowledgeBase::from_path(path)?;
            info!(
                path = %path.display(),
                dishes = knowledge.dishes().len(),
                "loaded knowledge base"
            );
            knowledge
        }
        None => KnowledgeBase::standard(),
    };

    Ok(Engine {
        catalog: Arc::new(catalog),
        knowledge: Arc::new(knowledge),
        config: EngineConfig::from_settings(settings)?,
    })
}

/// Service over the loaded engine with fresh in-memory stores.
pub(crate) fn in_memory_service(engine: Engine) -> AppService {
    PrakritiService::new(
        engine.catalog,
        engine.knowledge,
        engine.config,
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(InMemoryMealLog::default()),
        Arc::new(InMemoryProgressLog::default()),
    )
}

pub(crate) fn parse_dosha(raw: &str) -> Result<Dosha, String> {
    raw.parse::<Dosha>().map_err(|err| err.to_string())
}
