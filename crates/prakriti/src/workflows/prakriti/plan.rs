use super::classifier::Classification;
use super::domain::{Dosha, MealSlot};
use super::knowledge::{Dish, KnowledgeBase, KnowledgeBaseError};
use super::recommendations::resolve_recommendations;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

pub const DEFAULT_PLAN_WEEKS: u32 = 4;
pub const MAX_PLAN_WEEKS: u32 = 52;
pub const DAYS_PER_WEEK: u32 = 7;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Caller-supplied seed that makes dish selection reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanSeed(pub u64);

impl PlanSeed {
    /// Stable seed derived from arbitrary text (64-bit FNV-1a).
    pub fn derive(text: &str) -> Self {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let hash = text.bytes().fold(OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(PRIME)
        });
        Self(hash)
    }
}

impl fmt::Display for PlanSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub classification: Classification,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub restrictions: String,
    #[serde(default = "default_plan_weeks")]
    pub duration_weeks: u32,
}

fn default_plan_weeks() -> u32 {
    DEFAULT_PLAN_WEEKS
}

impl PlanRequest {
    pub fn new(classification: Classification) -> Self {
        Self {
            classification,
            goals: Vec::new(),
            restrictions: String::new(),
            duration_weeks: DEFAULT_PLAN_WEEKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealAssignment {
    pub slot: MealSlot,
    pub dish: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Zero-based across the whole plan.
    pub day_index: u32,
    /// One-based.
    pub week: u32,
    pub weekday: String,
    pub meals: Vec<MealAssignment>,
}

impl DayPlan {
    pub fn meal(&self, slot: MealSlot) -> Option<&MealAssignment> {
        self.meals.iter().find(|meal| meal.slot == slot)
    }
}

/// Multi-week meal and lifestyle plan. Field order is fixed so that equal
/// plans serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub dosha: Dosha,
    pub secondary: Option<Dosha>,
    pub constitution: String,
    pub duration_weeks: u32,
    pub seed: PlanSeed,
    pub days: Vec<DayPlan>,
    pub principles: Vec<String>,
    pub supplements: Vec<String>,
    pub lifestyle: Vec<String>,
    pub goals: Vec<String>,
    pub goal_guidance: BTreeMap<String, Vec<String>>,
    pub restrictions: String,
    pub restriction_unsatisfiable: bool,
    pub unsatisfiable_slots: Vec<MealSlot>,
    pub total_meal_slots: u32,
}

impl Plan {
    /// Days of a one-based week, empty when the week is outside the plan.
    pub fn week(&self, week: u32) -> &[DayPlan] {
        if week == 0 || week > self.duration_weeks {
            return &[];
        }
        let start = ((week - 1) * DAYS_PER_WEEK) as usize;
        let end = (start + DAYS_PER_WEEK as usize).min(self.days.len());
        &self.days[start..end]
    }

    pub fn total_days(&self) -> u32 {
        self.duration_weeks * DAYS_PER_WEEK
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("plan duration must be between 1 and {max} weeks (requested {requested})")]
    InvalidDuration { requested: u32, max: u32 },
    #[error(transparent)]
    KnowledgeBase(#[from] KnowledgeBaseError),
}

/// Build a plan for the dominant category of a classification.
///
/// Dish selection for a given day and slot depends only on the seed, the day
/// index, the slot, and the candidate pool, so a longer plan with the same
/// seed extends a shorter one.
pub fn build_plan(
    request: &PlanRequest,
    knowledge: &KnowledgeBase,
    seed: PlanSeed,
) -> Result<Plan, PlanError> {
    let weeks = request.duration_weeks;
    if weeks == 0 || weeks > MAX_PLAN_WEEKS {
        return Err(PlanError::InvalidDuration {
            requested: weeks,
            max: MAX_PLAN_WEEKS,
        });
    }

    let classification = &request.classification;
    let dosha = classification.dominant;
    let recommendations = resolve_recommendations(classification, knowledge)?;
    let restrictions = request.restrictions.trim().to_lowercase();

    let mut unsatisfiable_slots = Vec::new();
    let mut pools: Vec<(MealSlot, Vec<&Dish>)> = Vec::with_capacity(MealSlot::ordered().len());
    for slot in MealSlot::ordered() {
        let candidates = knowledge.dishes_for(dosha, slot);
        if candidates.is_empty() {
            return Err(KnowledgeBaseError::MissingMeals { dosha, slot }.into());
        }

        let allowed: Vec<&Dish> = if restrictions.is_empty() {
            candidates.clone()
        } else {
            candidates
                .iter()
                .copied()
                .filter(|dish| !dish.violates(&restrictions))
                .collect()
        };

        if allowed.is_empty() {
            warn!(
                %dosha,
                slot = slot.label(),
                restrictions = %request.restrictions,
                "restrictions exclude every candidate dish; using the unfiltered pool"
            );
            unsatisfiable_slots.push(slot);
            pools.push((slot, candidates));
        } else {
            pools.push((slot, allowed));
        }
    }

    let total_days = weeks * DAYS_PER_WEEK;
    let mut days = Vec::with_capacity(total_days as usize);
    for day_index in 0..total_days {
        let mut meals = Vec::with_capacity(pools.len());
        for (slot, pool) in &pools {
            let mut rng = StdRng::seed_from_u64(slot_seed(seed, day_index, *slot));
            let dish = pool
                .choose(&mut rng)
                .ok_or(KnowledgeBaseError::MissingMeals { dosha, slot: *slot })?;
            meals.push(MealAssignment {
                slot: *slot,
                dish: dish.name.clone(),
            });
        }

        days.push(DayPlan {
            day_index,
            week: day_index / DAYS_PER_WEEK + 1,
            weekday: WEEKDAYS[(day_index % DAYS_PER_WEEK) as usize].to_string(),
            meals,
        });
    }

    let goals = normalize_goals(&request.goals);
    let goal_guidance = goals
        .iter()
        .filter_map(|goal| {
            knowledge
                .goal_guidance(goal)
                .map(|guidance| (goal.clone(), guidance.to_vec()))
        })
        .collect();

    let plan = Plan {
        dosha,
        secondary: classification.secondary,
        constitution: classification.constitution_label(),
        duration_weeks: weeks,
        seed,
        days,
        principles: recommendations.dietary_principles,
        supplements: recommendations.supplements,
        lifestyle: recommendations.lifestyle,
        goals,
        goal_guidance,
        restrictions: request.restrictions.trim().to_string(),
        restriction_unsatisfiable: !unsatisfiable_slots.is_empty(),
        unsatisfiable_slots,
        total_meal_slots: total_days * MealSlot::ordered().len() as u32,
    };

    debug!(
        %dosha,
        weeks,
        seed = seed.0,
        restriction_unsatisfiable = plan.restriction_unsatisfiable,
        "built meal plan"
    );

    Ok(plan)
}

/// Trim, lower-case, and snake-case free-text goals, dropping duplicates.
pub fn normalize_goals(goals: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(goals.len());
    for goal in goals {
        let slug = slugify(goal);
        if !slug.is_empty() && !normalized.contains(&slug) {
            normalized.push(slug);
        }
    }
    normalized
}

pub(crate) fn slugify(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

// splitmix64 finalizer over the seed and the (day, slot) coordinate
fn slot_seed(seed: PlanSeed, day_index: u32, slot: MealSlot) -> u64 {
    let coordinate = (u64::from(day_index) << 8) | slot.index() as u64;
    let mut z = seed
        .0
        .wrapping_add(coordinate.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
