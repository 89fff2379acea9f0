use super::domain::Dosha;
use super::scoring::ScoreVector;
use crate::config::DEFAULT_SECONDARY_THRESHOLD_PCT;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration problems detected when building a classifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierConfigError {
    #[error("priority order must list every category exactly once (found {found:?})")]
    InvalidPriorityOrder { found: Vec<Dosha> },
    #[error("secondary threshold must be between 0 and 100 percent (found {found})")]
    InvalidThreshold { found: u8 },
}

/// Explicit tie-break order over the full category enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Dosha>", into = "Vec<Dosha>")]
pub struct PriorityOrder([Dosha; 3]);

impl PriorityOrder {
    pub fn new(order: Vec<Dosha>) -> Result<Self, ClassifierConfigError> {
        let complete = order.len() == Dosha::ordered().len()
            && Dosha::ordered()
                .iter()
                .all(|dosha| order.iter().filter(|candidate| *candidate == dosha).count() == 1);

        match <[Dosha; 3]>::try_from(order.clone()) {
            Ok(array) if complete => Ok(Self(array)),
            _ => Err(ClassifierConfigError::InvalidPriorityOrder { found: order }),
        }
    }

    pub fn rank(&self, dosha: Dosha) -> usize {
        self.0
            .iter()
            .position(|candidate| *candidate == dosha)
            .unwrap_or(self.0.len())
    }
}

impl Default for PriorityOrder {
    fn default() -> Self {
        Self(Dosha::ordered())
    }
}

impl TryFrom<Vec<Dosha>> for PriorityOrder {
    type Error = ClassifierConfigError;

    fn try_from(value: Vec<Dosha>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PriorityOrder> for Vec<Dosha> {
    fn from(value: PriorityOrder) -> Self {
        value.0.to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub priority: PriorityOrder,
    /// Secondary category is reported when its weight reaches this share of
    /// the dominant weight.
    pub secondary_threshold_pct: u8,
}

impl ClassifierConfig {
    pub fn new(
        priority: PriorityOrder,
        secondary_threshold_pct: u8,
    ) -> Result<Self, ClassifierConfigError> {
        if secondary_threshold_pct > 100 {
            return Err(ClassifierConfigError::InvalidThreshold {
                found: secondary_threshold_pct,
            });
        }

        Ok(Self {
            priority,
            secondary_threshold_pct,
        })
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            priority: PriorityOrder::default(),
            secondary_threshold_pct: DEFAULT_SECONDARY_THRESHOLD_PCT,
        }
    }
}

/// Immutable outcome of one scoring run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub dominant: Dosha,
    pub secondary: Option<Dosha>,
    pub scores: ScoreVector,
    pub tie: bool,
}

impl Classification {
    /// `"Vata"` for a single constitution, `"Vata-Pitta"` for a blend.
    pub fn constitution_label(&self) -> String {
        match self.secondary {
            Some(secondary) => format!("{}-{}", self.dominant.label(), secondary.label()),
            None => self.dominant.label().to_string(),
        }
    }

    /// Classification naming its categories directly, with zeroed scores.
    /// A secondary equal to the dominant category is dropped.
    pub fn assumed(dominant: Dosha, secondary: Option<Dosha>) -> Self {
        Self {
            dominant,
            secondary: secondary.filter(|candidate| *candidate != dominant),
            scores: ScoreVector::zeroed(),
            tie: false,
        }
    }
}

/// Rank categories by weight and pick dominant and secondary categories.
pub fn classify(scores: &ScoreVector, config: &ClassifierConfig) -> Classification {
    let mut ranked: Vec<(Dosha, u64)> = Dosha::ordered()
        .into_iter()
        .map(|dosha| (dosha, scores.total(dosha)))
        .collect();

    ranked.sort_by(|(dosha_a, total_a), (dosha_b, total_b)| {
        total_b
            .cmp(total_a)
            .then_with(|| config.priority.rank(*dosha_a).cmp(&config.priority.rank(*dosha_b)))
    });

    let (dominant, dominant_total) = ranked[0];
    let (runner_up, runner_up_total) = ranked[1];

    let tie = dominant_total == runner_up_total;
    let close_enough = runner_up_total * 100
        >= u64::from(config.secondary_threshold_pct) * dominant_total;
    let secondary = (runner_up_total > 0 && close_enough).then_some(runner_up);

    debug!(
        %dominant,
        ?secondary,
        tie,
        dominant_total,
        runner_up_total,
        "classified constitution"
    );

    Classification {
        dominant,
        secondary,
        scores: scores.clone(),
        tie,
    }
}
