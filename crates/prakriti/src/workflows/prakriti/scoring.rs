use super::domain::{AnswerPair, Dosha};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Accumulated weight and share of the total for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub dosha: Dosha,
    pub total: u64,
    pub percentage: u8,
}

/// Per-category totals in enumeration order. Always built from a full
/// response set, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreVector {
    pub entries: Vec<CategoryScore>,
    pub grand_total: u64,
}

impl ScoreVector {
    /// Every category present with zero weight.
    pub fn zeroed() -> Self {
        Self {
            entries: Dosha::ordered()
                .into_iter()
                .map(|dosha| CategoryScore {
                    dosha,
                    total: 0,
                    percentage: 0,
                })
                .collect(),
            grand_total: 0,
        }
    }

    pub fn get(&self, dosha: Dosha) -> Option<&CategoryScore> {
        self.entries.iter().find(|entry| entry.dosha == dosha)
    }

    pub fn total(&self, dosha: Dosha) -> u64 {
        self.get(dosha).map(|entry| entry.total).unwrap_or(0)
    }

    pub fn percentage(&self, dosha: Dosha) -> u8 {
        self.get(dosha).map(|entry| entry.percentage).unwrap_or(0)
    }

    /// All submitted weights were zero; every percentage is reported as 0.
    pub fn is_degenerate(&self) -> bool {
        self.grand_total == 0
    }

    pub fn percentage_sum(&self) -> u32 {
        self.entries
            .iter()
            .map(|entry| u32::from(entry.percentage))
            .sum()
    }
}

/// Sum weights per category and apportion integer percentages.
///
/// Each category first receives the floor of its exact share; the points left
/// over go one at a time to the largest fractional remainders, earlier
/// categories winning ties. The result sums to exactly 100 whenever the grand
/// total is non-zero.
pub fn aggregate_scores(pairs: &[AnswerPair]) -> ScoreVector {
    let categories = Dosha::ordered();
    let mut totals = [0u64; 3];

    for pair in pairs {
        if let Some(slot) = categories.iter().position(|dosha| *dosha == pair.dosha) {
            totals[slot] += u64::from(pair.weight);
        }
    }

    let grand_total: u64 = totals.iter().sum();
    let percentages = if grand_total == 0 {
        warn!(
            answers = pairs.len(),
            "all submitted weights are zero; reporting zero percentages"
        );
        [0u8; 3]
    } else {
        apportion(&totals, grand_total)
    };

    let entries = categories
        .into_iter()
        .zip(totals)
        .zip(percentages)
        .map(|((dosha, total), percentage)| CategoryScore {
            dosha,
            total,
            percentage,
        })
        .collect();

    let scores = ScoreVector {
        entries,
        grand_total,
    };
    debug!(grand_total, ?scores.entries, "aggregated constitutional scores");
    scores
}

fn apportion(totals: &[u64; 3], grand_total: u64) -> [u8; 3] {
    let mut floors = [0u64; 3];
    let mut remainders = [0u64; 3];
    for (index, total) in totals.iter().enumerate() {
        let scaled = total * 100;
        floors[index] = scaled / grand_total;
        remainders[index] = scaled % grand_total;
    }

    let assigned: u64 = floors.iter().sum();
    let mut leftover = 100 - assigned;

    let mut order: Vec<usize> = (0..totals.len()).collect();
    // stable sort keeps enumeration order among equal remainders
    order.sort_by(|a, b| remainders[*b].cmp(&remainders[*a]));
    for index in order {
        if leftover == 0 {
            break;
        }
        if remainders[index] > 0 {
            floors[index] += 1;
            leftover -= 1;
        }
    }

    floors.map(|value| value as u8)
}
