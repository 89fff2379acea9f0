use super::classifier::Classification;
use super::domain::Dosha;
use super::knowledge::{DoshaProfile, KnowledgeBase, KnowledgeBaseError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Guidance resolved for a classification, blended when a secondary category
/// is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationBundle {
    pub dominant: Dosha,
    pub secondary: Option<Dosha>,
    pub characteristics: Vec<String>,
    pub dietary_principles: Vec<String>,
    pub foods_to_include: Vec<String>,
    pub foods_to_avoid: Vec<String>,
    pub lifestyle: Vec<String>,
    pub supplements: Vec<String>,
}

/// Look up guidance for the dominant category and merge in the secondary's.
///
/// Lists keep dominant entries first and drop case-insensitive duplicates.
/// A food never appears on both the include and avoid lists: the dominant
/// profile's placement wins, and any other conflict is dropped from the
/// include list.
pub fn resolve_recommendations(
    classification: &Classification,
    knowledge: &KnowledgeBase,
) -> Result<RecommendationBundle, KnowledgeBaseError> {
    let primary = knowledge.profile(classification.dominant)?;
    let secondary = classification
        .secondary
        .map(|dosha| knowledge.profile(dosha))
        .transpose()?;

    let mut foods_to_include = blend(primary, secondary, |profile| &profile.foods_to_include);
    let mut foods_to_avoid = blend(primary, secondary, |profile| &profile.foods_to_avoid);

    let dominant_includes = lowered(&primary.foods_to_include);
    let dominant_avoids = lowered(&primary.foods_to_avoid);
    let avoid_keys = lowered(&foods_to_avoid);

    // the dominant profile only loses an include to its own avoid list
    foods_to_avoid.retain(|food| {
        let key = food_key(food);
        !(dominant_includes.contains(&key) && !dominant_avoids.contains(&key))
    });
    foods_to_include.retain(|food| {
        let key = food_key(food);
        !avoid_keys.contains(&key)
            || (dominant_includes.contains(&key) && !dominant_avoids.contains(&key))
    });

    Ok(RecommendationBundle {
        dominant: classification.dominant,
        secondary: classification.secondary,
        characteristics: blend(primary, secondary, |profile| &profile.characteristics),
        dietary_principles: blend(primary, secondary, |profile| &profile.dietary_principles),
        foods_to_include,
        foods_to_avoid,
        lifestyle: blend(primary, secondary, |profile| &profile.lifestyle),
        supplements: blend(primary, secondary, |profile| &profile.supplements),
    })
}

fn blend(
    primary: &DoshaProfile,
    secondary: Option<&DoshaProfile>,
    field: fn(&DoshaProfile) -> &Vec<String>,
) -> Vec<String> {
    let mut merged = field(primary).clone();
    if let Some(profile) = secondary {
        merged.extend(field(profile).iter().cloned());
    }
    dedupe(merged)
}

fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(food_key(item)))
        .collect()
}

fn lowered(items: &[String]) -> HashSet<String> {
    items.iter().map(|item| food_key(item)).collect()
}

fn food_key(item: &str) -> String {
    item.trim().to_lowercase()
}
