use super::domain::{Dosha, MealSlot, UnknownCategory};
use super::plan::slugify;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Integrity failures in the static knowledge base. These indicate a
/// configuration mismatch and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeBaseError {
    #[error("failed to read knowledge base: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid knowledge base JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("knowledge base references {0}")]
    UnrecognisedCategory(#[from] UnknownCategory),
    #[error("knowledge base has no entry for category {0}")]
    UnknownCategory(Dosha),
    #[error("knowledge base has no {} dish suited to {dosha}", slot.label())]
    MissingMeals { dosha: Dosha, slot: MealSlot },
}

/// Guidance attached to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoshaProfile {
    pub characteristics: Vec<String>,
    pub dietary_principles: Vec<String>,
    pub foods_to_include: Vec<String>,
    pub foods_to_avoid: Vec<String>,
    pub lifestyle: Vec<String>,
    #[serde(default)]
    pub supplements: Vec<String>,
}

/// A dish the plan builder can assign to a meal slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    pub slot: MealSlot,
    pub suits: Vec<Dosha>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Dish {
    pub fn suits(&self, dosha: Dosha) -> bool {
        self.suits.contains(&dosha)
    }

    /// True when the lower-cased restriction text mentions any of the tags.
    pub fn violates(&self, restrictions_lower: &str) -> bool {
        self.tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .any(|tag| restrictions_lower.contains(&tag))
    }
}

/// Read-only lookup tables keyed by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    profiles: BTreeMap<Dosha, DoshaProfile>,
    dishes: Vec<Dish>,
    goal_guidance: BTreeMap<String, Vec<String>>,
}

impl KnowledgeBase {
    pub fn standard() -> Self {
        Self {
            profiles: standard_profiles(),
            dishes: standard_dishes(),
            goal_guidance: standard_goal_guidance(),
        }
    }

    /// Goal keys are slugged the same way plan goals are, so `"Weight
    /// Management"` and `weight_management` address the same guidance.
    pub fn new(
        profiles: BTreeMap<Dosha, DoshaProfile>,
        dishes: Vec<Dish>,
        goal_guidance: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, KnowledgeBaseError> {
        let goal_guidance = goal_guidance
            .into_iter()
            .map(|(goal, guidance)| (slugify(&goal), guidance))
            .filter(|(goal, _)| !goal.is_empty())
            .collect();
        let knowledge = Self {
            profiles,
            dishes,
            goal_guidance,
        };
        knowledge.validate()?;
        Ok(knowledge)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, KnowledgeBaseError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, KnowledgeBaseError> {
        let raw: RawKnowledgeBase = serde_json::from_reader(reader)?;

        let mut profiles = BTreeMap::new();
        for (name, profile) in raw.profiles {
            profiles.insert(name.parse::<Dosha>()?, profile);
        }

        let dishes = raw
            .dishes
            .into_iter()
            .map(|dish| {
                let suits = dish
                    .suits
                    .iter()
                    .map(|name| name.parse::<Dosha>())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Dish {
                    name: dish.name,
                    slot: dish.slot,
                    suits,
                    tags: dish.tags,
                })
            })
            .collect::<Result<Vec<_>, KnowledgeBaseError>>()?;

        Self::new(profiles, dishes, raw.goal_guidance)
    }

    /// Every category needs a profile and at least one dish per meal slot.
    pub fn validate(&self) -> Result<(), KnowledgeBaseError> {
        for dosha in Dosha::ordered() {
            self.profile(dosha)?;
            for slot in MealSlot::ordered() {
                if self.dishes_for(dosha, slot).is_empty() {
                    return Err(KnowledgeBaseError::MissingMeals { dosha, slot });
                }
            }
        }
        Ok(())
    }

    pub fn profile(&self, dosha: Dosha) -> Result<&DoshaProfile, KnowledgeBaseError> {
        self.profiles
            .get(&dosha)
            .ok_or(KnowledgeBaseError::UnknownCategory(dosha))
    }

    /// Dishes for a slot that suit the category, in catalog order.
    pub fn dishes_for(&self, dosha: Dosha, slot: MealSlot) -> Vec<&Dish> {
        self.dishes
            .iter()
            .filter(|dish| dish.slot == slot && dish.suits(dosha))
            .collect()
    }

    pub fn dishes(&self) -> &[Dish] {
        &self.dishes
    }

    pub fn goal_guidance(&self, goal_slug: &str) -> Option<&[String]> {
        self.goal_guidance.get(goal_slug).map(Vec::as_slice)
    }
}

#[derive(Debug, Deserialize)]
struct RawKnowledgeBase {
    profiles: BTreeMap<String, DoshaProfile>,
    dishes: Vec<RawDish>,
    #[serde(default)]
    goal_guidance: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawDish {
    name: String,
    slot: MealSlot,
    suits: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn standard_profiles() -> BTreeMap<Dosha, DoshaProfile> {
    let mut profiles = BTreeMap::new();

    profiles.insert(
        Dosha::Vata,
        DoshaProfile {
            characteristics: strings(&[
                "Air & Space elements; governs movement, breathing, and the nervous system",
                "Light frame with dry skin and hair",
                "Variable appetite and irregular digestion",
                "Quick, creative, restless mind; learns fast and forgets fast",
                "Light sleeper who wakes easily",
            ]),
            dietary_principles: strings(&[
                "Eat warm, cooked foods",
                "Favor sweet, sour, and salty tastes",
                "Keep regular meal times",
                "Avoid cold and raw foods",
                "Use digestive spices",
                "Eat in a calm environment",
            ]),
            foods_to_include: strings(&["Rice", "Wheat", "Dairy", "Nuts", "Sweet fruits", "Ghee"]),
            foods_to_avoid: strings(&[
                "Raw vegetables",
                "Bitter and astringent foods",
                "Caffeine",
                "Cold foods",
            ]),
            lifestyle: strings(&[
                "Regular sleep schedule",
                "Warm oil massage",
                "Gentle yoga",
                "Meditation",
                "Avoid excessive stimulation",
            ]),
            supplements: strings(&["Triphala", "Ashwagandha", "Brahmi"]),
        },
    );

    profiles.insert(
        Dosha::Pitta,
        DoshaProfile {
            characteristics: strings(&[
                "Fire & Water elements; governs digestion, metabolism, and transformation",
                "Medium, well-proportioned build with warm skin",
                "Strong, regular appetite; irritable when hungry",
                "Sharp, focused, analytical mind with good retention",
                "Moderate sleep, wakes refreshed",
            ]),
            dietary_principles: strings(&[
                "Eat cool, fresh foods",
                "Favor sweet, bitter, and astringent tastes",
                "Avoid spicy foods",
                "Keep portions moderate",
                "Do not skip meals",
            ]),
            foods_to_include: strings(&[
                "Leafy greens",
                "Sweet fruits",
                "Coconut",
                "Cucumber",
                "Mint",
            ]),
            foods_to_avoid: strings(&["Spicy foods", "Sour fruits", "Alcohol", "Red meat"]),
            lifestyle: strings(&[
                "Avoid excessive heat",
                "Moderate exercise",
                "Spend time in cool environments",
                "Practice stress management",
            ]),
            supplements: strings(&["Amalaki", "Shatavari", "Brahmi"]),
        },
    );

    profiles.insert(
        Dosha::Kapha,
        DoshaProfile {
            characteristics: strings(&[
                "Earth & Water elements; governs structure, immunity, and stability",
                "Large, sturdy frame with smooth, thick skin",
                "Low but steady appetite with slow digestion",
                "Slow, steady, methodical mind with excellent long-term memory",
                "Deep sleeper who needs plenty of rest",
            ]),
            dietary_principles: strings(&[
                "Eat light, warm foods",
                "Favor pungent, bitter, and astringent tastes",
                "Keep portions small",
                "Avoid heavy, oily foods",
                "Use warming spices",
            ]),
            foods_to_include: strings(&[
                "Spices",
                "Legumes",
                "Vegetables",
                "Light grains",
                "Honey",
            ]),
            foods_to_avoid: strings(&["Dairy", "Sweet foods", "Cold foods", "Excessive fats"]),
            lifestyle: strings(&[
                "Regular vigorous exercise",
                "Early rising",
                "Active lifestyle",
                "Avoid oversleeping",
            ]),
            supplements: strings(&["Trikatu", "Guggulu", "Tulsi"]),
        },
    );

    profiles
}

fn dish(name: &str, slot: MealSlot, suits: &[Dosha], tags: &[&str]) -> Dish {
    Dish {
        name: name.to_string(),
        slot,
        suits: suits.to_vec(),
        tags: strings(tags),
    }
}

fn standard_dishes() -> Vec<Dish> {
    use Dosha::{Kapha, Pitta, Vata};
    use MealSlot::{Breakfast, Dinner, Lunch};

    vec![
        dish(
            "Warm oatmeal with almonds and ghee",
            Breakfast,
            &[Vata],
            &["grain", "nut", "dairy"],
        ),
        dish(
            "Spiced quinoa porridge with dates",
            Breakfast,
            &[Vata],
            &["grain", "sweet"],
        ),
        dish(
            "Kitchari with vegetables",
            Breakfast,
            &[Vata, Pitta, Kapha],
            &["legume", "rice"],
        ),
        dish(
            "Warm milk with turmeric and honey",
            Breakfast,
            &[Vata],
            &["dairy", "honey"],
        ),
        dish(
            "Rice pudding with cardamom",
            Breakfast,
            &[Vata, Pitta],
            &["dairy", "rice", "sweet"],
        ),
        dish(
            "Warm smoothie with banana and almonds",
            Breakfast,
            &[Vata],
            &["nut", "fruit"],
        ),
        dish(
            "Cooked apples with cinnamon",
            Breakfast,
            &[Vata, Kapha],
            &["fruit"],
        ),
        dish(
            "Cool cereal with sweet fruits",
            Breakfast,
            &[Pitta],
            &["grain", "gluten", "fruit"],
        ),
        dish(
            "Coconut water with fresh sweet fruits",
            Breakfast,
            &[Pitta],
            &["coconut", "fruit"],
        ),
        dish(
            "Oat porridge with coconut milk",
            Breakfast,
            &[Pitta],
            &["grain", "coconut"],
        ),
        dish(
            "Stewed pears with cardamom",
            Breakfast,
            &[Pitta],
            &["fruit"],
        ),
        dish(
            "Spiced tea with light fruits",
            Breakfast,
            &[Kapha],
            &["fruit", "spicy"],
        ),
        dish(
            "Millet porridge with ginger",
            Breakfast,
            &[Kapha],
            &["grain", "spicy"],
        ),
        dish(
            "Buckwheat pancakes with honey",
            Breakfast,
            &[Kapha],
            &["grain", "honey"],
        ),
        dish(
            "Kitchari with ghee and vegetables",
            Lunch,
            &[Vata, Pitta],
            &["legume", "rice", "dairy"],
        ),
        dish(
            "Rice with dal and steamed greens",
            Lunch,
            &[Vata, Pitta],
            &["rice", "legume"],
        ),
        dish(
            "Vegetable curry with quinoa",
            Lunch,
            &[Vata],
            &["grain", "spicy"],
        ),
        dish(
            "Lentil soup with bread",
            Lunch,
            &[Vata],
            &["legume", "gluten"],
        ),
        dish(
            "Spiced vegetables with rice",
            Lunch,
            &[Vata, Kapha],
            &["rice", "spicy"],
        ),
        dish(
            "Chickpea curry with flatbread",
            Lunch,
            &[Vata, Kapha],
            &["legume", "gluten", "spicy"],
        ),
        dish("Warming vegetable stew", Lunch, &[Vata], &[]),
        dish(
            "Cucumber salad with quinoa",
            Lunch,
            &[Pitta],
            &["raw", "grain"],
        ),
        dish(
            "Basmati rice with mung dal",
            Lunch,
            &[Pitta],
            &["rice", "legume"],
        ),
        dish(
            "Vegetable pulao with mint lassi",
            Lunch,
            &[Pitta],
            &["rice", "dairy"],
        ),
        dish(
            "Zucchini and asparagus with rice",
            Lunch,
            &[Pitta],
            &["rice"],
        ),
        dish(
            "Spicy vegetables with millet",
            Lunch,
            &[Kapha],
            &["grain", "spicy"],
        ),
        dish(
            "Barley and vegetable soup",
            Lunch,
            &[Kapha],
            &["grain", "gluten"],
        ),
        dish(
            "Lentil salad with ginger dressing",
            Lunch,
            &[Kapha],
            &["legume", "raw", "spicy"],
        ),
        dish(
            "Light dal with steamed vegetables",
            Dinner,
            &[Vata, Pitta, Kapha],
            &["legume"],
        ),
        dish(
            "Vegetable soup with rice",
            Dinner,
            &[Vata, Pitta, Kapha],
            &["rice"],
        ),
        dish("Gently spiced vegetables", Dinner, &[Vata], &["spicy"]),
        dish("Warm milk with almonds", Dinner, &[Vata], &["dairy", "nut"]),
        dish(
            "Light kitchari",
            Dinner,
            &[Vata, Pitta, Kapha],
            &["legume", "rice"],
        ),
        dish("Herbal tea with crackers", Dinner, &[Vata], &["gluten"]),
        dish("Digestive tea with a light snack", Dinner, &[Vata], &[]),
        dish("Light soup with cooling herbs", Dinner, &[Pitta], &[]),
        dish("Steamed rice with vegetables", Dinner, &[Pitta], &["rice"]),
        dish(
            "Mild coconut vegetable curry",
            Dinner,
            &[Pitta],
            &["coconut"],
        ),
        dish("Light soup with ginger", Dinner, &[Kapha], &["spicy"]),
        dish("Steamed vegetables with herbal tea", Dinner, &[Kapha], &[]),
        dish(
            "Spiced mung bean soup",
            Dinner,
            &[Kapha],
            &["legume", "spicy"],
        ),
    ]
}

fn standard_goal_guidance() -> BTreeMap<String, Vec<String>> {
    let mut guidance = BTreeMap::new();
    guidance.insert(
        "general_wellness".to_string(),
        strings(&["Make lunch the largest meal of the day", "Take a gentle walk after meals"]),
    );
    guidance.insert(
        "weight_management".to_string(),
        strings(&[
            "Finish dinner before 7 PM",
            "Favor light, warm meals and avoid snacking between meals",
        ]),
    );
    guidance.insert(
        "digestive_health".to_string(),
        strings(&[
            "Sip warm water through the day",
            "Chew slowly and eat without distractions",
        ]),
    );
    guidance.insert(
        "stress_relief".to_string(),
        strings(&[
            "Practice ten minutes of breathing exercises daily",
            "Keep a consistent bedtime",
        ]),
    );
    guidance.insert(
        "energy".to_string(),
        strings(&["Rise with the sun", "Include a short morning movement routine"]),
    );
    guidance
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn standard_knowledge_base_is_complete() {
        let knowledge = KnowledgeBase::standard();
        knowledge.validate().expect("standard knowledge base validates");

        for dosha in Dosha::ordered() {
            for slot in MealSlot::ordered() {
                assert!(
                    knowledge.dishes_for(dosha, slot).len() > 1,
                    "{dosha} {slot:?} needs variety"
                );
            }
        }
        assert!(knowledge.goal_guidance("weight_management").is_some());
    }

    #[test]
    fn restriction_match_is_case_insensitive_substring() {
        let dish = dish(
            "Warm milk with almonds",
            MealSlot::Dinner,
            &[Dosha::Vata],
            &["Dairy", "nut"],
        );
        assert!(dish.violates("no dairy please"));
        assert!(dish.violates("peanut allergy"));
        assert!(!dish.violates("gluten free"));
    }

    #[test]
    fn missing_profile_is_reported_as_unknown_category() {
        let mut profiles = standard_profiles();
        profiles.remove(&Dosha::Kapha);

        match KnowledgeBase::new(profiles, standard_dishes(), BTreeMap::new()) {
            Err(KnowledgeBaseError::UnknownCategory(dosha)) => assert_eq!(dosha, Dosha::Kapha),
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[test]
    fn missing_slot_dishes_are_rejected() {
        let dishes: Vec<Dish> = standard_dishes()
            .into_iter()
            .filter(|dish| !(dish.slot == MealSlot::Lunch && dish.suits(Dosha::Pitta)))
            .collect();

        match KnowledgeBase::new(standard_profiles(), dishes, BTreeMap::new()) {
            Err(KnowledgeBaseError::MissingMeals { dosha, slot }) => {
                assert_eq!(dosha, Dosha::Pitta);
                assert_eq!(slot, MealSlot::Lunch);
            }
            other => panic!("expected missing meals, got {other:?}"),
        }
    }

    #[test]
    fn loaded_goal_keys_are_slugged() {
        let json = include_str!("../../../fixtures/compact_knowledge.json");
        let knowledge = KnowledgeBase::from_reader(Cursor::new(json)).expect("fixture loads");

        assert_eq!(
            knowledge.goal_guidance("weight_management"),
            Some(&["Walk for twenty minutes after lunch".to_string()][..])
        );
        assert_eq!(knowledge.goal_guidance("Weight Management"), None);
        assert_eq!(knowledge.dishes().len(), 3);
    }

    #[test]
    fn from_reader_rejects_unknown_category_names() {
        let json = r#"{
            "profiles": {"ether": {
                "characteristics": [], "dietary_principles": [], "foods_to_include": [],
                "foods_to_avoid": [], "lifestyle": []
            }},
            "dishes": []
        }"#;

        match KnowledgeBase::from_reader(Cursor::new(json)) {
            Err(KnowledgeBaseError::UnrecognisedCategory(err)) => assert_eq!(err.found, "ether"),
            other => panic!("expected unrecognised category, got {other:?}"),
        }
    }
}
