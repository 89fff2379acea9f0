use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Constitutional category an assessment resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dosha {
    Vata,
    Pitta,
    Kapha,
}

impl Dosha {
    /// Declared enumeration order. Score vectors and percentage rounding follow it.
    pub const fn ordered() -> [Self; 3] {
        [Self::Vata, Self::Pitta, Self::Kapha]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Vata => "Vata",
            Self::Pitta => "Pitta",
            Self::Kapha => "Kapha",
        }
    }

    pub const fn elements(self) -> &'static str {
        match self {
            Self::Vata => "Air & Space",
            Self::Pitta => "Fire & Water",
            Self::Kapha => "Earth & Water",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Vata => "vata",
            Self::Pitta => "pitta",
            Self::Kapha => "kapha",
        }
    }
}

impl fmt::Display for Dosha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when data names a category outside the declared enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown constitutional category '{found}' (expected one of vata, pitta, kapha)")]
pub struct UnknownCategory {
    pub found: String,
}

impl FromStr for Dosha {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vata" => Ok(Self::Vata),
            "pitta" => Ok(Self::Pitta),
            "kapha" => Ok(Self::Kapha),
            _ => Err(UnknownCategory {
                found: value.to_string(),
            }),
        }
    }
}

/// Category tag displayed alongside a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionDimension {
    Physical,
    Mental,
    Behavioral,
}

impl QuestionDimension {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Physical => "Physical",
            Self::Mental => "Mental",
            Self::Behavioral => "Behavioral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u16);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub u8);

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option {}", self.0)
    }
}

/// A selectable answer carrying the category it points to and its weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: String,
    pub dosha: Dosha,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub dimension: QuestionDimension,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, id: OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id == id)
    }
}

/// One submitted answer: which option was chosen for which question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub option_id: OptionId,
}

impl Answer {
    pub fn new(question_id: u16, option_id: u8) -> Self {
        Self {
            question_id: QuestionId(question_id),
            option_id: OptionId(option_id),
        }
    }
}

/// Normalized answer contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPair {
    pub dosha: Dosha,
    pub weight: u32,
}

/// Meal categories a plan assigns dishes to, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const fn ordered() -> [Self; 3] {
        [Self::Breakfast, Self::Lunch, Self::Dinner]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Breakfast => 0,
            Self::Lunch => 1,
            Self::Dinner => 2,
        }
    }
}

/// Verified identity supplied by the caller; authentication happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dosha_names_case_insensitively() {
        assert_eq!(" Pitta ".parse::<Dosha>(), Ok(Dosha::Pitta));
        assert_eq!("KAPHA".parse::<Dosha>(), Ok(Dosha::Kapha));
        let err = "ether".parse::<Dosha>().expect_err("not a dosha");
        assert_eq!(err.found, "ether");
        assert!(err.to_string().contains("ether"));
    }

    #[test]
    fn meal_slot_index_matches_display_order() {
        for (position, slot) in MealSlot::ordered().into_iter().enumerate() {
            assert_eq!(slot.index(), position);
        }
    }
}
