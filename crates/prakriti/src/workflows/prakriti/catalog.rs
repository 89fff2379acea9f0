use super::domain::{
    AnswerOption, Dosha, OptionId, Question, QuestionDimension, QuestionId, UnknownCategory,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Errors raised while loading or validating a questionnaire definition.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read question catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid question catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question catalog is empty")]
    Empty,
    #[error("question {question_id} is declared more than once")]
    DuplicateQuestion { question_id: QuestionId },
    #[error("question {question_id} declares {option_id} more than once")]
    DuplicateOption {
        question_id: QuestionId,
        option_id: OptionId,
    },
    #[error("question {question_id} has no options")]
    NoOptions { question_id: QuestionId },
    #[error("question {question_id} references {source}")]
    UnknownCategory {
        question_id: QuestionId,
        #[source]
        source: UnknownCategory,
    },
}

/// Immutable questionnaire loaded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// The ten-question constitutional assessment.
    pub fn standard() -> Self {
        Self {
            questions: standard_questions(),
        }
    }

    pub fn from_questions(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen_questions = HashSet::new();
        for question in &questions {
            if !seen_questions.insert(question.id) {
                return Err(CatalogError::DuplicateQuestion {
                    question_id: question.id,
                });
            }

            if question.options.is_empty() {
                return Err(CatalogError::NoOptions {
                    question_id: question.id,
                });
            }

            let mut seen_options = HashSet::new();
            for option in &question.options {
                if !seen_options.insert(option.id) {
                    return Err(CatalogError::DuplicateOption {
                        question_id: question.id,
                        option_id: option.id,
                    });
                }
            }
        }

        Ok(Self { questions })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a JSON array of questions. Option categories are given as plain
    /// names so that a typo surfaces as an unknown-category error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let raw: Vec<RawQuestion> = serde_json::from_reader(reader)?;
        let questions = raw
            .into_iter()
            .map(RawQuestion::into_question)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_questions(questions)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: u16,
    dimension: QuestionDimension,
    prompt: String,
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    id: u8,
    text: String,
    dosha: String,
    #[serde(default = "default_weight")]
    weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl RawQuestion {
    fn into_question(self) -> Result<Question, CatalogError> {
        let question_id = QuestionId(self.id);
        let options = self
            .options
            .into_iter()
            .map(|option| {
                let dosha = option
                    .dosha
                    .parse::<Dosha>()
                    .map_err(|source| CatalogError::UnknownCategory {
                        question_id,
                        source,
                    })?;
                Ok(AnswerOption {
                    id: OptionId(option.id),
                    text: option.text,
                    dosha,
                    weight: option.weight,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Question {
            id: question_id,
            dimension: self.dimension,
            prompt: self.prompt,
            options,
        })
    }
}

fn question(
    id: u16,
    dimension: QuestionDimension,
    prompt: &str,
    [vata, pitta, kapha]: [&str; 3],
) -> Question {
    let option = |index: u8, text: &str, dosha: Dosha| AnswerOption {
        id: OptionId(index),
        text: text.to_string(),
        dosha,
        weight: 3,
    };

    Question {
        id: QuestionId(id),
        dimension,
        prompt: prompt.to_string(),
        options: vec![
            option(1, vata, Dosha::Vata),
            option(2, pitta, Dosha::Pitta),
            option(3, kapha, Dosha::Kapha),
        ],
    }
}

fn standard_questions() -> Vec<Question> {
    use QuestionDimension::{Behavioral, Mental, Physical};

    vec![
        question(
            1,
            Physical,
            "How would you describe your body build?",
            [
                "Thin, light frame, prominent joints",
                "Medium build, well-proportioned",
                "Large frame, heavy build, rounded features",
            ],
        ),
        question(
            2,
            Physical,
            "What is your skin type?",
            [
                "Dry, rough, cool to touch",
                "Warm, oily, prone to redness/irritation",
                "Oily, smooth, cool, thick",
            ],
        ),
        question(
            3,
            Physical,
            "How is your hair naturally?",
            [
                "Dry, brittle, frizzy",
                "Fine, straight, early graying/balding",
                "Thick, oily, wavy, lustrous",
            ],
        ),
        question(
            4,
            Physical,
            "How is your appetite generally?",
            [
                "Variable, sometimes forget to eat",
                "Strong, regular, get irritable if hungry",
                "Low but steady, can skip meals easily",
            ],
        ),
        question(
            5,
            Physical,
            "How is your digestion?",
            [
                "Irregular, gas, bloating",
                "Strong, quick, rarely have problems",
                "Slow, heavy feeling after meals",
            ],
        ),
        question(
            6,
            Mental,
            "How would you describe your thinking pattern?",
            [
                "Quick, creative, restless mind",
                "Sharp, focused, analytical",
                "Slow, steady, methodical",
            ],
        ),
        question(
            7,
            Mental,
            "How do you handle stress?",
            [
                "Become anxious, worried, scattered",
                "Become irritated, angry, impatient",
                "Become withdrawn, sluggish, depressed",
            ],
        ),
        question(
            8,
            Mental,
            "How is your memory?",
            [
                "Quick to learn, quick to forget",
                "Sharp memory, good retention",
                "Slow to learn but excellent long-term memory",
            ],
        ),
        question(
            9,
            Behavioral,
            "How do you prefer to spend your free time?",
            [
                "Active, traveling, new experiences",
                "Competitive activities, leadership roles",
                "Relaxing, reading, spending time with family",
            ],
        ),
        question(
            10,
            Behavioral,
            "How do you typically sleep?",
            [
                "Light sleeper, wake up easily, restless",
                "Moderate sleep, wake up refreshed",
                "Deep sleeper, hard to wake up, need lots of sleep",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn standard_catalog_covers_all_dimensions() {
        let catalog = QuestionCatalog::standard();
        assert_eq!(catalog.len(), 10);

        let physical = catalog
            .questions()
            .iter()
            .filter(|question| question.dimension == QuestionDimension::Physical)
            .count();
        assert_eq!(physical, 5);
        assert!(catalog
            .questions()
            .iter()
            .all(|question| question.options.len() == 3));
    }

    #[test]
    fn from_reader_parses_categories_by_name() {
        let json = r#"[
            {"id": 1, "dimension": "physical", "prompt": "Frame?", "options": [
                {"id": 1, "text": "Light", "dosha": "Vata", "weight": 2},
                {"id": 2, "text": "Heavy", "dosha": "kapha"}
            ]}
        ]"#;

        let catalog = QuestionCatalog::from_reader(Cursor::new(json)).expect("catalog parses");
        let question = catalog.question(QuestionId(1)).expect("question present");
        assert_eq!(question.options[0].dosha, Dosha::Vata);
        assert_eq!(question.options[0].weight, 2);
        assert_eq!(question.options[1].weight, 1);
    }

    #[test]
    fn from_reader_rejects_unknown_category() {
        let json = r#"[
            {"id": 4, "dimension": "mental", "prompt": "Mood?", "options": [
                {"id": 1, "text": "Airy", "dosha": "ether"}
            ]}
        ]"#;

        match QuestionCatalog::from_reader(Cursor::new(json)) {
            Err(CatalogError::UnknownCategory {
                question_id,
                source,
            }) => {
                assert_eq!(question_id, QuestionId(4));
                assert_eq!(source.found, "ether");
            }
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[test]
    fn from_questions_rejects_duplicates() {
        let mut questions = standard_questions();
        questions.push(questions[0].clone());
        assert!(matches!(
            QuestionCatalog::from_questions(questions),
            Err(CatalogError::DuplicateQuestion { question_id }) if question_id == QuestionId(1)
        ));

        let mut questions = standard_questions();
        let repeated = questions[2].options[0].clone();
        questions[2].options.push(repeated);
        assert!(matches!(
            QuestionCatalog::from_questions(questions),
            Err(CatalogError::DuplicateOption { .. })
        ));

        assert!(matches!(
            QuestionCatalog::from_questions(Vec::new()),
            Err(CatalogError::Empty)
        ));
    }
}
