use super::catalog::QuestionCatalog;
use super::domain::{Answer, AnswerPair, OptionId, QuestionId};
use std::collections::HashSet;

/// Malformed or incomplete response sets. Callers surface these so the
/// respondent can resubmit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("response set is empty")]
    EmptyResponseSet,
    #[error("answer references unknown question {question_id}")]
    UnknownQuestion { question_id: QuestionId },
    #[error("answer to {question_id} references unknown {option_id}")]
    UnknownOption {
        question_id: QuestionId,
        option_id: OptionId,
    },
    #[error("{question_id} was answered more than once")]
    DuplicateAnswer { question_id: QuestionId },
    #[error("response set answers {answered} of {expected} questions (missing {})", format_missing(.missing))]
    IncompleteResponseSet {
        expected: usize,
        answered: usize,
        missing: Vec<QuestionId>,
    },
}

fn format_missing(missing: &[QuestionId]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve each answer to the category and weight of the chosen option.
///
/// The output preserves submission order. A set must answer every catalog
/// question exactly once.
pub fn normalize_answers(
    responses: &[Answer],
    catalog: &QuestionCatalog,
) -> Result<Vec<AnswerPair>, ValidationError> {
    if responses.is_empty() {
        return Err(ValidationError::EmptyResponseSet);
    }

    let mut answered = HashSet::with_capacity(responses.len());
    let mut pairs = Vec::with_capacity(responses.len());

    for answer in responses {
        let question =
            catalog
                .question(answer.question_id)
                .ok_or(ValidationError::UnknownQuestion {
                    question_id: answer.question_id,
                })?;

        if !answered.insert(answer.question_id) {
            return Err(ValidationError::DuplicateAnswer {
                question_id: answer.question_id,
            });
        }

        let option = question
            .option(answer.option_id)
            .ok_or(ValidationError::UnknownOption {
                question_id: answer.question_id,
                option_id: answer.option_id,
            })?;

        pairs.push(AnswerPair {
            dosha: option.dosha,
            weight: option.weight,
        });
    }

    if answered.len() != catalog.len() {
        let missing: Vec<QuestionId> = catalog
            .questions()
            .iter()
            .map(|question| question.id)
            .filter(|id| !answered.contains(id))
            .collect();

        return Err(ValidationError::IncompleteResponseSet {
            expected: catalog.len(),
            answered: answered.len(),
            missing,
        });
    }

    Ok(pairs)
}
