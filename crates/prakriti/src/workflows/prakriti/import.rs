use super::domain::Answer;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingRespondent { line: u64 },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read response export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid response CSV data: {}", err),
            ImportError::MissingRespondent { line } => {
                write!(f, "response row on line {} has no respondent", line)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::MissingRespondent { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Answers submitted by one respondent, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSet {
    pub respondent: String,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Deserialize)]
struct ResponseRow {
    respondent: String,
    question_id: u16,
    option_id: u8,
}

/// Reads `respondent,question_id,option_id` exports for batch scoring.
pub struct ResponseSetImporter;

impl ResponseSetImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ResponseSet>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Groups rows by respondent. Sets come back in order of each
    /// respondent's first row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ResponseSet>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut sets: Vec<ResponseSet> = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            let row: ResponseRow = record.deserialize(Some(&headers))?;

            if row.respondent.is_empty() {
                return Err(ImportError::MissingRespondent { line });
            }

            let answer = Answer::new(row.question_id, row.option_id);
            match sets.iter_mut().find(|set| set.respondent == row.respondent) {
                Some(set) => set.answers.push(answer),
                None => sets.push(ResponseSet {
                    respondent: row.respondent,
                    answers: vec![answer],
                }),
            }
        }

        Ok(sets)
    }
}
