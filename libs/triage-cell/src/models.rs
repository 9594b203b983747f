use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use shared_models::ClientError;

pub const DEFAULT_SCALE_MIN: i32 = 1;
pub const DEFAULT_SCALE_MAX: i32 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Text,
    Number,
    Scale,
    #[serde(alias = "multiple-choice", alias = "multiplechoice")]
    MultipleChoice,
    #[serde(alias = "yes/no", alias = "yesno", alias = "boolean")]
    YesNo,
}

impl QuestionKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, QuestionKind::Number | QuestionKind::Scale)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Text => write!(f, "text"),
            QuestionKind::Number => write!(f, "number"),
            QuestionKind::Scale => write!(f, "scale"),
            QuestionKind::MultipleChoice => write!(f, "multiple_choice"),
            QuestionKind::YesNo => write!(f, "yes_no"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriageQuestion {
    pub id: i64,
    pub prompt: String,
    pub kind: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: i32,
    pub scale_min: Option<i32>,
    pub scale_max: Option<i32>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub numeric_answer: Option<f64>,
}

impl TriageQuestion {
    pub fn has_answer(&self) -> bool {
        self.answer
            .as_deref()
            .map(|answer| !answer.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn scale_range(&self) -> (i32, i32) {
        (
            self.scale_min.unwrap_or(DEFAULT_SCALE_MIN),
            self.scale_max.unwrap_or(DEFAULT_SCALE_MAX),
        )
    }

    /// Checks a raw answer against the question kind and returns the value to
    /// store together with its numeric form for number and scale questions.
    pub fn normalize_answer(&self, raw: &str) -> Result<(String, Option<f64>), TriageError> {
        let raw = raw.trim();
        let invalid = |reason: String| TriageError::InvalidAnswer {
            question_id: self.id,
            reason,
        };

        match self.kind {
            QuestionKind::Text => Ok((raw.to_string(), None)),
            QuestionKind::Number => {
                let value: f64 = raw
                    .replace(',', ".")
                    .parse()
                    .map_err(|_| invalid(format!("'{}' is not a number", raw)))?;
                if !value.is_finite() {
                    return Err(invalid(format!("'{}' is not a number", raw)));
                }
                Ok((raw.to_string(), Some(value)))
            }
            QuestionKind::Scale => {
                let (min, max) = self.scale_range();
                let value: i32 = raw
                    .parse()
                    .map_err(|_| invalid(format!("Choose a whole number from {} to {}", min, max)))?;
                if value < min || value > max {
                    return Err(invalid(format!("Choose a whole number from {} to {}", min, max)));
                }
                Ok((value.to_string(), Some(f64::from(value))))
            }
            QuestionKind::MultipleChoice => self
                .options
                .iter()
                .find(|option| option.trim().eq_ignore_ascii_case(raw))
                .map(|option| (option.clone(), None))
                .ok_or_else(|| invalid(format!("'{}' is not one of the options", raw))),
            QuestionKind::YesNo => match raw.to_lowercase().as_str() {
                "yes" | "y" | "si" | "sí" | "true" => Ok(("Yes".to_string(), None)),
                "no" | "n" | "false" => Ok(("No".to_string(), None)),
                _ => Err(invalid("Answer yes or no".to_string())),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriageAnswer {
    pub question_id: i64,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriageSubmission {
    pub appointment_id: Uuid,
    pub answers: Vec<TriageAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriageStatus {
    pub appointment_id: Uuid,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Answers on record once the triage is completed.
    #[serde(default)]
    pub answers: Vec<TriageAnswer>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriageError {
    #[error("Please answer the required questions: {}", .missing.join("; "))]
    Incomplete { missing: Vec<String> },

    #[error("Question {question_id} is required")]
    AnswerRequired { question_id: i64 },

    #[error("Invalid answer for question {question_id}: {reason}")]
    InvalidAnswer { question_id: i64, reason: String },

    #[error("Unknown question {0}")]
    UnknownQuestion(i64),

    #[error("This questionnaire has no questions")]
    NoQuestions,

    #[error("Triage has already been completed for this appointment")]
    AlreadyCompleted,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl TriageError {
    pub fn user_message(&self) -> String {
        match self {
            TriageError::Client(err) => err.user_message(),
            TriageError::AnswerRequired { .. } => {
                "This question is required. Please answer it to continue.".to_string()
            }
            TriageError::InvalidAnswer { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}
