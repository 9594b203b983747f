use tracing::debug;
use uuid::Uuid;

use crate::models::{TriageAnswer, TriageError, TriageQuestion, TriageSubmission};

/// Sequential cursor over a triage questionnaire. Questions are kept in
/// ascending `order`; answers are stored on the questions themselves.
#[derive(Debug, Clone)]
pub struct TriageWalker {
    appointment_id: Uuid,
    questions: Vec<TriageQuestion>,
    cursor: usize,
}

impl TriageWalker {
    pub fn new(appointment_id: Uuid, mut questions: Vec<TriageQuestion>) -> Self {
        questions.sort_by_key(|q| q.order);
        Self {
            appointment_id,
            questions,
            cursor: 0,
        }
    }

    pub fn appointment_id(&self) -> Uuid {
        self.appointment_id
    }

    pub fn questions(&self) -> &[TriageQuestion] {
        &self.questions
    }

    pub fn current(&self) -> Option<&TriageQuestion> {
        self.questions.get(self.cursor)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.questions.len()
    }

    pub fn can_advance(&self) -> bool {
        match self.current() {
            Some(question) => !self.is_last() && (!question.required || question.has_answer()),
            None => false,
        }
    }

    /// Moves forward one question. A required question without an answer
    /// blocks; on the last question this is a no-op returning `false`.
    pub fn next(&mut self) -> Result<bool, TriageError> {
        let Some(question) = self.current() else {
            return Ok(false);
        };

        if question.required && !question.has_answer() {
            debug!("Blocked on required question {}", question.id);
            return Err(TriageError::AnswerRequired { question_id: question.id });
        }

        if self.is_last() {
            return Ok(false);
        }

        self.cursor += 1;
        Ok(true)
    }

    pub fn previous(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Answers the question under the cursor. An empty questionnaire has no
    /// current question.
    pub fn answer_current(&mut self, raw: &str) -> Result<(), TriageError> {
        let question_id = self
            .current()
            .map(|q| q.id)
            .ok_or(TriageError::NoQuestions)?;
        self.answer(question_id, raw)
    }

    /// Stores an answer after validating it for the question kind. A blank
    /// answer clears the question.
    pub fn answer(&mut self, question_id: i64, raw: &str) -> Result<(), TriageError> {
        let question = self
            .questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or(TriageError::UnknownQuestion(question_id))?;

        if raw.trim().is_empty() {
            question.answer = None;
            question.numeric_answer = None;
            return Ok(());
        }

        let (value, numeric) = question.normalize_answer(raw)?;
        question.answer = Some(value);
        question.numeric_answer = numeric;
        Ok(())
    }

    pub fn clear_answer(&mut self, question_id: i64) -> Result<(), TriageError> {
        self.answer(question_id, "")
    }

    pub fn is_complete(&self) -> bool {
        self.questions
            .iter()
            .all(|q| !q.required || q.has_answer())
    }

    pub fn missing_required(&self) -> Vec<&TriageQuestion> {
        self.questions
            .iter()
            .filter(|q| q.required && !q.has_answer())
            .collect()
    }

    /// Fraction of all questions answered.
    pub fn progress(&self) -> f32 {
        if self.questions.is_empty() {
            return 0.0;
        }
        let answered = self.questions.iter().filter(|q| q.has_answer()).count();
        answered as f32 / self.questions.len() as f32
    }

    /// Fraction of required questions answered; 1.0 when none are required.
    pub fn required_progress(&self) -> f32 {
        let required: Vec<&TriageQuestion> = self.questions.iter().filter(|q| q.required).collect();
        if required.is_empty() {
            return 1.0;
        }
        let answered = required.iter().filter(|q| q.has_answer()).count();
        answered as f32 / required.len() as f32
    }

    /// Answered questions in ascending `order`.
    pub fn answers(&self) -> Vec<TriageAnswer> {
        self.questions
            .iter()
            .filter(|q| q.has_answer())
            .filter_map(|q| {
                let value = q.answer.as_ref()?.trim().to_string();
                Some(TriageAnswer {
                    question_id: q.id,
                    value,
                    numeric_value: if q.kind.is_numeric() { q.numeric_answer } else { None },
                })
            })
            .collect()
    }

    /// The payload to send, or the unanswered required prompts.
    pub fn submission(&self) -> Result<TriageSubmission, TriageError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(TriageError::Incomplete {
                missing: missing.iter().map(|q| q.prompt.clone()).collect(),
            });
        }

        Ok(TriageSubmission {
            appointment_id: self.appointment_id,
            answers: self.answers(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;
    use assert_matches::assert_matches;

    fn question(id: i64, kind: QuestionKind, required: bool, order: i32) -> TriageQuestion {
        TriageQuestion {
            id,
            prompt: format!("Pregunta {}", id),
            kind,
            options: vec!["Leve".to_string(), "Severo".to_string()],
            required,
            order,
            scale_min: None,
            scale_max: None,
            answer: None,
            numeric_answer: None,
        }
    }

    fn walker(questions: Vec<TriageQuestion>) -> TriageWalker {
        TriageWalker::new(Uuid::new_v4(), questions)
    }

    #[test]
    fn test_required_question_blocks_next_until_answered() {
        let mut w = walker(vec![
            question(1, QuestionKind::Text, true, 1),
            question(2, QuestionKind::Text, false, 2),
            question(3, QuestionKind::Text, false, 3),
        ]);

        assert!(!w.can_advance());
        assert_matches!(w.next(), Err(TriageError::AnswerRequired { question_id: 1 }));
        assert_eq!(w.position(), 0);

        w.answer_current("Dolor de cabeza").unwrap();
        assert!(w.can_advance());
        assert_eq!(w.next(), Ok(true));
        assert_eq!(w.current().unwrap().id, 2);

        // Optional question never blocks.
        assert_eq!(w.next(), Ok(true));
        assert_eq!(w.current().unwrap().id, 3);
    }

    #[test]
    fn test_next_on_last_question_stays() {
        let mut w = walker(vec![question(1, QuestionKind::Text, false, 1)]);
        assert!(w.is_first());
        assert!(w.is_last());
        assert_eq!(w.next(), Ok(false));
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn test_empty_questionnaire_has_no_current_question() {
        let mut w = walker(vec![]);
        assert!(w.is_empty());
        assert!(w.current().is_none());
        assert_eq!(w.answer_current("x"), Err(TriageError::NoQuestions));
        assert_eq!(w.next(), Ok(false));
        assert!(w.is_complete());
    }

    #[test]
    fn test_previous_stops_at_first() {
        let mut w = walker(vec![
            question(1, QuestionKind::Text, false, 1),
            question(2, QuestionKind::Text, false, 2),
        ]);
        assert!(!w.previous());
        w.next().unwrap();
        assert!(w.previous());
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn test_questions_sorted_by_order() {
        let w = walker(vec![
            question(10, QuestionKind::Text, false, 3),
            question(11, QuestionKind::Text, false, 1),
            question(12, QuestionKind::Text, false, 2),
        ]);
        let ids: Vec<i64> = w.questions().iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![11, 12, 10]);
    }

    #[test]
    fn test_is_complete_and_missing() {
        let mut w = walker(vec![
            question(1, QuestionKind::Text, true, 1),
            question(2, QuestionKind::Number, true, 2),
            question(3, QuestionKind::Text, false, 3),
        ]);
        assert!(!w.is_complete());
        assert_eq!(w.missing_required().len(), 2);

        w.answer(1, "Tos").unwrap();
        w.answer(2, "38").unwrap();
        assert!(w.is_complete());
        assert!(w.missing_required().is_empty());
    }

    #[test]
    fn test_progress_fractions() {
        let mut w = walker(vec![
            question(1, QuestionKind::Text, true, 1),
            question(2, QuestionKind::Text, false, 2),
            question(3, QuestionKind::Text, false, 3),
            question(4, QuestionKind::Text, true, 4),
        ]);
        assert_eq!(w.progress(), 0.0);
        assert_eq!(w.required_progress(), 0.0);

        w.answer(1, "a").unwrap();
        w.answer(2, "b").unwrap();
        assert_eq!(w.progress(), 0.5);
        assert_eq!(w.required_progress(), 0.5);

        assert_eq!(walker(vec![]).progress(), 0.0);
        assert_eq!(walker(vec![question(1, QuestionKind::Text, false, 1)]).required_progress(), 1.0);
    }

    #[test]
    fn test_invalid_answer_leaves_previous_value() {
        let mut w = walker(vec![question(1, QuestionKind::Scale, true, 1)]);
        w.answer(1, "7").unwrap();
        assert_matches!(w.answer(1, "12"), Err(TriageError::InvalidAnswer { .. }));
        assert_eq!(w.questions()[0].answer.as_deref(), Some("7"));
        assert_eq!(w.questions()[0].numeric_answer, Some(7.0));
    }

    #[test]
    fn test_blank_answer_clears() {
        let mut w = walker(vec![question(1, QuestionKind::Number, true, 1)]);
        w.answer(1, "36.6").unwrap();
        w.clear_answer(1).unwrap();
        assert!(!w.questions()[0].has_answer());
        assert!(w.questions()[0].numeric_answer.is_none());
        assert_matches!(w.answer(99, "x"), Err(TriageError::UnknownQuestion(99)));
    }

    #[test]
    fn test_submission_contains_answered_subset_in_order() {
        let mut w = walker(vec![
            question(30, QuestionKind::YesNo, false, 3),
            question(10, QuestionKind::Scale, true, 1),
            question(20, QuestionKind::Text, false, 2),
            question(40, QuestionKind::MultipleChoice, false, 4),
        ]);

        w.answer(30, "si").unwrap();
        w.answer(10, "8").unwrap();
        w.answer(40, "severo").unwrap();

        let submission = w.submission().unwrap();
        assert_eq!(submission.appointment_id, w.appointment_id());
        assert_eq!(
            submission.answers,
            vec![
                TriageAnswer { question_id: 10, value: "8".to_string(), numeric_value: Some(8.0) },
                TriageAnswer { question_id: 30, value: "Yes".to_string(), numeric_value: None },
                TriageAnswer { question_id: 40, value: "Severo".to_string(), numeric_value: None },
            ]
        );
    }

    #[test]
    fn test_incomplete_submission_lists_prompts() {
        let w = walker(vec![
            question(1, QuestionKind::Text, true, 1),
            question(2, QuestionKind::Text, false, 2),
        ]);
        assert_matches!(
            w.submission(),
            Err(TriageError::Incomplete { missing }) if missing == vec!["Pregunta 1".to_string()]
        );
    }
}
