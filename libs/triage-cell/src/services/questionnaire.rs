use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_api_client::ClinicApiClient;
use shared_models::{ClientError, Session};

use crate::models::{TriageError, TriageQuestion, TriageStatus};
use crate::services::walker::TriageWalker;

/// A triage questionnaire is either still being filled in or already on
/// record; a completed one cannot be edited.
#[derive(Debug, Clone)]
pub enum Questionnaire {
    Editable(TriageWalker),
    Completed(TriageStatus),
}

impl Questionnaire {
    pub fn is_completed(&self) -> bool {
        matches!(self, Questionnaire::Completed(_))
    }

    pub fn walker(&self) -> Option<&TriageWalker> {
        match self {
            Questionnaire::Editable(walker) => Some(walker),
            Questionnaire::Completed(_) => None,
        }
    }

    pub fn walker_mut(&mut self) -> Option<&mut TriageWalker> {
        match self {
            Questionnaire::Editable(walker) => Some(walker),
            Questionnaire::Completed(_) => None,
        }
    }
}

pub struct TriageService {
    api: Arc<ClinicApiClient>,
}

impl TriageService {
    pub fn new(api: Arc<ClinicApiClient>) -> Self {
        Self { api }
    }

    /// Triage status for an appointment. No record on the server means the
    /// questionnaire has not been started.
    pub async fn get_status(
        &self,
        appointment_id: Uuid,
        session: &Session,
    ) -> Result<TriageStatus, ClientError> {
        debug!("Fetching triage status for appointment {}", appointment_id);

        let path = format!("/api/triage/status/{}", appointment_id);
        let status: Option<TriageStatus> = self
            .api
            .request_optional(Method::GET, &path, Some(session.token()), None)
            .await?;

        Ok(status.unwrap_or(TriageStatus {
            appointment_id,
            completed: false,
            completed_at: None,
            answers: Vec::new(),
        }))
    }

    pub async fn list_questions(&self, session: &Session) -> Result<Vec<TriageQuestion>, ClientError> {
        debug!("Fetching triage questions");

        let mut questions: Vec<TriageQuestion> = self
            .api
            .request(Method::GET, "/api/triage/questions", Some(session.token()), None)
            .await?;

        questions.sort_by_key(|q| q.order);
        Ok(questions)
    }

    /// Opens the questionnaire for an appointment. Questions are only fetched
    /// when the triage is still pending.
    pub async fn load(&self, appointment_id: Uuid, session: &Session) -> Result<Questionnaire, TriageError> {
        let status = self.get_status(appointment_id, session).await?;

        if status.completed {
            info!("Triage already completed for appointment {}", appointment_id);
            return Ok(Questionnaire::Completed(status));
        }

        let questions = self.list_questions(session).await?;
        Ok(Questionnaire::Editable(TriageWalker::new(appointment_id, questions)))
    }

    /// Sends the answered questions. Nothing is sent while a required
    /// question is unanswered.
    pub async fn submit(
        &self,
        questionnaire: &mut Questionnaire,
        session: &Session,
    ) -> Result<(), TriageError> {
        let walker = match questionnaire {
            Questionnaire::Editable(walker) => walker,
            Questionnaire::Completed(_) => return Err(TriageError::AlreadyCompleted),
        };

        let submission = walker.submission()?;
        let path = format!("/api/triage/{}/answers", submission.appointment_id);

        debug!(
            "Submitting {} triage answers for appointment {}",
            submission.answers.len(),
            submission.appointment_id
        );

        self.api
            .request_ack(
                Method::POST,
                &path,
                Some(session.token()),
                Some(json!({ "answers": submission.answers })),
            )
            .await?;

        info!("Triage completed for appointment {}", submission.appointment_id);

        *questionnaire = Questionnaire::Completed(TriageStatus {
            appointment_id: submission.appointment_id,
            completed: true,
            completed_at: Some(Utc::now()),
            answers: submission.answers,
        });

        Ok(())
    }
}
