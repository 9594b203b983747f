use std::sync::Arc;
use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_json, header, method, path};

use shared_api_client::ClinicApiClient;
use shared_models::ClientError;
use shared_utils::test_utils::{MockApiResponses, TestConfig, TestUser};
use triage_cell::models::TriageError;
use triage_cell::services::{Questionnaire, TriageService};

fn service_for(mock_server: &MockServer) -> TriageService {
    let config = TestConfig::with_url(mock_server.uri()).to_client_config();
    TriageService::new(Arc::new(ClinicApiClient::new(&config).unwrap()))
}

async fn mount_pending_status(mock_server: &MockServer, appointment_id: Uuid) {
    Mock::given(method("GET"))
        .and(path(format!("/api/triage/status/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockApiResponses::success(json!({
            "appointmentId": appointment_id,
            "completed": false,
            "completedAt": null
        }))))
        .mount(mock_server)
        .await;
}

async fn mount_questions(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/triage/questions"))
        .and(header("authorization", "Bearer test-session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockApiResponses::success(json!([
            MockApiResponses::triage_question(3, "Nivel de dolor", "scale", false, 3),
            MockApiResponses::triage_question(1, "Motivo principal", "text", true, 1),
            MockApiResponses::triage_question(2, "¿Tiene fiebre?", "yes_no", true, 2)
        ]))))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_load_pending_triage_returns_sorted_walker() {
    let mock_server = MockServer::start().await;
    let session = TestUser::default().to_session();
    let appointment_id = Uuid::new_v4();

    mount_pending_status(&mock_server, appointment_id).await;
    mount_questions(&mock_server).await;

    let questionnaire = service_for(&mock_server).load(appointment_id, &session).await.unwrap();

    let walker = questionnaire.walker().unwrap();
    assert_eq!(walker.appointment_id(), appointment_id);
    let ids: Vec<i64> = walker.questions().iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(walker.current().unwrap().prompt, "Motivo principal");
}

#[tokio::test]
async fn test_completed_triage_skips_question_fetch() {
    let mock_server = MockServer::start().await;
    let session = TestUser::default().to_session();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/triage/status/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockApiResponses::success(json!({
            "appointmentId": appointment_id,
            "completed": true,
            "completedAt": "2025-03-09T14:30:00Z"
        }))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/triage/questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockApiResponses::success(json!([]))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let questionnaire = service_for(&mock_server).load(appointment_id, &session).await.unwrap();

    assert_matches!(questionnaire, Questionnaire::Completed(status) if status.completed_at.is_some());
}

#[tokio::test]
async fn test_missing_status_record_means_pending() {
    let mock_server = MockServer::start().await;
    let session = TestUser::default().to_session();
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/triage/status/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(404).set_body_json(MockApiResponses::failure("Sin registro")))
        .mount(&mock_server)
        .await;
    mount_questions(&mock_server).await;

    let questionnaire = service_for(&mock_server).load(appointment_id, &session).await.unwrap();
    assert!(!questionnaire.is_completed());
}

#[tokio::test]
async fn test_incomplete_submission_sends_nothing() {
    let mock_server = MockServer::start().await;
    let session = TestUser::default().to_session();
    let appointment_id = Uuid::new_v4();

    mount_pending_status(&mock_server, appointment_id).await;
    mount_questions(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(format!("/api/triage/{}/answers", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockApiResponses::success(json!(null))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let mut questionnaire = service.load(appointment_id, &session).await.unwrap();
    questionnaire.walker_mut().unwrap().answer(1, "Dolor de garganta").unwrap();

    let result = service.submit(&mut questionnaire, &session).await;

    assert_matches!(
        result,
        Err(TriageError::Incomplete { missing }) if missing == vec!["¿Tiene fiebre?".to_string()]
    );
    assert!(!questionnaire.is_completed());
}

#[tokio::test]
async fn test_submit_posts_answered_subset_and_completes() {
    let mock_server = MockServer::start().await;
    let session = TestUser::default().to_session();
    let appointment_id = Uuid::new_v4();

    mount_pending_status(&mock_server, appointment_id).await;
    mount_questions(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(format!("/api/triage/{}/answers", appointment_id)))
        .and(body_json(json!({
            "answers": [
                { "questionId": 1, "value": "Dolor de garganta" },
                { "questionId": 2, "value": "No" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Triaje registrado",
            "data": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let mut questionnaire = service.load(appointment_id, &session).await.unwrap();
    {
        let walker = questionnaire.walker_mut().unwrap();
        walker.answer_current("Dolor de garganta").unwrap();
        walker.next().unwrap();
        walker.answer_current("no").unwrap();
    }

    service.submit(&mut questionnaire, &session).await.unwrap();

    assert_matches!(
        &questionnaire,
        Questionnaire::Completed(status) if status.completed && status.answers.len() == 2
    );

    // A completed questionnaire cannot be submitted again.
    assert_matches!(
        service.submit(&mut questionnaire, &session).await,
        Err(TriageError::AlreadyCompleted)
    );
}

#[tokio::test]
async fn test_server_rejection_keeps_questionnaire_editable() {
    let mock_server = MockServer::start().await;
    let session = TestUser::default().to_session();
    let appointment_id = Uuid::new_v4();

    mount_pending_status(&mock_server, appointment_id).await;
    mount_questions(&mock_server).await;

    Mock::given(method("POST"))
        .and(path(format!("/api/triage/{}/answers", appointment_id)))
        .respond_with(ResponseTemplate::new(500).set_body_json(MockApiResponses::failure("Error interno")))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let mut questionnaire = service.load(appointment_id, &session).await.unwrap();
    {
        let walker = questionnaire.walker_mut().unwrap();
        walker.answer(1, "Tos").unwrap();
        walker.answer(2, "yes").unwrap();
    }

    let err = service.submit(&mut questionnaire, &session).await.unwrap_err();

    assert_matches!(&err, TriageError::Client(ClientError::Server { status: Some(500), .. }));
    assert_eq!(err.user_message(), "Error interno");
    assert!(!questionnaire.is_completed());
}
