use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Local;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appointment_cell::services::BookingService;
use auth_cell::services::AuthService;
use doctor_cell::models::VisitType;
use doctor_cell::services::DoctorService;
use shared_api_client::ClinicApiClient;
use shared_config::ClientConfig;
use shared_models::Session;
use triage_cell::services::{Questionnaire, TriageService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic client");

    let config = ClientConfig::from_env();
    let (username, password) = match (&config.username, &config.password) {
        (Some(username), Some(password)) => (username.clone(), password.clone()),
        _ => bail!("CLINIC_USERNAME and CLINIC_PASSWORD must be set"),
    };

    let api = Arc::new(ClinicApiClient::new(&config).context("building HTTP client")?);
    info!("Using clinic API at {}", api.get_base_url());

    let auth = AuthService::new(Arc::clone(&api));
    let session = auth
        .login(&username, &password)
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;

    let result = show_day(&api, &session).await;
    auth.logout(&session).await;
    result
}

/// Prints the booking catalogue and today's schedule with triage state.
async fn show_day(api: &Arc<ClinicApiClient>, session: &Session) -> anyhow::Result<()> {
    let doctors = DoctorService::new(Arc::clone(api));
    let booking = BookingService::new(Arc::clone(api));
    let triage = TriageService::new(Arc::clone(api));

    let branches = doctors.list_branches(session).await?;
    info!("{} branches", branches.len());
    for branch in &branches {
        println!("Branch: {}", branch.name);
    }

    for visit_type in [VisitType::InPerson, VisitType::Virtual] {
        let specialties = doctors.list_specialties(visit_type, session).await?;
        let names: Vec<&str> = specialties.iter().map(|s| s.name.as_str()).collect();
        println!("Specialties ({}): {}", visit_type, names.join(", "));
    }

    let today = Local::now().date_naive();
    let appointments = booking.list_appointments(today, session).await?;
    println!("Appointments for {}: {}", today, appointments.len());

    for appointment in &appointments {
        let triage_state = match triage.load(appointment.id, session).await {
            Ok(Questionnaire::Completed(_)) => "triage done".to_string(),
            Ok(Questionnaire::Editable(walker)) => {
                format!("triage pending ({} questions)", walker.len())
            }
            Err(err) => {
                warn!("Could not load triage for {}: {}", appointment.id, err);
                "triage unknown".to_string()
            }
        };

        println!(
            "  {} {} with {} [{}, {}] {}",
            appointment.time.format("%H:%M"),
            appointment.patient_name,
            appointment.doctor_name,
            appointment.visit_type,
            appointment.status,
            triage_state
        );
    }

    Ok(())
}
