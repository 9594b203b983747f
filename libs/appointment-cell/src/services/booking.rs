// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use tracing::{debug, info};

use shared_api_client::ClinicApiClient;
use shared_models::{ClientError, Session};

use crate::models::{AppointmentConfirmation, AppointmentSummary, BookAppointmentRequest};

pub struct BookingService {
    api: Arc<ClinicApiClient>,
}

impl BookingService {
    pub fn new(api: Arc<ClinicApiClient>) -> Self {
        Self { api }
    }

    pub async fn create_booking(
        &self,
        request: &BookAppointmentRequest,
        session: &Session,
    ) -> Result<AppointmentConfirmation, ClientError> {
        info!(
            "Booking appointment with doctor {} on {} at {}",
            request.doctor_id,
            request.date,
            request.time.format("%H:%M")
        );

        let body = serde_json::to_value(request)?;
        let confirmation: AppointmentConfirmation = self
            .api
            .request(Method::POST, "/api/appointments", Some(session.token()), Some(body))
            .await?;

        info!("Appointment {} confirmed", confirmation.appointment_id);
        Ok(confirmation)
    }

    /// Appointments for the schedule screen, ordered by time.
    pub async fn list_appointments(
        &self,
        date: NaiveDate,
        session: &Session,
    ) -> Result<Vec<AppointmentSummary>, ClientError> {
        debug!("Fetching appointments for {}", date);

        let path = format!("/api/appointments?date={}", date.format("%Y-%m-%d"));
        let mut appointments: Vec<AppointmentSummary> = self
            .api
            .request(Method::GET, &path, Some(session.token()), None)
            .await?;

        appointments.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.doctor_name.cmp(&b.doctor_name)));
        Ok(appointments)
    }
}
