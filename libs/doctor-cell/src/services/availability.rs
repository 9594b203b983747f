use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use shared_api_client::ClinicApiClient;
use shared_models::{ClientError, Session};

use crate::models::TimeSlot;

pub struct AvailabilityService {
    api: Arc<ClinicApiClient>,
}

impl AvailabilityService {
    pub fn new(api: Arc<ClinicApiClient>) -> Self {
        Self { api }
    }

    /// Slots for a doctor on a date, sorted by time. Taken slots are kept in
    /// the list so the screen can show them greyed out.
    pub async fn list_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        session: &Session,
    ) -> Result<Vec<TimeSlot>, ClientError> {
        debug!("Fetching slots for doctor {} on {}", doctor_id, date);

        let path = format!(
            "/api/doctors/{}/slots?date={}",
            doctor_id,
            date.format("%Y-%m-%d")
        );

        let mut slots: Vec<TimeSlot> = self
            .api
            .request(Method::GET, &path, Some(session.token()), None)
            .await?;

        slots.sort_by_key(|slot| slot.time);
        slots.dedup_by_key(|slot| slot.time);

        debug!(
            "Doctor {} has {} of {} slots open on {}",
            doctor_id,
            slots.iter().filter(|s| s.available).count(),
            slots.len(),
            date
        );

        Ok(slots)
    }
}
