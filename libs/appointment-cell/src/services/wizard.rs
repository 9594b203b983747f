// libs/appointment-cell/src/services/wizard.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use shared_api_client::ClinicApiClient;
use shared_models::{ClientError, Session};
use doctor_cell::models::{find_available_slot, Branch, Doctor, Specialty, VisitType};
use doctor_cell::services::{AvailabilityService, DoctorService};
use patient_cell::models::{CreatePatientRequest, Patient};
use patient_cell::services::PatientService;

use crate::models::{
    BookAppointmentRequest, BookingAction, BookingStage, BookingState, Fetch, SubmitOutcome,
};
use crate::services::booking::BookingService;
use crate::services::reducer::{self, FetchKeys};

/// Drives one booking from an empty selection to a confirmed appointment.
///
/// All selection changes go through the reducer; the wizard only performs
/// the network calls the reducer's output asks for. Operations take
/// `&mut self`, so at most one request is in flight per wizard.
pub struct AppointmentWizard {
    session: Session,
    doctors: DoctorService,
    availability: AvailabilityService,
    patients: PatientService,
    booking: BookingService,
    state: BookingState,
}

impl AppointmentWizard {
    pub fn new(api: Arc<ClinicApiClient>, session: Session) -> Self {
        Self {
            session,
            doctors: DoctorService::new(Arc::clone(&api)),
            availability: AvailabilityService::new(Arc::clone(&api)),
            patients: PatientService::new(Arc::clone(&api)),
            booking: BookingService::new(api),
            state: BookingState::default(),
        }
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn stage(&self) -> BookingStage {
        reducer::stage(&self.state)
    }

    pub fn can_submit(&self) -> bool {
        reducer::can_submit(&self.state)
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        reducer::missing_fields(&self.state.selection)
    }

    pub fn selectable_slots(&self) -> Vec<NaiveTime> {
        reducer::selectable_slots(&self.state)
    }

    pub fn message(&self) -> Option<&str> {
        self.state.message.as_deref()
    }

    fn dispatch(&mut self, action: BookingAction) -> Option<Fetch> {
        let before = FetchKeys::of(&self.state.selection);
        let state = std::mem::take(&mut self.state);
        self.state = reducer::reduce(state, action);
        reducer::fetch_for(&before, &FetchKeys::of(&self.state.selection))
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        self.dispatch(BookingAction::Failed(err.user_message()));
        err
    }

    async fn dispatch_and_fetch(&mut self, action: BookingAction) -> Result<(), ClientError> {
        match self.dispatch(action) {
            Some(fetch) => self.run_fetch(fetch).await,
            None => Ok(()),
        }
    }

    async fn run_fetch(&mut self, fetch: Fetch) -> Result<(), ClientError> {
        debug!("Wizard loading {:?}", fetch);

        let loaded = match fetch {
            Fetch::Specialties(visit_type) => self
                .doctors
                .list_specialties(visit_type, &self.session)
                .await
                .map(BookingAction::SpecialtiesLoaded),
            Fetch::Doctors { specialty_id, branch_id } => self
                .doctors
                .list_doctors(specialty_id, branch_id, &self.session)
                .await
                .map(BookingAction::DoctorsLoaded),
            Fetch::Slots { doctor_id, date } => self
                .availability
                .list_slots(doctor_id, date, &self.session)
                .await
                .map(BookingAction::SlotsLoaded),
        };

        match loaded {
            Ok(action) => {
                self.dispatch(action);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Loads the branch list. Call once when the booking screen opens.
    pub async fn start(&mut self) -> Result<(), ClientError> {
        match self.doctors.list_branches(&self.session).await {
            Ok(branches) => {
                self.dispatch(BookingAction::BranchesLoaded(branches));
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Reloads every list the current selection depends on, e.g. after a
    /// connection error.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        for fetch in FetchKeys::of(&self.state.selection).fetches() {
            self.run_fetch(fetch).await?;
        }
        Ok(())
    }

    pub async fn set_visit_type(&mut self, visit_type: VisitType) -> Result<(), ClientError> {
        self.dispatch_and_fetch(BookingAction::SetVisitType(visit_type)).await
    }

    pub async fn set_specialty(&mut self, specialty: Specialty) -> Result<(), ClientError> {
        self.dispatch_and_fetch(BookingAction::SetSpecialty(specialty)).await
    }

    pub async fn set_branch(&mut self, branch: Branch) -> Result<(), ClientError> {
        self.dispatch_and_fetch(BookingAction::SetBranch(branch)).await
    }

    pub async fn set_doctor(&mut self, doctor: Doctor) -> Result<(), ClientError> {
        self.dispatch_and_fetch(BookingAction::SetDoctor(doctor)).await
    }

    pub async fn set_date(&mut self, date: NaiveDate) -> Result<(), ClientError> {
        self.dispatch_and_fetch(BookingAction::SetDate(date)).await
    }

    /// Returns whether the slot was accepted.
    pub fn select_slot(&mut self, time: NaiveTime) -> bool {
        self.dispatch(BookingAction::SelectSlot(time));
        self.state.selection.slot == Some(time)
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.dispatch(BookingAction::SetReason(reason.into()));
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.dispatch(BookingAction::SetNotes(notes.into()));
    }

    /// Looks the patient up. An unknown identifier is not an error: the
    /// lookup moves to `NotFound` and `create_patient` becomes the next step.
    pub async fn lookup_patient(&mut self, identifier: &str) -> Result<Option<Patient>, ClientError> {
        self.dispatch(BookingAction::ClearPatient);

        match self.patients.find_by_identifier(identifier, &self.session).await {
            Ok(Some(patient)) => {
                self.dispatch(BookingAction::PatientFound(patient.clone()));
                Ok(Some(patient))
            }
            Ok(None) => {
                info!("No patient registered for the entered identifier");
                self.dispatch(BookingAction::PatientNotFound(identifier.to_string()));
                Ok(None)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub async fn create_patient(&mut self, request: CreatePatientRequest) -> Result<Patient, ClientError> {
        match self.patients.create_patient(request, &self.session).await {
            Ok(patient) => {
                self.dispatch(BookingAction::PatientFound(patient.clone()));
                Ok(patient)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Re-checks the slot and sends the booking.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ClientError> {
        if self.state.confirmation.is_some() {
            return Err(ClientError::validation("This appointment has already been booked"));
        }

        let request = match BookAppointmentRequest::from_selection(&self.state.selection) {
            Some(request) if self.can_submit() => request,
            _ => {
                let err = ClientError::Validation(format!(
                    "Please complete: {}",
                    self.missing_fields().join(", ")
                ));
                return Err(self.fail(err));
            }
        };

        let fresh = match self
            .availability
            .list_slots(request.doctor_id, request.date, &self.session)
            .await
        {
            Ok(slots) => slots,
            Err(err) => return Err(self.fail(err)),
        };

        if find_available_slot(&fresh, request.time).is_none() {
            warn!(
                "Slot {} on {} is no longer available for doctor {}",
                request.time.format("%H:%M"),
                request.date,
                request.doctor_id
            );
            self.dispatch(BookingAction::SlotTaken(fresh));
            return Ok(SubmitOutcome::SlotTaken);
        }
        self.dispatch(BookingAction::SlotsLoaded(fresh));

        match self.booking.create_booking(&request, &self.session).await {
            Ok(confirmation) => {
                self.dispatch(BookingAction::Submitted(confirmation.clone()));
                Ok(SubmitOutcome::Booked(confirmation))
            }
            Err(ClientError::Server { status: Some(409), message }) => {
                // Someone booked the slot between the re-check and the post.
                warn!("Booking conflict reported by server: {}", message);
                match self
                    .availability
                    .list_slots(request.doctor_id, request.date, &self.session)
                    .await
                {
                    Ok(fresh) => {
                        self.dispatch(BookingAction::SlotTaken(fresh));
                        Ok(SubmitOutcome::SlotTaken)
                    }
                    Err(err) => {
                        // The slot is gone either way; the list stays empty
                        // until `reload` succeeds.
                        self.dispatch(BookingAction::SlotTaken(Vec::new()));
                        Err(self.fail(err))
                    }
                }
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Discards the selection, keeping the loaded branch list.
    pub fn reset(&mut self) {
        self.dispatch(BookingAction::Reset);
    }
}
