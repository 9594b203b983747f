// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveTime};
use std::fmt;

use doctor_cell::models::{slot_time, Branch, Doctor, Specialty, TimeSlot, VisitType};
use patient_cell::models::Patient;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[serde(alias = "pending")]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub identifier: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id: Uuid,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMeeting {
    pub url: String,
    pub access_code: Option<String>,
}

/// Server-confirmed booking, read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentConfirmation {
    pub appointment_id: Uuid,
    pub patient: PatientSummary,
    pub doctor: DoctorSummary,
    pub specialty: Option<String>,
    pub branch: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "slot_time")]
    pub time: NaiveTime,
    pub visit_type: VisitType,
    pub status: AppointmentStatus,
    pub virtual_meeting: Option<VirtualMeeting>,
}

impl AppointmentConfirmation {
    pub fn summary_text(&self) -> String {
        let mut text = format!(
            "Appointment for {} with {} on {} at {}",
            self.patient.full_name,
            self.doctor.full_name,
            self.date.format("%Y-%m-%d"),
            self.time.format("%H:%M")
        );

        if let Some(branch) = &self.branch {
            if self.visit_type == VisitType::InPerson {
                text.push_str(&format!(" ({})", branch));
            }
        }

        if let Some(meeting) = &self.virtual_meeting {
            text.push_str(&format!(". Join at {}", meeting.url));
            if let Some(code) = &meeting.access_code {
                text.push_str(&format!(" (code {})", code));
            }
        }

        text
    }
}

/// One row of the daily schedule screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: NaiveDate,
    #[serde(with = "slot_time")]
    pub time: NaiveTime,
    pub visit_type: VisitType,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub triage_completed: bool,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub patient_identifier: String,
    pub doctor_id: Uuid,
    pub specialty_id: Uuid,
    pub branch_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "slot_time")]
    pub time: NaiveTime,
    pub visit_type: VisitType,
    pub reason: String,
    pub notes: Option<String>,
}

impl BookAppointmentRequest {
    /// Builds the composite request from a complete selection.
    pub fn from_selection(selection: &BookingSelection) -> Option<Self> {
        let patient = selection.patient.found()?;
        let reason = selection.reason.as_ref()?.trim();
        if reason.is_empty() {
            return None;
        }

        Some(Self {
            patient_identifier: patient.identifier.clone(),
            doctor_id: selection.doctor.as_ref()?.id,
            specialty_id: selection.specialty.as_ref()?.id,
            branch_id: selection.branch.as_ref()?.id,
            date: selection.date?,
            time: selection.slot?,
            visit_type: selection.visit_type.unwrap_or_default(),
            reason: reason.to_string(),
            notes: selection
                .notes
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }
}

// ==============================================================================
// BOOKING WIZARD STATE
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PatientLookup {
    #[default]
    NotSearched,
    Found(Patient),
    /// Nobody is registered under the identifier; the next step is to
    /// register a new patient.
    NotFound { identifier: String },
}

impl PatientLookup {
    pub fn found(&self) -> Option<&Patient> {
        match self {
            PatientLookup::Found(patient) => Some(patient),
            _ => None,
        }
    }

    pub fn offers_registration(&self) -> bool {
        matches!(self, PatientLookup::NotFound { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingSelection {
    pub visit_type: Option<VisitType>,
    pub specialty: Option<Specialty>,
    pub branch: Option<Branch>,
    pub doctor: Option<Doctor>,
    pub date: Option<NaiveDate>,
    pub slot: Option<NaiveTime>,
    pub patient: PatientLookup,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingState {
    pub selection: BookingSelection,
    pub specialties: Vec<Specialty>,
    pub branches: Vec<Branch>,
    pub doctors: Vec<Doctor>,
    pub slots: Vec<TimeSlot>,
    /// Last user-facing message; cleared by the next accepted action.
    pub message: Option<String>,
    pub confirmation: Option<AppointmentConfirmation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BookingStage {
    Idle,
    TypeChosen,
    SpecialtyAndBranchChosen,
    DoctorChosen,
    SlotChosen,
    PatientResolved,
    Submittable,
    Submitted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    SetVisitType(VisitType),
    SpecialtiesLoaded(Vec<Specialty>),
    BranchesLoaded(Vec<Branch>),
    SetSpecialty(Specialty),
    SetBranch(Branch),
    DoctorsLoaded(Vec<Doctor>),
    SetDoctor(Doctor),
    SetDate(NaiveDate),
    SlotsLoaded(Vec<TimeSlot>),
    SelectSlot(NaiveTime),
    /// The chosen slot was booked by someone else; carries the fresh list.
    SlotTaken(Vec<TimeSlot>),
    PatientFound(Patient),
    PatientNotFound(String),
    ClearPatient,
    SetReason(String),
    SetNotes(String),
    Failed(String),
    Submitted(AppointmentConfirmation),
    Reset,
}

/// A list the wizard has to (re)load after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Specialties(VisitType),
    Doctors { specialty_id: Uuid, branch_id: Uuid },
    Slots { doctor_id: Uuid, date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Booked(AppointmentConfirmation),
    /// The slot was taken between selection and submission. The slot list
    /// has been refreshed and the user has to pick again.
    SlotTaken,
}
