// libs/appointment-cell/src/services/reducer.rs
//
// Every change to the booking selection goes through `reduce`. Downstream
// selections are cleared whenever an upstream field changes, and
// `fetch_for` decides from the before/after keys which list has to be
// reloaded.
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use doctor_cell::models::{find_available_slot, VisitType};

use crate::models::{
    BookingAction, BookingSelection, BookingStage, BookingState, Fetch, PatientLookup,
};

pub const SLOT_UNAVAILABLE_MESSAGE: &str = "The selected time is not available. Please choose another one.";
pub const SLOT_TAKEN_MESSAGE: &str = "The selected time was just booked by someone else. Please choose another one.";

pub fn reduce(mut state: BookingState, action: BookingAction) -> BookingState {
    // A submitted booking is read-only until the wizard is reset.
    if state.confirmation.is_some() && !matches!(action, BookingAction::Reset) {
        return state;
    }

    match action {
        BookingAction::SetVisitType(visit_type) => {
            state.message = None;
            if state.selection.visit_type != Some(visit_type) {
                state.selection.visit_type = Some(visit_type);
                state.selection.specialty = None;
                state.specialties.clear();
                clear_doctor(&mut state);
            }
        }
        BookingAction::SpecialtiesLoaded(specialties) => {
            state.specialties = specialties;
        }
        BookingAction::BranchesLoaded(branches) => {
            state.branches = branches;
        }
        BookingAction::SetSpecialty(specialty) => {
            state.message = None;
            if state.selection.specialty.as_ref().map(|s| s.id) != Some(specialty.id) {
                state.selection.specialty = Some(specialty);
                clear_doctor(&mut state);
            }
        }
        BookingAction::SetBranch(branch) => {
            state.message = None;
            if state.selection.branch.as_ref().map(|b| b.id) != Some(branch.id) {
                state.selection.branch = Some(branch);
                clear_doctor(&mut state);
            }
        }
        BookingAction::DoctorsLoaded(doctors) => {
            state.doctors = doctors;
        }
        BookingAction::SetDoctor(doctor) => {
            state.message = None;
            if state.selection.doctor.as_ref().map(|d| d.id) != Some(doctor.id) {
                state.selection.doctor = Some(doctor);
                clear_slot(&mut state);
            }
        }
        BookingAction::SetDate(date) => {
            state.message = None;
            if state.selection.date != Some(date) {
                state.selection.date = Some(date);
                clear_slot(&mut state);
            }
        }
        BookingAction::SlotsLoaded(slots) => {
            if let Some(time) = state.selection.slot {
                if find_available_slot(&slots, time).is_none() {
                    state.selection.slot = None;
                }
            }
            state.slots = slots;
        }
        BookingAction::SelectSlot(time) => {
            if find_available_slot(&state.slots, time).is_some() {
                state.selection.slot = Some(time);
                state.message = None;
            } else {
                state.message = Some(SLOT_UNAVAILABLE_MESSAGE.to_string());
            }
        }
        BookingAction::SlotTaken(fresh) => {
            state.selection.slot = None;
            state.slots = fresh;
            state.message = Some(SLOT_TAKEN_MESSAGE.to_string());
        }
        BookingAction::PatientFound(patient) => {
            state.message = None;
            state.selection.patient = PatientLookup::Found(patient);
        }
        BookingAction::PatientNotFound(identifier) => {
            state.message = None;
            state.selection.patient = PatientLookup::NotFound {
                identifier: identifier.trim().to_string(),
            };
        }
        BookingAction::ClearPatient => {
            state.selection.patient = PatientLookup::NotSearched;
        }
        BookingAction::SetReason(reason) => {
            state.message = None;
            state.selection.reason = non_blank(reason);
        }
        BookingAction::SetNotes(notes) => {
            state.selection.notes = non_blank(notes);
        }
        BookingAction::Failed(message) => {
            state.message = Some(message);
        }
        BookingAction::Submitted(confirmation) => {
            state.message = None;
            state.confirmation = Some(confirmation);
        }
        BookingAction::Reset => {
            let branches = std::mem::take(&mut state.branches);
            state = BookingState {
                branches,
                ..BookingState::default()
            };
        }
    }

    state
}

fn clear_doctor(state: &mut BookingState) {
    state.selection.doctor = None;
    state.doctors.clear();
    clear_slot(state);
}

fn clear_slot(state: &mut BookingState) {
    state.selection.slot = None;
    state.slots.clear();
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// The selection fields that drive list loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchKeys {
    visit_type: Option<VisitType>,
    specialty_id: Option<Uuid>,
    branch_id: Option<Uuid>,
    doctor_id: Option<Uuid>,
    date: Option<NaiveDate>,
}

impl FetchKeys {
    pub fn of(selection: &BookingSelection) -> Self {
        Self {
            visit_type: selection.visit_type,
            specialty_id: selection.specialty.as_ref().map(|s| s.id),
            branch_id: selection.branch.as_ref().map(|b| b.id),
            doctor_id: selection.doctor.as_ref().map(|d| d.id),
            date: selection.date,
        }
    }

    /// Every list the current keys allow, upstream first.
    pub fn fetches(&self) -> Vec<Fetch> {
        let mut fetches = Vec::new();
        if let Some(visit_type) = self.visit_type {
            fetches.push(Fetch::Specialties(visit_type));
        }
        if let Some(fetch) = self.doctors_fetch() {
            fetches.push(fetch);
        }
        if let Some(fetch) = self.slots_fetch() {
            fetches.push(fetch);
        }
        fetches
    }

    fn doctors_fetch(&self) -> Option<Fetch> {
        Some(Fetch::Doctors {
            specialty_id: self.specialty_id?,
            branch_id: self.branch_id?,
        })
    }

    fn slots_fetch(&self) -> Option<Fetch> {
        Some(Fetch::Slots {
            doctor_id: self.doctor_id?,
            date: self.date?,
        })
    }
}

/// The list to reload after the selection moved from `before` to `after`.
pub fn fetch_for(before: &FetchKeys, after: &FetchKeys) -> Option<Fetch> {
    if before.visit_type != after.visit_type {
        if let Some(visit_type) = after.visit_type {
            return Some(Fetch::Specialties(visit_type));
        }
    }

    if (before.specialty_id, before.branch_id) != (after.specialty_id, after.branch_id) {
        if let Some(fetch) = after.doctors_fetch() {
            return Some(fetch);
        }
    }

    if (before.doctor_id, before.date) != (after.doctor_id, after.date) {
        return after.slots_fetch();
    }

    None
}

/// Names of the fields still needed before the booking can be sent.
pub fn missing_fields(selection: &BookingSelection) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if selection.specialty.is_none() {
        missing.push("specialty");
    }
    if selection.branch.is_none() {
        missing.push("branch");
    }
    if selection.doctor.is_none() {
        missing.push("doctor");
    }
    if selection.slot.is_none() {
        missing.push("time slot");
    }
    if selection.patient.found().is_none() {
        missing.push("patient");
    }
    if selection.reason.as_deref().map(str::trim).unwrap_or("").is_empty() {
        missing.push("reason");
    }
    missing
}

pub fn can_submit(state: &BookingState) -> bool {
    state.confirmation.is_none() && missing_fields(&state.selection).is_empty()
}

pub fn stage(state: &BookingState) -> BookingStage {
    let selection = &state.selection;

    if state.confirmation.is_some() {
        BookingStage::Submitted
    } else if can_submit(state) {
        BookingStage::Submittable
    } else if selection.slot.is_some() && selection.patient.found().is_some() {
        BookingStage::PatientResolved
    } else if selection.slot.is_some() {
        BookingStage::SlotChosen
    } else if selection.doctor.is_some() {
        BookingStage::DoctorChosen
    } else if selection.specialty.is_some() && selection.branch.is_some() {
        BookingStage::SpecialtyAndBranchChosen
    } else if selection.visit_type.is_some() {
        BookingStage::TypeChosen
    } else {
        BookingStage::Idle
    }
}

/// Times the user may pick right now.
pub fn selectable_slots(state: &BookingState) -> Vec<NaiveTime> {
    state
        .slots
        .iter()
        .filter(|slot| slot.available)
        .map(|slot| slot.time)
        .collect()
}
