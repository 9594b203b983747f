pub mod booking;
pub mod reducer;
pub mod wizard;

pub use booking::BookingService;
pub use wizard::AppointmentWizard;
