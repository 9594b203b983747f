pub mod auth;
pub mod envelope;
pub mod error;

pub use auth::{Session, User, UserRole};
pub use envelope::ApiResponse;
pub use error::ClientError;
