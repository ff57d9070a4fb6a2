//! Appointly - client core for appointment booking
//!
//! Form validation, profile and avatar submission, sign-up, provider
//! listing and the session store shared by the screen and CLI front ends.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod session;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppointlyError, Result};
pub use service::{BookingService, SubmissionError};
pub use session::SessionStore;
pub use types::{Provider, Session, UserProfile};
pub use validation::{FormData, Schema, ValidationErrorSet};
