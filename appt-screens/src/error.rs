//! Error types for appt-screens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenError {
    /// Service layer error
    #[error("Service error: {0}")]
    Service(#[from] libappointly::AppointlyError),

    /// Async runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScreenError>;
