//! appt-screens library
//!
//! Screen state for the Appointly client, independent of any rendering
//! toolkit. A front end feeds [`Action`]s through [`reduce`] and draws the
//! resulting [`AppState`]; [`services::ServiceHandle`] runs the network-bound
//! work and reports back with more actions.

pub mod app;
pub mod error;
pub mod services;

// Re-export commonly used types
pub use app::{reduce, Action, AppState, Screen};
pub use error::{Result, ScreenError};
