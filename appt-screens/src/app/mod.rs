//! Application module
//!
//! - Actions: what can happen
//! - State: what is true right now
//! - Reducer: pure `(State, Action) -> State`

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::{Action, ProfileField, Screen, SignUpField};
pub use reducer::{date_picked, provider_rows, reduce, select_date, select_provider, toggle_date_picker};
pub use state::{
    Alert, AppState, CreateAppointmentState, DashboardState, ProfileScreenState, ProviderRow,
    SelectionState, SignUpState,
};
