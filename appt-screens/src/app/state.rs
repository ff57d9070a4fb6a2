//! Application state
//!
//! Plain values; every transition goes through the reducer.

use chrono::{DateTime, Utc};
use libappointly::types::{ProfileForm, SignUpForm};
use libappointly::{Config, Provider, UserProfile, ValidationErrorSet};

use super::actions::Screen;

/// Root application state
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub current_screen: Screen,

    /// Signed-in user, mirrored from the session store
    pub user: Option<UserProfile>,

    pub dashboard: DashboardState,

    /// Present while the booking screen is open
    pub appointment: Option<CreateAppointmentState>,

    pub profile: ProfileScreenState,

    pub sign_up: SignUpState,

    /// Modal alert awaiting dismissal
    pub alert: Option<Alert>,

    /// Status line message
    pub status: Option<String>,

    /// Close the date picker as soon as a date is picked
    pub auto_close_date_picker: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub providers: Vec<Provider>,
    pub loading: bool,
}

/// Provider and date chosen on the booking screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    /// Starts as the id the screen was opened with; not checked against the
    /// provider list
    pub selected_provider_id: String,
    pub selected_date: DateTime<Utc>,
    pub date_picker_visible: bool,
}

impl SelectionState {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self::at(provider_id, Utc::now())
    }

    pub fn at(provider_id: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            selected_provider_id: provider_id.into(),
            selected_date: date,
            date_picker_visible: false,
        }
    }
}

/// Booking screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAppointmentState {
    pub selection: SelectionState,

    /// Snapshot of the last provider fetch, in server order
    pub providers: Vec<Provider>,

    pub loading: bool,
}

impl CreateAppointmentState {
    /// Open the screen for `provider_id`
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            selection: SelectionState::new(provider_id),
            providers: Vec::new(),
            loading: false,
        }
    }
}

/// One entry of the horizontal provider picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRow {
    pub provider: Provider,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileScreenState {
    pub form: ProfileForm,
    pub field_errors: ValidationErrorSet,
    pub submitting: bool,
    pub uploading_avatar: bool,
}

impl ProfileScreenState {
    pub fn for_user(user: &UserProfile) -> Self {
        Self {
            form: ProfileForm::from_profile(user),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpState {
    pub form: SignUpForm,
    pub field_errors: ValidationErrorSet,
    pub submitting: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_screen: Screen::SignUp,
            user: None,
            dashboard: DashboardState::default(),
            appointment: None,
            profile: ProfileScreenState::default(),
            sign_up: SignUpState::default(),
            alert: None,
            status: None,
            auto_close_date_picker: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state for a session: the dashboard when signed in, sign-up
    /// otherwise
    pub fn for_session(user: Option<UserProfile>, config: &Config) -> Self {
        let (current_screen, profile) = match &user {
            Some(user) => (Screen::Dashboard, ProfileScreenState::for_user(user)),
            None => (Screen::SignUp, ProfileScreenState::default()),
        };

        Self {
            current_screen,
            user,
            profile,
            auto_close_date_picker: config.ui.auto_close_date_picker,
            ..Self::default()
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}
