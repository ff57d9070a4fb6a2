//! Actions for the reducer
//!
//! Every state change is described by an action. User input produces the
//! `*Requested`/`*Changed` variants; [`crate::services::ServiceHandle`]
//! produces the outcome variants once the async work resolves.

use chrono::{DateTime, Utc};
use libappointly::{Provider, SubmissionError, UserProfile};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // === Navigation ===
    NavigateTo(Screen),

    /// Enter the booking screen for one provider
    OpenCreateAppointment { provider_id: String },

    /// Leave the current screen
    GoBack,

    // === Provider list ===
    ProvidersRequested,
    ProvidersLoaded(Vec<Provider>),
    ProvidersFailed(String),

    // === Appointment selection ===
    SelectProvider(String),
    SelectDate(DateTime<Utc>),
    ToggleDatePicker,

    /// The date picker closed; `None` means it was dismissed
    DatePicked(Option<DateTime<Utc>>),

    // === Profile ===
    ProfileFieldChanged { field: ProfileField, value: String },
    ProfileSubmitStarted,
    ProfileSubmitSucceeded(UserProfile),
    ProfileSubmitFailed(SubmissionError),
    AvatarUploadStarted,
    AvatarUpdated(UserProfile),
    AvatarFailed(SubmissionError),

    /// The picker was dismissed; nothing changes
    AvatarCancelled,

    // === Sign-up ===
    SignUpFieldChanged { field: SignUpField, value: String },
    SignUpSubmitStarted,
    SignUpSucceeded(UserProfile),
    SignUpFailed(SubmissionError),

    // === Session ===
    SignedOut,

    // === Alerts / status ===
    DismissAlert,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    CreateAppointment,
    Profile,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Email,
    OldPassword,
    Password,
    PasswordConfirmation,
}

impl ProfileField {
    /// Key used for this field in validation errors
    pub fn key(self) -> &'static str {
        use libappointly::types::fields;
        match self {
            ProfileField::Name => fields::NAME,
            ProfileField::Email => fields::EMAIL,
            ProfileField::OldPassword => fields::OLD_PASSWORD,
            ProfileField::Password => fields::PASSWORD,
            ProfileField::PasswordConfirmation => fields::PASSWORD_CONFIRMATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpField {
    Name,
    Email,
    Password,
}

impl SignUpField {
    pub fn key(self) -> &'static str {
        use libappointly::types::fields;
        match self {
            SignUpField::Name => fields::NAME,
            SignUpField::Email => fields::EMAIL,
            SignUpField::Password => fields::PASSWORD,
        }
    }
}
