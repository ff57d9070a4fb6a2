//! Pure reducer
//!
//! `(State, Action) -> State` with no I/O. Network work happens in
//! [`crate::services`] and comes back as outcome actions.

use chrono::{DateTime, Utc};
use libappointly::service::submission::messages;
use libappointly::{Provider, SubmissionError, UserProfile};

use super::actions::{Action, ProfileField, Screen, SignUpField};
use super::state::{
    Alert, AppState, CreateAppointmentState, DashboardState, ProfileScreenState, ProviderRow,
    SelectionState, SignUpState,
};

// ============================================================================
// Selection transitions
// ============================================================================

/// Select a provider. Selecting the current provider again changes nothing.
pub fn select_provider(state: SelectionState, provider_id: impl Into<String>) -> SelectionState {
    SelectionState {
        selected_provider_id: provider_id.into(),
        ..state
    }
}

pub fn select_date(state: SelectionState, date: DateTime<Utc>) -> SelectionState {
    SelectionState {
        selected_date: date,
        ..state
    }
}

pub fn toggle_date_picker(state: SelectionState) -> SelectionState {
    SelectionState {
        date_picker_visible: !state.date_picker_visible,
        ..state
    }
}

/// Apply the result of the date picker.
///
/// With `auto_close_on_select` the picker is hidden first. A dismissed picker
/// (`None`) leaves the selected date alone.
pub fn date_picked(
    state: SelectionState,
    date: Option<DateTime<Utc>>,
    auto_close_on_select: bool,
) -> SelectionState {
    let state = if auto_close_on_select {
        SelectionState {
            date_picker_visible: false,
            ..state
        }
    } else {
        state
    };

    match date {
        Some(date) => select_date(state, date),
        None => state,
    }
}

/// Render model for the provider picker; at most one row is selected
pub fn provider_rows(providers: &[Provider], state: &SelectionState) -> Vec<ProviderRow> {
    providers
        .iter()
        .map(|provider| ProviderRow {
            provider: provider.clone(),
            selected: provider.id == state.selected_provider_id,
        })
        .collect()
}

// ============================================================================
// Reducer
// ============================================================================

pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        // === Navigation ===
        Action::NavigateTo(Screen::Profile) => {
            let profile = match &state.user {
                Some(user) => ProfileScreenState::for_user(user),
                None => ProfileScreenState::default(),
            };
            AppState {
                current_screen: Screen::Profile,
                profile,
                ..state
            }
        }

        Action::NavigateTo(screen) => AppState {
            current_screen: screen,
            ..state
        },

        Action::OpenCreateAppointment { provider_id } => AppState {
            current_screen: Screen::CreateAppointment,
            appointment: Some(CreateAppointmentState::new(provider_id)),
            ..state
        },

        Action::GoBack => go_back(state),

        // === Provider list ===
        Action::ProvidersRequested => AppState {
            dashboard: DashboardState {
                loading: true,
                ..state.dashboard
            },
            appointment: state.appointment.map(|appointment| CreateAppointmentState {
                loading: true,
                ..appointment
            }),
            ..state
        },

        Action::ProvidersLoaded(providers) => AppState {
            dashboard: DashboardState {
                providers: providers.clone(),
                loading: false,
            },
            appointment: state.appointment.map(|appointment| CreateAppointmentState {
                providers,
                loading: false,
                ..appointment
            }),
            ..state
        },

        Action::ProvidersFailed(error) => AppState {
            dashboard: DashboardState::default(),
            appointment: state.appointment.map(|appointment| CreateAppointmentState {
                providers: Vec::new(),
                loading: false,
                ..appointment
            }),
            status: Some(format!("Could not load providers: {}", error)),
            ..state
        },

        // === Appointment selection ===
        Action::SelectProvider(provider_id) => {
            with_selection(state, |selection, _| select_provider(selection, provider_id))
        }

        Action::SelectDate(date) => with_selection(state, |selection, _| select_date(selection, date)),

        Action::ToggleDatePicker => with_selection(state, |selection, _| toggle_date_picker(selection)),

        Action::DatePicked(date) => {
            with_selection(state, |selection, auto_close| date_picked(selection, date, auto_close))
        }

        // === Profile ===
        Action::ProfileFieldChanged { field, value } => {
            let mut profile = state.profile;
            let slot = match field {
                ProfileField::Name => &mut profile.form.name,
                ProfileField::Email => &mut profile.form.email,
                ProfileField::OldPassword => &mut profile.form.old_password,
                ProfileField::Password => &mut profile.form.password,
                ProfileField::PasswordConfirmation => &mut profile.form.password_confirmation,
            };
            *slot = value;
            AppState { profile, ..state }
        }

        Action::ProfileSubmitStarted => AppState {
            profile: ProfileScreenState {
                field_errors: Default::default(),
                submitting: true,
                ..state.profile
            },
            ..state
        },

        Action::ProfileSubmitSucceeded(user) => AppState {
            current_screen: Screen::Dashboard,
            profile: ProfileScreenState::for_user(&user),
            user: Some(user),
            alert: Some(Alert {
                title: messages::PROFILE_UPDATED.to_string(),
                message: None,
            }),
            ..state
        },

        Action::ProfileSubmitFailed(error) => {
            let state = AppState {
                profile: ProfileScreenState {
                    submitting: false,
                    ..state.profile
                },
                ..state
            };
            match error {
                SubmissionError::Validation(errors) => AppState {
                    profile: ProfileScreenState {
                        field_errors: errors,
                        ..state.profile
                    },
                    ..state
                },
                other => apply_failure(state, other),
            }
        }

        Action::AvatarUploadStarted => AppState {
            profile: ProfileScreenState {
                uploading_avatar: true,
                ..state.profile
            },
            ..state
        },

        Action::AvatarUpdated(user) => with_user(avatar_settled(state), user),

        Action::AvatarFailed(error) => apply_failure(avatar_settled(state), error),

        Action::AvatarCancelled => avatar_settled(state),

        // === Sign-up ===
        Action::SignUpFieldChanged { field, value } => {
            let mut sign_up = state.sign_up;
            match field {
                SignUpField::Name => sign_up.form.name = value,
                SignUpField::Email => sign_up.form.email = value,
                SignUpField::Password => sign_up.form.password = value,
            }
            AppState { sign_up, ..state }
        }

        Action::SignUpSubmitStarted => AppState {
            sign_up: SignUpState {
                field_errors: Default::default(),
                submitting: true,
                ..state.sign_up
            },
            ..state
        },

        Action::SignUpSucceeded(user) => AppState {
            sign_up: SignUpState::default(),
            alert: Some(Alert {
                title: "Account created".to_string(),
                message: Some(format!("Welcome, {}! Your account is ready.", user.name)),
            }),
            ..state
        },

        Action::SignUpFailed(error) => {
            let state = AppState {
                sign_up: SignUpState {
                    submitting: false,
                    ..state.sign_up
                },
                ..state
            };
            match error {
                SubmissionError::Validation(errors) => AppState {
                    sign_up: SignUpState {
                        field_errors: errors,
                        ..state.sign_up
                    },
                    ..state
                },
                other => apply_failure(state, other),
            }
        }

        // === Session ===
        Action::SignedOut => signed_out(state),

        // === Alerts / status ===
        Action::DismissAlert => AppState {
            alert: None,
            ..state
        },

        Action::SetStatus(message) => AppState {
            status: Some(message),
            ..state
        },

        Action::ClearStatus => AppState {
            status: None,
            ..state
        },
    }
}

fn go_back(state: AppState) -> AppState {
    match state.current_screen {
        Screen::CreateAppointment | Screen::Profile => AppState {
            current_screen: Screen::Dashboard,
            appointment: None,
            ..state
        },
        Screen::Dashboard | Screen::SignUp => state,
    }
}

/// Apply a selection transition when the booking screen is open
fn with_selection(
    state: AppState,
    transition: impl FnOnce(SelectionState, bool) -> SelectionState,
) -> AppState {
    let auto_close = state.auto_close_date_picker;
    AppState {
        appointment: state.appointment.map(|appointment| CreateAppointmentState {
            selection: transition(appointment.selection, auto_close),
            ..appointment
        }),
        ..state
    }
}

fn avatar_settled(state: AppState) -> AppState {
    AppState {
        profile: ProfileScreenState {
            uploading_avatar: false,
            ..state.profile
        },
        ..state
    }
}

fn with_user(state: AppState, user: UserProfile) -> AppState {
    AppState {
        user: Some(user),
        ..state
    }
}

/// Remote failures become an alert; a lost session signs the screen out
fn apply_failure(state: AppState, error: SubmissionError) -> AppState {
    match error {
        SubmissionError::Remote { title, message } => AppState {
            alert: Some(Alert {
                title,
                message: Some(message),
            }),
            ..state
        },
        SubmissionError::SignedOut => signed_out(state),
        // Field errors belong to a form; nothing to show globally
        SubmissionError::Validation(_) => state,
    }
}

fn signed_out(state: AppState) -> AppState {
    AppState {
        current_screen: Screen::SignUp,
        user: None,
        dashboard: DashboardState::default(),
        appointment: None,
        profile: ProfileScreenState::default(),
        ..state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn provider(id: &str) -> Provider {
        Provider {
            id: id.to_string(),
            name: format!("Provider {}", id),
            avatar_url: String::new(),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_toggle_date_picker_flips() {
        let state = SelectionState::at("1", noon());

        let state = toggle_date_picker(state);
        assert!(state.date_picker_visible);

        let state = toggle_date_picker(state);
        assert!(!state.date_picker_visible);
    }

    #[test]
    fn test_date_picked_auto_close() {
        let open = toggle_date_picker(SelectionState::at("1", noon()));
        let picked = noon() + chrono::Duration::days(1);

        let closed = date_picked(open.clone(), Some(picked), true);
        assert!(!closed.date_picker_visible);
        assert_eq!(closed.selected_date, picked);

        let still_open = date_picked(open, Some(picked), false);
        assert!(still_open.date_picker_visible);
        assert_eq!(still_open.selected_date, picked);
    }

    #[test]
    fn test_dismissed_picker_keeps_date() {
        let open = toggle_date_picker(SelectionState::at("1", noon()));

        let state = date_picked(open, None, true);

        assert_eq!(state.selected_date, noon());
        assert!(!state.date_picker_visible);
    }

    #[test]
    fn test_rows_with_unknown_selection_mark_nothing() {
        let rows = provider_rows(
            &[provider("1"), provider("2")],
            &SelectionState::at("missing", noon()),
        );

        assert!(rows.iter().all(|row| !row.selected));
    }

    #[test]
    fn test_selection_ignored_without_booking_screen() {
        let state = AppState::new();

        let new_state = reduce(state.clone(), Action::SelectProvider("1".to_string()));

        assert_eq!(new_state, state);
    }
}
