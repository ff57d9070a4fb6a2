//! Profile update pipeline
//!
//! validate → build request → `PUT profile` → store returned profile.

use std::sync::Arc;

use super::events::{Event, EventBus, FormKind};
use super::submission::{messages, SubmissionError};
use crate::api::UserApi;
use crate::error::{AppointlyError, SessionError};
use crate::session::SessionStore;
use crate::types::{fields, ProfileForm, ProfileUpdateRequest, UserProfile};
use crate::validation::{Schema, ValidationErrorSet};

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Enter a valid email address";
pub const FIELD_REQUIRED: &str = "This field is required";
pub const CONFIRMATION_MISMATCH: &str = "Passwords do not match";

/// Schema for the profile form.
///
/// `password` is required once `old_password` is filled in. The confirmation
/// must match `password`, but is only itself required when
/// `require_confirmation` is set.
pub fn profile_update_schema(require_confirmation: bool) -> Schema {
    Schema::builder()
        .field(fields::NAME, |f| f.required(NAME_REQUIRED))
        .field(fields::EMAIL, |f| {
            f.required(EMAIL_REQUIRED).email(EMAIL_INVALID)
        })
        .field(fields::OLD_PASSWORD, |f| f)
        .field(fields::PASSWORD, |f| {
            f.required_if(fields::OLD_PASSWORD, FIELD_REQUIRED)
        })
        .field(fields::PASSWORD_CONFIRMATION, |f| {
            let f = if require_confirmation {
                f.required_if(fields::OLD_PASSWORD, FIELD_REQUIRED)
            } else {
                f
            };
            f.equals_field(fields::PASSWORD, CONFIRMATION_MISMATCH)
        })
        .build()
}

#[derive(Clone)]
pub struct ProfileService {
    api: Arc<dyn UserApi>,
    session: SessionStore,
    schema: Arc<Schema>,
    event_bus: EventBus,
}

impl ProfileService {
    pub fn new(
        api: Arc<dyn UserApi>,
        session: SessionStore,
        require_confirmation: bool,
        event_bus: EventBus,
    ) -> Self {
        Self {
            api,
            session,
            schema: Arc::new(profile_update_schema(require_confirmation)),
            event_bus,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Check the form without submitting it
    pub fn validate(&self, form: &ProfileForm) -> Result<(), ValidationErrorSet> {
        self.schema.validate(&form.to_form_data()).map(|_| ())
    }

    /// Validate and submit the form.
    ///
    /// Nothing is sent when validation fails or no user is signed in. On
    /// success the returned profile replaces the one in the session store.
    pub async fn submit(&self, form: &ProfileForm) -> Result<UserProfile, SubmissionError> {
        let validated = match self.schema.validate(&form.to_form_data()) {
            Ok(validated) => validated,
            Err(errors) => {
                tracing::debug!(fields = %errors, "profile form rejected");
                self.event_bus.emit(Event::SubmissionRejected {
                    form: FormKind::Profile,
                    fields: errors.fields().map(str::to_string).collect(),
                });
                return Err(SubmissionError::Validation(errors));
            }
        };

        if let Err(e) = self.session.current_user() {
            tracing::debug!("profile update without a session: {}", e);
            return Err(SubmissionError::SignedOut);
        }

        let request = ProfileUpdateRequest::from_validated(&validated);

        let profile = self.api.update_profile(&request).await.map_err(|e| {
            tracing::warn!("Profile update failed: {}", e);
            SubmissionError::remote(
                messages::PROFILE_UPDATE_TITLE,
                messages::PROFILE_UPDATE_FAILED,
            )
        })?;

        match self.session.update_user(profile.clone()) {
            Ok(()) => {}
            Err(AppointlyError::Session(SessionError::NotSignedIn)) => {
                tracing::warn!("Signed out while the profile update was in flight");
                return Err(SubmissionError::SignedOut);
            }
            Err(e) => {
                tracing::warn!("Profile updated remotely but not stored locally: {}", e);
            }
        }

        tracing::info!(user_id = %profile.id, "profile updated");
        self.event_bus.emit(Event::ProfileUpdated {
            user: profile.clone(),
        });

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    fn form(name: &str, email: &str, old: &str, new: &str, confirm: &str) -> ProfileForm {
        ProfileForm {
            name: name.to_string(),
            email: email.to_string(),
            old_password: old.to_string(),
            password: new.to_string(),
            password_confirmation: confirm.to_string(),
        }
    }

    #[test]
    fn test_blank_name_and_bad_email() {
        let errors = validate(
            &profile_update_schema(false),
            &form("", "not-an-email", "", "", "").to_form_data(),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some(NAME_REQUIRED));
        assert_eq!(errors.get("email"), Some(EMAIL_INVALID));
    }

    #[test]
    fn test_missing_email_reports_required_first() {
        let errors = validate(
            &profile_update_schema(false),
            &form("Ana", "", "", "", "").to_form_data(),
        )
        .unwrap_err();

        assert_eq!(errors.get("email"), Some(EMAIL_REQUIRED));
    }

    #[test]
    fn test_old_password_requires_new_password() {
        let errors = validate(
            &profile_update_schema(false),
            &form("Ana", "ana@x.com", "old", "", "").to_form_data(),
        )
        .unwrap_err();

        assert_eq!(errors.get("password"), Some(FIELD_REQUIRED));
        // Empty confirmation equals empty password
        assert!(!errors.contains("password_confirmation"));
    }

    #[test]
    fn test_confirmation_mismatch() {
        let errors = validate(
            &profile_update_schema(false),
            &form("Ana", "ana@x.com", "old", "new-secret", "other").to_form_data(),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("password_confirmation"), Some(CONFIRMATION_MISMATCH));
    }

    #[test]
    fn test_confirmation_mismatch_checked_without_old_password() {
        let errors = validate(
            &profile_update_schema(false),
            &form("Ana", "ana@x.com", "", "new-secret", "").to_form_data(),
        )
        .unwrap_err();

        assert_eq!(errors.get("password_confirmation"), Some(CONFIRMATION_MISMATCH));
    }

    #[test]
    fn test_confirmation_requiredness_is_opt_in() {
        let data = form("Ana", "ana@x.com", "old", "", "").to_form_data();

        let lenient = validate(&profile_update_schema(false), &data).unwrap_err();
        let strict = validate(&profile_update_schema(true), &data).unwrap_err();

        assert!(!lenient.contains("password_confirmation"));
        assert_eq!(strict.get("password_confirmation"), Some(FIELD_REQUIRED));
    }

    #[test]
    fn test_valid_password_change() {
        assert!(validate(
            &profile_update_schema(true),
            &form("Ana", "ana@x.com", "old", "new-secret", "new-secret").to_form_data(),
        )
        .is_ok());
    }
}
