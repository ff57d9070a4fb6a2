//! Account creation

use std::sync::Arc;

use super::events::{Event, EventBus, FormKind};
use super::profile::{EMAIL_INVALID, EMAIL_REQUIRED, NAME_REQUIRED};
use super::submission::{messages, SubmissionError};
use crate::api::UserApi;
use crate::types::{fields, SignUpForm, SignUpRequest, UserProfile};
use crate::validation::Schema;

pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn sign_up_schema() -> Schema {
    Schema::builder()
        .field(fields::NAME, |f| f.required(NAME_REQUIRED))
        .field(fields::EMAIL, |f| {
            f.required(EMAIL_REQUIRED).email(EMAIL_INVALID)
        })
        .field(fields::PASSWORD, |f| {
            f.required(PASSWORD_REQUIRED)
                .min_length(MIN_PASSWORD_LENGTH, PASSWORD_TOO_SHORT)
        })
        .build()
}

/// Creates accounts. A new account is not signed in.
#[derive(Clone)]
pub struct SignUpService {
    api: Arc<dyn UserApi>,
    schema: Arc<Schema>,
    event_bus: EventBus,
}

impl SignUpService {
    pub fn new(api: Arc<dyn UserApi>, event_bus: EventBus) -> Self {
        Self {
            api,
            schema: Arc::new(sign_up_schema()),
            event_bus,
        }
    }

    pub async fn submit(&self, form: &SignUpForm) -> Result<UserProfile, SubmissionError> {
        let validated = self
            .schema
            .validate(&form.to_form_data())
            .map_err(|errors| {
                self.event_bus.emit(Event::SubmissionRejected {
                    form: FormKind::SignUp,
                    fields: errors.fields().map(str::to_string).collect(),
                });
                SubmissionError::Validation(errors)
            })?;

        let request = SignUpRequest::from_validated(&validated);
        let user = self.api.create_user(&request).await.map_err(|e| {
            tracing::warn!("Sign-up failed: {}", e);
            SubmissionError::remote(messages::SIGN_UP_TITLE, messages::SIGN_UP_FAILED)
        })?;

        tracing::info!(user_id = %user.id, "account created");
        self.event_bus.emit(Event::SignedUp {
            user_id: user.id.clone(),
        });

        Ok(user)
    }
}
