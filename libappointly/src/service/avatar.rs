//! Avatar update pipeline
//!
//! pick image → `PATCH users/avatar` → store returned profile. There is no
//! form and no validation step.

use std::sync::Arc;

use super::events::{Event, EventBus};
use super::submission::{messages, SubmissionError};
use crate::api::{MediaPicker, PickerPrompt, PickerResponse, UserApi};
use crate::session::SessionStore;
use crate::types::{AvatarUpload, UserProfile};

/// Result of an avatar update that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarOutcome {
    Updated(UserProfile),
    /// The user backed out of the picker; nothing changed
    Cancelled,
}

#[derive(Clone)]
pub struct AvatarService {
    api: Arc<dyn UserApi>,
    session: SessionStore,
    prompt: PickerPrompt,
    event_bus: EventBus,
}

impl AvatarService {
    pub fn new(api: Arc<dyn UserApi>, session: SessionStore, event_bus: EventBus) -> Self {
        Self {
            api,
            session,
            prompt: PickerPrompt::default(),
            event_bus,
        }
    }

    pub fn with_prompt(mut self, prompt: PickerPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub async fn update(&self, picker: &dyn MediaPicker) -> Result<AvatarOutcome, SubmissionError> {
        let user = match self.session.current_user() {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!("avatar update without a session: {}", e);
                return Err(SubmissionError::SignedOut);
            }
        };

        let image = match picker.pick_image(&self.prompt).await {
            PickerResponse::Cancelled => {
                tracing::debug!("avatar picker cancelled");
                return Ok(AvatarOutcome::Cancelled);
            }
            PickerResponse::Failed(reason) => {
                tracing::warn!("Avatar picker failed: {}", reason);
                return Err(SubmissionError::remote(
                    messages::AVATAR_TITLE,
                    messages::AVATAR_PICKER_FAILED,
                ));
            }
            PickerResponse::Picked(image) => image,
        };

        tracing::debug!(source = %image.source, bytes = image.bytes.len(), "uploading avatar");
        let upload = AvatarUpload::for_user(&user.id, image.bytes);

        let profile = self.api.update_avatar(upload).await.map_err(|e| {
            tracing::warn!("Avatar upload failed: {}", e);
            SubmissionError::remote(messages::AVATAR_TITLE, messages::AVATAR_UPLOAD_FAILED)
        })?;

        if let Err(e) = self.session.update_user(profile.clone()) {
            tracing::warn!("Avatar updated remotely but not stored locally: {}", e);
        }

        self.event_bus.emit(Event::AvatarUpdated {
            user: profile.clone(),
        });

        Ok(AvatarOutcome::Updated(profile))
    }
}
