//! Outcome taxonomy shared by the form pipelines

use thiserror::Error;

use crate::validation::ValidationErrorSet;

/// Fixed user-facing messages.
///
/// Collaborator failures always map to one of these; the underlying cause
/// is logged, never shown.
pub mod messages {
    pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
    pub const PROFILE_UPDATE_TITLE: &str = "Update failed";
    pub const PROFILE_UPDATE_FAILED: &str =
        "Something went wrong while updating your profile, please try again.";

    pub const AVATAR_TITLE: &str = "Avatar update failed";
    pub const AVATAR_PICKER_FAILED: &str = "Could not open the selected image.";
    pub const AVATAR_UPLOAD_FAILED: &str =
        "Something went wrong while updating your avatar, please try again.";

    pub const SIGN_UP_TITLE: &str = "Sign-up failed";
    pub const SIGN_UP_FAILED: &str =
        "Something went wrong while creating your account, please try again.";
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// One or more fields failed validation; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(ValidationErrorSet),

    /// A collaborator call failed
    #[error("{title}: {message}")]
    Remote { title: String, message: String },

    /// The operation needs a signed-in user
    #[error("No user is signed in")]
    SignedOut,
}

impl SubmissionError {
    pub fn remote(title: &str, message: &str) -> Self {
        SubmissionError::Remote {
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    /// Field errors, when this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrorSet> {
        match self {
            SubmissionError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            SubmissionError::Validation(_) => 3,
            SubmissionError::Remote { .. } => 1,
            SubmissionError::SignedOut => 2,
        }
    }
}
