//! Core types for Appointly

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{FormData, Validated};

/// A service provider that can be booked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
}

/// Profile record of the signed-in user, as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub signed_in_at: DateTime<Utc>,
    pub user: UserProfile,
}

impl Session {
    pub fn new(user: UserProfile, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            signed_in_at: Utc::now(),
            user,
        }
    }
}

// ============================================================================
// Profile form
// ============================================================================

pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const OLD_PASSWORD: &str = "old_password";
    pub const PASSWORD: &str = "password";
    pub const PASSWORD_CONFIRMATION: &str = "password_confirmation";
}

/// Raw contents of the profile form, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub old_password: String,
    pub password: String,
    pub password_confirmation: String,
}

impl ProfileForm {
    /// Form pre-filled from the current profile, password fields blank
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            ..Default::default()
        }
    }

    pub fn to_form_data(&self) -> FormData {
        FormData::new()
            .with(fields::NAME, &self.name)
            .with(fields::EMAIL, &self.email)
            .with(fields::OLD_PASSWORD, &self.old_password)
            .with(fields::PASSWORD, &self.password)
            .with(fields::PASSWORD_CONFIRMATION, &self.password_confirmation)
    }
}

/// Password change block of a profile update; all three keys travel together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Body of `PUT profile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdateRequest {
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub password_change: Option<PasswordChange>,
}

impl ProfileUpdateRequest {
    /// Build the payload from validated form data.
    ///
    /// The password block is only included when `old_password` is non-empty.
    pub fn from_validated(data: &Validated) -> Self {
        let value = |field: &str| data.get(field).unwrap_or_default().to_string();

        let old_password = value(fields::OLD_PASSWORD);
        let password_change = if old_password.is_empty() {
            None
        } else {
            Some(PasswordChange {
                old_password,
                password: value(fields::PASSWORD),
                password_confirmation: value(fields::PASSWORD_CONFIRMATION),
            })
        };

        Self {
            name: value(fields::NAME),
            email: value(fields::EMAIL),
            password_change,
        }
    }
}

// ============================================================================
// Sign-up form
// ============================================================================

/// Raw contents of the sign-up form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpForm {
    pub fn to_form_data(&self) -> FormData {
        FormData::new()
            .with(fields::NAME, &self.name)
            .with(fields::EMAIL, &self.email)
            .with(fields::PASSWORD, &self.password)
    }
}

/// Body of `POST users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    pub fn from_validated(data: &Validated) -> Self {
        let value = |field: &str| data.get(field).unwrap_or_default().to_string();
        Self {
            name: value(fields::NAME),
            email: value(fields::EMAIL),
            password: value(fields::PASSWORD),
        }
    }
}

// ============================================================================
// Avatar upload
// ============================================================================

pub const AVATAR_CONTENT_TYPE: &str = "image/jpeg";

/// Multipart `avatar` part for `PATCH users/avatar`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    /// Avatars are always uploaded as `<userId>.jpg`
    pub fn for_user(user_id: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("{}.jpg", user_id),
            content_type: AVATAR_CONTENT_TYPE,
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate, Schema};

    fn accept_all() -> Schema {
        Schema::builder()
            .field(fields::NAME, |f| f)
            .field(fields::EMAIL, |f| f)
            .field(fields::OLD_PASSWORD, |f| f)
            .field(fields::PASSWORD, |f| f)
            .field(fields::PASSWORD_CONFIRMATION, |f| f)
            .build()
    }

    #[test]
    fn test_provider_deserializes_wire_format() {
        let json = r#"[{"id":"1","name":"Ana","avatar_url":"https://cdn/a.png"}]"#;
        let providers: Vec<Provider> = serde_json::from_str(json).unwrap();

        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].avatar_url, "https://cdn/a.png");
    }

    #[test]
    fn test_user_profile_without_avatar() {
        let json = r#"{"id":"u1","name":"Ana","email":"ana@x.com"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.avatar_url, None);
    }

    #[test]
    fn test_profile_request_omits_password_block() {
        let form = ProfileForm {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password: "ignored".to_string(),
            password_confirmation: "ignored".to_string(),
            ..Default::default()
        };
        let validated = validate(&accept_all(), &form.to_form_data()).unwrap();
        let request = ProfileUpdateRequest::from_validated(&validated);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, serde_json::json!({"name": "Ana", "email": "ana@x.com"}));
    }

    #[test]
    fn test_profile_request_includes_password_block() {
        let form = ProfileForm {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            old_password: "old-secret".to_string(),
            password: "new-secret".to_string(),
            password_confirmation: "new-secret".to_string(),
        };
        let validated = validate(&accept_all(), &form.to_form_data()).unwrap();
        let request = ProfileUpdateRequest::from_validated(&validated);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "name": "Ana",
                "email": "ana@x.com",
                "old_password": "old-secret",
                "password": "new-secret",
                "password_confirmation": "new-secret",
            })
        );
    }

    #[test]
    fn test_form_from_profile_leaves_passwords_blank() {
        let profile = UserProfile {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            avatar_url: None,
        };
        let form = ProfileForm::from_profile(&profile);

        assert_eq!(form.name, "Ana");
        assert!(form.old_password.is_empty());
        assert!(form.password_confirmation.is_empty());
    }

    #[test]
    fn test_avatar_upload_naming() {
        let upload = AvatarUpload::for_user("42", vec![0xFF, 0xD8]);
        assert_eq!(upload.file_name, "42.jpg");
        assert_eq!(upload.content_type, "image/jpeg");
    }
}
