//! Remote collaborators
//!
//! The booking core never talks to the network or the device directly. It
//! goes through these traits so that screens can be driven against the real
//! HTTP API ([`http::HttpApi`]), a scripted mock ([`mock::MockApi`]) or a
//! file-based media picker ([`picker::FilePicker`]).
//!
//! # Example
//!
//! ```no_run
//! use libappointly::api::{http::HttpApi, ProviderSource};
//! use libappointly::session::SessionStore;
//!
//! # async fn example() -> Result<(), libappointly::error::ApiError> {
//! let api = HttpApi::new("http://localhost:3333", SessionStore::in_memory());
//!
//! for provider in api.list_providers().await? {
//!     println!("{} ({})", provider.name, provider.id);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{AvatarUpload, Provider, ProfileUpdateRequest, SignUpRequest, UserProfile};

pub mod http;
pub mod picker;

// Available outside tests so the screen crate and integration tests can use it
pub mod mock;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Source of the bookable provider list
#[async_trait]
pub trait ProviderSource: Send + Sync {
    /// Fetch every provider, in server order
    async fn list_providers(&self) -> ApiResult<Vec<Provider>>;
}

/// User account endpoints
#[async_trait]
pub trait UserApi: Send + Sync {
    /// `POST users`
    async fn create_user(&self, request: &SignUpRequest) -> ApiResult<UserProfile>;

    /// `PUT profile`; returns the updated profile
    async fn update_profile(&self, request: &ProfileUpdateRequest) -> ApiResult<UserProfile>;

    /// `PATCH users/avatar` as multipart; returns the updated profile
    async fn update_avatar(&self, upload: AvatarUpload) -> ApiResult<UserProfile>;
}

/// Labels shown by the media picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerPrompt {
    pub title: String,
    pub cancel_label: String,
    pub take_photo_label: String,
    pub choose_from_library_label: String,
}

impl Default for PickerPrompt {
    fn default() -> Self {
        Self {
            title: "Select an avatar".to_string(),
            cancel_label: "Cancel".to_string(),
            take_photo_label: "Use camera".to_string(),
            choose_from_library_label: "Choose from library".to_string(),
        }
    }
}

/// An image chosen by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedImage {
    /// Where the image came from (file path, content URI, ...)
    pub source: String,
    pub bytes: Vec<u8>,
}

/// Outcome of a picker interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerResponse {
    Cancelled,
    Failed(String),
    Picked(PickedImage),
}

/// Device media picker
#[async_trait]
pub trait MediaPicker: Send + Sync {
    async fn pick_image(&self, prompt: &PickerPrompt) -> PickerResponse;
}
