//! Scripted collaborators for testing
//!
//! [`MockApi`] implements both [`ProviderSource`] and [`UserApi`] with
//! configurable failures and latency, and records every request it receives
//! so tests can assert on exact payloads. [`MockPicker`] returns a fixed
//! [`PickerResponse`].

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use super::{ApiResult, MediaPicker, PickerPrompt, PickerResponse, ProviderSource, UserApi};
use crate::error::ApiError;
use crate::types::{AvatarUpload, Provider, ProfileUpdateRequest, SignUpRequest, UserProfile};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Configuration for mock API behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Providers returned by `list_providers`
    pub providers: Vec<Provider>,

    /// Id given to the profile returned by profile/avatar updates
    pub user_id: String,

    /// Error returned by `list_providers`
    pub providers_error: Option<ApiError>,

    /// Error returned by `update_profile`
    pub update_error: Option<ApiError>,

    /// Error returned by `update_avatar`
    pub avatar_error: Option<ApiError>,

    /// Error returned by `create_user`
    pub create_error: Option<ApiError>,

    /// Delay before every response (simulates network latency)
    pub delay: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            user_id: "user-1".to_string(),
            providers_error: None,
            update_error: None,
            avatar_error: None,
            create_error: None,
            delay: Duration::from_millis(0),
        }
    }
}

#[derive(Debug, Default)]
struct Recorded {
    provider_calls: usize,
    profile_updates: Vec<ProfileUpdateRequest>,
    avatar_uploads: Vec<AvatarUpload>,
    sign_ups: Vec<SignUpRequest>,
}

/// Mock booking API. Clones share recorded calls.
#[derive(Debug, Clone)]
pub struct MockApi {
    config: MockConfig,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockApi {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    /// A mock that succeeds and serves `providers`
    pub fn with_providers(providers: Vec<Provider>) -> Self {
        Self::new(MockConfig {
            providers,
            ..Default::default()
        })
    }

    /// A mock whose every call fails with a network error
    pub fn offline() -> Self {
        let error = ApiError::Network("connection refused".to_string());
        Self::new(MockConfig {
            providers_error: Some(error.clone()),
            update_error: Some(error.clone()),
            avatar_error: Some(error.clone()),
            create_error: Some(error),
            ..Default::default()
        })
    }

    pub fn provider_calls(&self) -> usize {
        lock(&self.recorded).provider_calls
    }

    pub fn profile_updates(&self) -> Vec<ProfileUpdateRequest> {
        lock(&self.recorded).profile_updates.clone()
    }

    pub fn avatar_uploads(&self) -> Vec<AvatarUpload> {
        lock(&self.recorded).avatar_uploads.clone()
    }

    pub fn sign_ups(&self) -> Vec<SignUpRequest> {
        lock(&self.recorded).sign_ups.clone()
    }

    async fn respond<T>(&self, error: &Option<ApiError>, ok: impl FnOnce() -> T) -> ApiResult<T> {
        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }
        match error {
            Some(error) => Err(error.clone()),
            None => Ok(ok()),
        }
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

#[async_trait]
impl ProviderSource for MockApi {
    async fn list_providers(&self) -> ApiResult<Vec<Provider>> {
        lock(&self.recorded).provider_calls += 1;
        self.respond(&self.config.providers_error, || self.config.providers.clone())
            .await
    }
}

#[async_trait]
impl UserApi for MockApi {
    async fn create_user(&self, request: &SignUpRequest) -> ApiResult<UserProfile> {
        lock(&self.recorded).sign_ups.push(request.clone());
        self.respond(&self.config.create_error, || UserProfile {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name.clone(),
            email: request.email.clone(),
            avatar_url: None,
        })
        .await
    }

    async fn update_profile(&self, request: &ProfileUpdateRequest) -> ApiResult<UserProfile> {
        lock(&self.recorded).profile_updates.push(request.clone());
        self.respond(&self.config.update_error, || UserProfile {
            id: self.config.user_id.clone(),
            name: request.name.clone(),
            email: request.email.clone(),
            avatar_url: None,
        })
        .await
    }

    async fn update_avatar(&self, upload: AvatarUpload) -> ApiResult<UserProfile> {
        let file_name = upload.file_name.clone();
        lock(&self.recorded).avatar_uploads.push(upload);
        self.respond(&self.config.avatar_error, || UserProfile {
            id: self.config.user_id.clone(),
            name: "Mock User".to_string(),
            email: "mock@example.com".to_string(),
            avatar_url: Some(format!("https://cdn.example.com/avatars/{}", file_name)),
        })
        .await
    }
}

/// Media picker that always answers with the same response
#[derive(Debug, Clone)]
pub struct MockPicker {
    response: PickerResponse,
    prompts: Arc<Mutex<Vec<PickerPrompt>>>,
}

impl MockPicker {
    pub fn new(response: PickerResponse) -> Self {
        Self {
            response,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(PickerResponse::Cancelled)
    }

    pub fn failing(message: &str) -> Self {
        Self::new(PickerResponse::Failed(message.to_string()))
    }

    pub fn picking(source: &str, bytes: Vec<u8>) -> Self {
        Self::new(PickerResponse::Picked(super::PickedImage {
            source: source.to_string(),
            bytes,
        }))
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn prompts(&self) -> Vec<PickerPrompt> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl MediaPicker for MockPicker {
    async fn pick_image(&self, prompt: &PickerPrompt) -> PickerResponse {
        lock(&self.prompts).push(prompt.clone());
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: &str) -> Provider {
        Provider {
            id: id.to_string(),
            name: format!("Provider {}", id),
            avatar_url: format!("https://cdn.example.com/{}.png", id),
        }
    }

    #[tokio::test]
    async fn test_mock_serves_providers_in_order() {
        let api = MockApi::with_providers(vec![provider("2"), provider("1")]);

        let providers = api.list_providers().await.unwrap();

        let ids: Vec<_> = providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(api.provider_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_records_profile_updates() {
        let api = MockApi::default();
        let request = ProfileUpdateRequest {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password_change: None,
        };

        let profile = api.update_profile(&request).await.unwrap();

        assert_eq!(profile.id, "user-1");
        assert_eq!(profile.name, "Ana");
        assert_eq!(api.profile_updates(), vec![request]);
    }

    #[tokio::test]
    async fn test_mock_offline_fails_everything() {
        let api = MockApi::offline();

        assert!(api.list_providers().await.is_err());
        assert!(api
            .update_avatar(AvatarUpload::for_user("u1", vec![1]))
            .await
            .is_err());
        // Calls are still recorded
        assert_eq!(api.provider_calls(), 1);
        assert_eq!(api.avatar_uploads().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_with_delay() {
        let api = MockApi::new(MockConfig {
            delay: Duration::from_millis(30),
            ..Default::default()
        });

        let start = std::time::Instant::now();
        api.list_providers().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_mock_picker_records_prompts() {
        let picker = MockPicker::cancelled();

        let response = picker.pick_image(&PickerPrompt::default()).await;

        assert_eq!(response, PickerResponse::Cancelled);
        assert_eq!(picker.call_count(), 1);
        assert_eq!(picker.prompts()[0].title, "Select an avatar");
    }
}
