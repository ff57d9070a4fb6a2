//! Service layer for Appointly
//!
//! Business logic shared by every front end (screens, CLI). `BookingService`
//! is the entry point and owns the shared session store and event bus:
//!
//! - `ProviderService`: provider list fetch
//! - `ProfileService`: profile form validation and submission
//! - `AvatarService`: avatar pick and upload
//! - `SignUpService`: account creation
//! - `EventBus`: completion events
//!
//! # Example
//!
//! ```no_run
//! use libappointly::service::BookingService;
//! use libappointly::types::ProfileForm;
//!
//! # async fn example() -> libappointly::Result<()> {
//! let service = BookingService::new()?;
//!
//! let user = service.session().current_user()?;
//! let mut form = ProfileForm::from_profile(&user);
//! form.name = "Ana Maria".to_string();
//!
//! match service.profile().submit(&form).await {
//!     Ok(profile) => println!("Saved {}", profile.name),
//!     Err(e) => eprintln!("{}", e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod avatar;
pub mod events;
pub mod profile;
pub mod providers;
pub mod signup;
pub mod submission;

pub use avatar::{AvatarOutcome, AvatarService};
pub use events::{Event, EventBus, EventReceiver, FormKind};
pub use profile::ProfileService;
pub use providers::ProviderService;
pub use signup::SignUpService;
pub use submission::SubmissionError;

use std::sync::Arc;

use crate::api::http::HttpApi;
use crate::api::{ProviderSource, UserApi};
use crate::config::{resolve_session_path, Config};
use crate::error::Result;
use crate::session::SessionStore;

const EVENT_CAPACITY: usize = 100;

/// Main service facade.
///
/// All sub-services share one `SessionStore` and one `EventBus`, so a
/// profile update made through `profile()` is immediately visible through
/// `session()`.
pub struct BookingService {
    config: Arc<Config>,
    session: SessionStore,
    providers: ProviderService,
    profile: ProfileService,
    avatar: AvatarService,
    sign_up: SignUpService,
    event_bus: EventBus,
}

impl BookingService {
    /// Create a service from the configuration at the default location
    pub fn new() -> Result<Self> {
        let config = Config::load_or_default()?;
        Self::from_config(config)
    }

    /// Create a service talking HTTP to `config.api.base_url`, with the
    /// session persisted at `config.session.path`
    pub fn from_config(config: Config) -> Result<Self> {
        let session = SessionStore::open(resolve_session_path(&config.session.path))?;
        let api = Arc::new(HttpApi::new(config.api.base_url.clone(), session.clone()));
        Ok(Self::with_collaborators(
            config,
            session,
            api.clone(),
            api,
        ))
    }

    /// Create a service over explicit collaborators (mocks in tests)
    pub fn with_collaborators(
        config: Config,
        session: SessionStore,
        provider_source: Arc<dyn ProviderSource>,
        user_api: Arc<dyn UserApi>,
    ) -> Self {
        let config = Arc::new(config);
        let event_bus = EventBus::new(EVENT_CAPACITY);

        let providers = ProviderService::new(provider_source, event_bus.clone());
        let profile = ProfileService::new(
            Arc::clone(&user_api),
            session.clone(),
            config.validation.require_confirmation_with_old_password,
            event_bus.clone(),
        );
        let avatar = AvatarService::new(Arc::clone(&user_api), session.clone(), event_bus.clone());
        let sign_up = SignUpService::new(user_api, event_bus.clone());

        Self {
            config,
            session,
            providers,
            profile,
            avatar,
            sign_up,
            event_bus,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn providers(&self) -> &ProviderService {
        &self.providers
    }

    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }

    pub fn avatar(&self) -> &AvatarService {
        &self.avatar
    }

    pub fn sign_up(&self) -> &SignUpService {
        &self.sign_up
    }

    /// Subscribe to service events
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }

    /// Clear the session and delete its file
    pub fn sign_out(&self) -> Result<()> {
        self.session.sign_out()?;
        self.event_bus.emit(Event::SignedOut);
        Ok(())
    }
}
