//! Bridge between the async services and a synchronous event loop
//!
//! `ServiceHandle` owns a tokio runtime. Each network-bound operation is
//! spawned as its own task and its outcome comes back as an [`Action`] on a
//! crossbeam channel, ready to be fed to [`crate::app::reduce`]. The loop
//! polls with `try_recv` and never blocks on the network.
//!
//! # Example
//!
//! ```no_run
//! use appt_screens::app::{reduce, AppState};
//! use appt_screens::services::ServiceHandle;
//!
//! # fn example() -> appt_screens::Result<()> {
//! let services = ServiceHandle::new()?;
//! let mut state = services.initial_state();
//!
//! let outcome = services.fetch_providers();
//! // ... later, in the event loop
//! if let Ok(action) = outcome.try_recv() {
//!     state = reduce(state, action);
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use libappointly::api::MediaPicker;
use libappointly::service::{AvatarOutcome, BookingService, Event};
use libappointly::types::{ProfileForm, SignUpForm};
use libappointly::ValidationErrorSet;
use tokio::sync::broadcast::error::RecvError;

use crate::app::{Action, AppState};
use crate::error::Result;

pub struct ServiceHandle {
    service: Arc<BookingService>,
    runtime: tokio::runtime::Runtime,
}

impl ServiceHandle {
    /// Service from the default configuration
    pub fn new() -> Result<Self> {
        Self::from_service(BookingService::new()?)
    }

    /// Wrap an existing service (mock collaborators in tests)
    pub fn from_service(service: BookingService) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            service: Arc::new(service),
            runtime,
        })
    }

    pub fn service(&self) -> &BookingService {
        &self.service
    }

    /// Starting state for the current session
    pub fn initial_state(&self) -> AppState {
        let user = self.service.session().current_user().ok();
        AppState::for_session(user, self.service.config())
    }

    /// Forward service events to a crossbeam channel
    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = unbounded();
        let mut events = self.service.subscribe();

        self.runtime.spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Event receiver lagged, skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        rx
    }

    /// Check the profile form without submitting it
    pub fn validate_profile(&self, form: &ProfileForm) -> ValidationErrorSet {
        self.service.profile().validate(form).err().unwrap_or_default()
    }

    pub fn fetch_providers(&self) -> Receiver<Action> {
        self.spawn(|service| async move {
            match service.providers().fetch().await {
                Ok(providers) => Action::ProvidersLoaded(providers),
                Err(e) => Action::ProvidersFailed(e.to_string()),
            }
        })
    }

    pub fn submit_profile(&self, form: ProfileForm) -> Receiver<Action> {
        self.spawn(|service| async move {
            match service.profile().submit(&form).await {
                Ok(user) => Action::ProfileSubmitSucceeded(user),
                Err(e) => Action::ProfileSubmitFailed(e),
            }
        })
    }

    /// Pick and upload an avatar.
    ///
    /// A cancelled picker reports `AvatarCancelled`, which raises no alert.
    pub fn update_avatar(&self, picker: Arc<dyn MediaPicker>) -> Receiver<Action> {
        let (tx, rx) = unbounded();
        let service = Arc::clone(&self.service);

        self.runtime.spawn(async move {
            let action = match service.avatar().update(picker.as_ref()).await {
                Ok(AvatarOutcome::Updated(user)) => Action::AvatarUpdated(user),
                Ok(AvatarOutcome::Cancelled) => Action::AvatarCancelled,
                Err(e) => Action::AvatarFailed(e),
            };
            let _ = tx.send(action);
        });

        rx
    }

    pub fn sign_up(&self, form: SignUpForm) -> Receiver<Action> {
        self.spawn(|service| async move {
            match service.sign_up().submit(&form).await {
                Ok(user) => Action::SignUpSucceeded(user),
                Err(e) => Action::SignUpFailed(e),
            }
        })
    }

    /// Clear the session. Runs inline; it only touches the local file.
    pub fn sign_out(&self) -> Result<Action> {
        self.service.sign_out()?;
        Ok(Action::SignedOut)
    }

    fn spawn<F, Fut>(&self, operation: F) -> Receiver<Action>
    where
        F: FnOnce(Arc<BookingService>) -> Fut,
        Fut: Future<Output = Action> + Send + 'static,
    {
        let (tx, rx) = unbounded();
        let task = operation(Arc::clone(&self.service));

        self.runtime.spawn(async move {
            // Err only means the screen stopped listening
            let _ = tx.send(task.await);
        });

        rx
    }
}
