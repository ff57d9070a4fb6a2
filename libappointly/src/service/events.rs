//! Service events
//!
//! Services announce completed operations on an in-process broadcast bus so
//! that screens (or a CLI in `--verbose` mode) can react without polling.
//! Emitting never blocks: with no subscribers the event is simply dropped,
//! and a lagging subscriber loses its oldest events first.
//!
//! ```
//! use libappointly::service::events::{Event, EventBus};
//!
//! # async fn example() {
//! let bus = EventBus::new(16);
//! let mut receiver = bus.subscribe();
//!
//! bus.emit(Event::ProvidersLoaded { count: 3 });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("{:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::UserProfile;

pub type EventReceiver = broadcast::Receiver<Event>;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// `capacity` is the per-subscriber backlog before old events are dropped
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: Event) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Which form a validation event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Profile,
    SignUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Provider list replaced with a fresh snapshot
    ProvidersLoaded { count: usize },

    /// Provider list fetch failed
    ProvidersFailed { error: String },

    /// A form submission stopped at validation
    SubmissionRejected { form: FormKind, fields: Vec<String> },

    /// Profile accepted by the server and stored in the session
    ProfileUpdated { user: UserProfile },

    /// New avatar uploaded and stored in the session
    AvatarUpdated { user: UserProfile },

    /// Account created
    SignedUp { user_id: String },

    /// Session cleared
    SignedOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_event_emission_and_subscription() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.emit(Event::ProfileUpdated { user: ana() });

        match receiver.recv().await.unwrap() {
            Event::ProfileUpdated { user } => assert_eq!(user.id, "u1"),
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        event_bus.emit(Event::ProvidersLoaded { count: 2 });

        assert_eq!(
            receiver1.recv().await.unwrap(),
            Event::ProvidersLoaded { count: 2 }
        );
        assert_eq!(
            receiver2.recv().await.unwrap(),
            Event::ProvidersLoaded { count: 2 }
        );
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let event_bus = EventBus::new(10);

        // Must not panic or block
        event_bus.emit(Event::SignedOut);

        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::SubmissionRejected {
            form: FormKind::Profile,
            fields: vec!["email".to_string(), "name".to_string()],
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"submission_rejected\""));
        assert!(json.contains("\"form\":\"profile\""));

        let deserialized: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[test]
    fn test_unit_variant_serialization() {
        let json = serde_json::to_string(&Event::SignedOut).unwrap();
        assert_eq!(json, r#"{"type":"signed_out"}"#);
    }
}
