//! Provider list fetch

use std::sync::Arc;

use super::events::{Event, EventBus};
use crate::api::ProviderSource;
use crate::error::Result;
use crate::types::Provider;

/// Fetches the bookable providers.
///
/// Each call is a single request. The caller replaces its whole collection
/// with the result; there is no merging, paging or retrying.
#[derive(Clone)]
pub struct ProviderService {
    source: Arc<dyn ProviderSource>,
    event_bus: EventBus,
}

impl ProviderService {
    pub fn new(source: Arc<dyn ProviderSource>, event_bus: EventBus) -> Self {
        Self { source, event_bus }
    }

    pub async fn fetch(&self) -> Result<Vec<Provider>> {
        match self.source.list_providers().await {
            Ok(providers) => {
                tracing::debug!(count = providers.len(), "providers loaded");
                self.event_bus.emit(Event::ProvidersLoaded {
                    count: providers.len(),
                });
                Ok(providers)
            }
            Err(e) => {
                tracing::warn!("Failed to load providers: {}", e);
                self.event_bus.emit(Event::ProvidersFailed {
                    error: e.to_string(),
                });
                Err(e.into())
            }
        }
    }
}
