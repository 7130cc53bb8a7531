use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    domain::{Event, EventDraft, EventId},
    protocol::Paging,
};
use storage::Storage;
use thiserror::Error;
use tracing::info;

pub mod validation;

pub use validation::{draft_from_payload, update_from_payload, ValidationError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("event {0} not found")]
    NotFound(EventId),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Business operations behind the events API.
#[async_trait]
pub trait EventService: Send + Sync {
    /// `None` when the requested page holds no events.
    async fn get_all(&self, paging: Paging) -> Result<Option<Vec<Event>>, ServiceError>;

    async fn get_by_id(&self, event_id: EventId) -> Result<Option<Event>, ServiceError>;

    async fn create(&self, draft: EventDraft) -> Result<Event, ServiceError>;

    async fn update(&self, event_id: EventId, draft: EventDraft) -> Result<Event, ServiceError>;

    /// Returns whether an event was removed.
    async fn delete(&self, event_id: EventId) -> Result<bool, ServiceError>;

    async fn upcoming(&self, from: DateTime<Utc>, limit: u32) -> Result<Vec<Event>, ServiceError>;
}

#[derive(Clone)]
pub struct StoredEventService {
    storage: Storage,
}

impl StoredEventService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl EventService for StoredEventService {
    async fn get_all(&self, paging: Paging) -> Result<Option<Vec<Event>>, ServiceError> {
        let events = self
            .storage
            .list_events(paging.offset(), paging.limit())
            .await?;
        Ok((!events.is_empty()).then_some(events))
    }

    async fn get_by_id(&self, event_id: EventId) -> Result<Option<Event>, ServiceError> {
        Ok(self.storage.load_event(event_id).await?)
    }

    async fn create(&self, draft: EventDraft) -> Result<Event, ServiceError> {
        let event = self.storage.insert_event(&draft).await?;
        info!(event_id = %event.id, name = %event.name, "event created");
        Ok(event)
    }

    async fn update(&self, event_id: EventId, draft: EventDraft) -> Result<Event, ServiceError> {
        let event = self
            .storage
            .update_event(event_id, &draft)
            .await?
            .ok_or(ServiceError::NotFound(event_id))?;
        info!(%event_id, "event updated");
        Ok(event)
    }

    async fn delete(&self, event_id: EventId) -> Result<bool, ServiceError> {
        let removed = self.storage.delete_event(event_id).await?;
        info!(%event_id, removed, "event delete requested");
        Ok(removed)
    }

    async fn upcoming(&self, from: DateTime<Utc>, limit: u32) -> Result<Vec<Event>, ServiceError> {
        Ok(self
            .storage
            .list_events_starting_after(from, i64::from(limit))
            .await?)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
