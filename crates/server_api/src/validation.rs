use shared::{
    domain::{EventDraft, EventId},
    protocol::EventPayload,
};
use thiserror::Error;

pub const MAX_NAME_CHARS: usize = 120;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const MAX_LOCATION_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("event name is required")]
    MissingName,
    #[error("event name exceeds {MAX_NAME_CHARS} characters")]
    NameTooLong,
    #[error("event description exceeds {MAX_DESCRIPTION_CHARS} characters")]
    DescriptionTooLong,
    #[error("event location exceeds {MAX_LOCATION_CHARS} characters")]
    LocationTooLong,
    #[error("event ends before it starts")]
    EndsBeforeStart,
    #[error("event id is required")]
    MissingId,
    #[error("event id {0} is not positive")]
    InvalidId(i64),
}

/// Validates a create body. Any `id` in the payload is ignored.
pub fn draft_from_payload(payload: EventPayload) -> Result<EventDraft, ValidationError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong);
    }

    let description = non_blank(payload.description);
    if description
        .as_deref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_CHARS)
    {
        return Err(ValidationError::DescriptionTooLong);
    }

    let location = non_blank(payload.location);
    if location
        .as_deref()
        .is_some_and(|l| l.chars().count() > MAX_LOCATION_CHARS)
    {
        return Err(ValidationError::LocationTooLong);
    }

    if payload.ends_at.is_some_and(|end| end < payload.starts_at) {
        return Err(ValidationError::EndsBeforeStart);
    }

    Ok(EventDraft {
        name: name.to_string(),
        description,
        location,
        starts_at: payload.starts_at,
        ends_at: payload.ends_at,
    })
}

/// Validates an update body, which must name the event it replaces.
pub fn update_from_payload(payload: EventPayload) -> Result<(EventId, EventDraft), ValidationError> {
    let id = payload.id.ok_or(ValidationError::MissingId)?;
    let event_id = EventId(id);
    if !event_id.is_valid() {
        return Err(ValidationError::InvalidId(id));
    }
    Ok((event_id, draft_from_payload(payload)?))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
