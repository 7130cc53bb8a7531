use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use server_api::{draft_from_payload, update_from_payload, ServiceError};
use shared::{
    domain::EventId,
    error::BadRequestBody,
    protocol::{EventPayload, PageQuery},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error};

use crate::app_state::AppState;

pub(crate) const EVENTS_ROUTE: &str = "/api/events";
const MAX_BODY_BYTES: usize = 64 * 1024;

const INVALID_ID: &str = "Invalid ID";
const INVALID_EVENT: &str = "Invalid event";
const INVALID_PAGING: &str = "Invalid paging";

pub(crate) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            EVENTS_ROUTE,
            get(get_events).post(create_event).put(update_event),
        )
        .route("/api/events/:id", get(get_event_by_id).delete(delete_event))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

pub(crate) fn event_location(event_id: EventId) -> String {
    format!("{EVENTS_ROUTE}/{event_id}")
}

/// Failure outcomes of the events controller.
#[derive(Debug)]
pub(crate) enum ControllerError {
    BadRequest(&'static str),
    Service(ServiceError),
}

impl From<ServiceError> for ControllerError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl IntoResponse for ControllerError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(BadRequestBody::new(message))).into_response()
            }
            Self::Service(err) => {
                error!(error = %err, "event service call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

async fn get_events(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response, ControllerError> {
    let Query(query) = query.map_err(|_| ControllerError::BadRequest(INVALID_PAGING))?;
    let paging = state.paging(query);

    match state.events.get_all(paging).await? {
        Some(events) => Ok(Json(events).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

async fn get_event_by_id(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ControllerError> {
    let event_id = valid_event_id(id, INVALID_ID)?;

    match state.events.get_by_id(event_id).await? {
        Some(event) => Ok(Json(event).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Option<EventPayload>>, JsonRejection>,
) -> Result<Response, ControllerError> {
    let payload = present_payload(payload)?;
    let draft = draft_from_payload(payload).map_err(|err| {
        debug!(error = %err, "rejected event body");
        ControllerError::BadRequest(INVALID_EVENT)
    })?;

    let event = state.events.create(draft).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, event_location(event.id))],
        Json(event),
    )
        .into_response())
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Option<EventPayload>>, JsonRejection>,
) -> Result<Response, ControllerError> {
    let payload = present_payload(payload)?;
    let (event_id, draft) = update_from_payload(payload).map_err(|err| {
        debug!(error = %err, "rejected event body");
        ControllerError::BadRequest(INVALID_EVENT)
    })?;

    let event = state.events.update(event_id, draft).await?;
    Ok((
        StatusCode::ACCEPTED,
        [(header::LOCATION, event_location(event.id))],
        Json(event),
    )
        .into_response())
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ControllerError> {
    // Only an unparsable id is rejected; missing or non-positive ids still answer 202.
    let Path(id) = id.map_err(|_| ControllerError::BadRequest(INVALID_EVENT))?;
    let event_id = EventId(id);

    state.events.delete(event_id).await?;
    Ok((
        StatusCode::ACCEPTED,
        [(header::LOCATION, event_location(event_id))],
    )
        .into_response())
}

fn valid_event_id(
    id: Result<Path<i64>, PathRejection>,
    message: &'static str,
) -> Result<EventId, ControllerError> {
    let Path(id) = id.map_err(|_| ControllerError::BadRequest(message))?;
    let event_id = EventId(id);
    if !event_id.is_valid() {
        return Err(ControllerError::BadRequest(message));
    }
    Ok(event_id)
}

fn present_payload(
    payload: Result<Json<Option<EventPayload>>, JsonRejection>,
) -> Result<EventPayload, ControllerError> {
    match payload {
        Ok(Json(Some(payload))) => Ok(payload),
        Ok(Json(None)) => Err(ControllerError::BadRequest(INVALID_EVENT)),
        Err(rejection) => {
            debug!(error = %rejection, "unreadable event body");
            Err(ControllerError::BadRequest(INVALID_EVENT))
        }
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
