use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::models::{AccountId, EventDraft, EventId};
use crate::state::AppState;
use crate::store::LinkOutcome;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub event_id: Option<EventId>,
    #[serde(flatten)]
    pub event: EventDraft,
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.events.list_events().await?;
    Ok(success(events, "Events fetched successfully"))
}

pub async fn list_events_with_tickets(
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let events = state.events.list_events_with_tickets().await?;
    Ok(success(events, "Events fetched successfully"))
}

pub async fn get_event(
    State(state): State<AppState>,
    path: Result<Path<EventId>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let event = state.events.get_event(id).await?;
    Ok(success(event, "Event fetched successfully"))
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<EventDraft>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(draft) = payload?;
    let event = state.events.create_event(draft).await?;
    Ok(created(event, "Event created successfully"))
}

pub async fn update_event(
    State(state): State<AppState>,
    path: Result<Path<EventId>, PathRejection>,
    payload: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    if request.event_id.is_some_and(|claimed| claimed != id) {
        return Err(AppError::ValidationError("Event ID mismatch".to_string()));
    }
    let event = state.events.update_event(id, request.event).await?;
    Ok(success(event, "Event updated successfully"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    path: Result<Path<EventId>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    state.events.delete_event(id).await?;
    Ok(empty_success("Event deleted successfully"))
}

pub async fn link_account(
    State(state): State<AppState>,
    path: Result<Path<(EventId, AccountId)>, PathRejection>,
) -> Result<Response, AppError> {
    let Path((event_id, account_id)) = path?;
    match state.events.link_event(account_id, event_id).await? {
        LinkOutcome::Linked(ticket) => Ok(created(ticket, "Account linked to event")),
        LinkOutcome::AlreadyLinked => Ok(empty_success("Account already linked to event")),
    }
}

pub async fn unlink_account(
    State(state): State<AppState>,
    path: Result<Path<(EventId, AccountId)>, PathRejection>,
) -> Result<Response, AppError> {
    let Path((event_id, account_id)) = path?;
    let outcome = state.events.unlink_event(account_id, event_id).await?;
    Ok(success(outcome, "Account unlinked from event"))
}
