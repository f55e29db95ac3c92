use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::models::{TicketDraft, TicketId, TicketUpdate};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    #[serde(default)]
    pub ticket_id: Option<TicketId>,
    #[serde(flatten)]
    pub ticket: TicketUpdate,
}

pub async fn list_tickets(State(state): State<AppState>) -> Result<Response, AppError> {
    let tickets = state.tickets.list_tickets().await?;
    Ok(success(tickets, "Tickets fetched successfully"))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    path: Result<Path<TicketId>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let ticket = state.tickets.get_ticket(id).await?;
    Ok(success(ticket, "Ticket fetched successfully"))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    payload: Result<Json<TicketDraft>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(draft) = payload?;
    let ticket = state.tickets.create_ticket(draft).await?;
    Ok(created(ticket, "Ticket created successfully"))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    path: Result<Path<TicketId>, PathRejection>,
    payload: Result<Json<UpdateTicketRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    if request.ticket_id.is_some_and(|claimed| claimed != id) {
        return Err(AppError::ValidationError("Ticket ID mismatch".to_string()));
    }
    let ticket = state.tickets.update_ticket(id, request.ticket).await?;
    Ok(success(ticket, "Ticket updated successfully"))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    path: Result<Path<TicketId>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    state.tickets.delete_ticket(id).await?;
    Ok(empty_success("Ticket deleted successfully"))
}
