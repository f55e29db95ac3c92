use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::models::{AccountDraft, AccountId};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

/// Update body. The id is optional, but when present it must match the path.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub account_id: Option<AccountId>,
    #[serde(flatten)]
    pub account: AccountDraft,
}

pub async fn list_accounts(State(state): State<AppState>) -> Result<Response, AppError> {
    let accounts = state.accounts.list_accounts().await?;
    Ok(success(accounts, "Accounts fetched successfully"))
}

pub async fn list_account_details(State(state): State<AppState>) -> Result<Response, AppError> {
    let details = state.accounts.list_account_details().await?;
    Ok(success(details, "Account details fetched successfully"))
}

pub async fn get_account(
    State(state): State<AppState>,
    path: Result<Path<AccountId>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let account = state.accounts.get_account(id).await?;
    Ok(success(account, "Account fetched successfully"))
}

pub async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<AccountDraft>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(draft) = payload?;
    let account = state.accounts.create_account(draft).await?;
    Ok(created(account, "Account created successfully"))
}

pub async fn update_account(
    State(state): State<AppState>,
    path: Result<Path<AccountId>, PathRejection>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    if request.account_id.is_some_and(|claimed| claimed != id) {
        return Err(AppError::ValidationError("Account ID mismatch".to_string()));
    }
    let account = state.accounts.update_account(id, request.account).await?;
    Ok(success(account, "Account updated successfully"))
}

pub async fn delete_account(
    State(state): State<AppState>,
    path: Result<Path<AccountId>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    state.accounts.delete_account(id).await?;
    Ok(empty_success("Account deleted successfully"))
}

pub async fn account_tickets(
    State(state): State<AppState>,
    path: Result<Path<AccountId>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let tickets = state.accounts.tickets_for_account(id).await?;
    Ok(success(tickets, "Tickets fetched successfully"))
}

pub async fn account_details(
    State(state): State<AppState>,
    path: Result<Path<AccountId>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let details = state.accounts.account_details(id).await?;
    Ok(success(details, "Account details fetched successfully"))
}
