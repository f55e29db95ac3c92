use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::error::{ServiceError, ServiceResult};
use crate::models::{Ticket, TicketDraft, TicketId, TicketUpdate};
use crate::store::SharedStore;

/// Prices are whole cents.
const PRICE_SCALE: u32 = 2;
/// `NUMERIC(18, 2)` leaves sixteen integer digits.
const PRICE_INTEGER_DIGITS: u32 = 16;

#[derive(Clone)]
pub struct TicketService {
    store: SharedStore,
}

// Account and event references are checked by the store, which reports a
// missing parent as a constraint violation. The returned draft carries the
// price at cent scale so every backend stores the same value.
fn validate(mut draft: TicketDraft) -> ServiceResult<TicketDraft> {
    if draft.price < Decimal::ZERO {
        return Err(ServiceError::validation("price must not be negative"));
    }
    if draft.price.normalize().scale() > PRICE_SCALE {
        return Err(ServiceError::validation("price must not have more than 2 decimal places"));
    }
    if draft.price >= Decimal::from(10_i64.pow(PRICE_INTEGER_DIGITS)) {
        return Err(ServiceError::validation("price is too large"));
    }
    if draft.seat_number.trim().is_empty() {
        return Err(ServiceError::validation("seat_number is required"));
    }
    draft.price.rescale(PRICE_SCALE);
    Ok(draft)
}

impl TicketService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_tickets(&self) -> ServiceResult<Vec<Ticket>> {
        Ok(self.store.list_tickets().await?)
    }

    pub async fn get_ticket(&self, id: TicketId) -> ServiceResult<Ticket> {
        self.store
            .find_ticket(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("ticket {id} not found")))
    }

    #[instrument(
        skip(self, draft),
        fields(account_id = %draft.account_id, event_id = %draft.event_id)
    )]
    pub async fn create_ticket(&self, draft: TicketDraft) -> ServiceResult<Ticket> {
        let draft = validate(draft)?;
        let ticket = self.store.insert_ticket(draft).await?;
        info!(ticket_id = %ticket.ticket_id, "ticket created");
        Ok(ticket)
    }

    /// Full replace; a missing booking date keeps the stored one.
    #[instrument(skip(self, update))]
    pub async fn update_ticket(&self, id: TicketId, update: TicketUpdate) -> ServiceResult<Ticket> {
        let current = self.get_ticket(id).await?;
        let draft = validate(update.into_draft(current.booking_date))?;
        let ticket = self
            .store
            .update_ticket(&current, draft)
            .await
            .map_err(ServiceError::from_guarded_write)?;
        info!(ticket_id = %id, "ticket updated");
        Ok(ticket)
    }

    #[instrument(skip(self))]
    pub async fn delete_ticket(&self, id: TicketId) -> ServiceResult<()> {
        self.store.delete_ticket(id).await?;
        info!(ticket_id = %id, "ticket deleted");
        Ok(())
    }
}
