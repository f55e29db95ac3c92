use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::account::AccountId;
use super::event::EventId;

/// Seat label given to tickets created by linking an account to an event.
pub const UNASSIGNED_SEAT: &str = "unassigned";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct TicketId(pub i32);

impl From<TicketId> for i32 {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Ticket {
    pub ticket_id: TicketId,
    pub price: Decimal,
    pub seat_number: String,
    pub booking_date: DateTime<Utc>,
    pub account_id: AccountId,
    pub event_id: EventId,
}

impl Ticket {
    pub fn from_draft(ticket_id: TicketId, draft: TicketDraft) -> Self {
        Self {
            ticket_id,
            price: draft.price,
            seat_number: draft.seat_number,
            booking_date: draft.booking_date,
            account_id: draft.account_id,
            event_id: draft.event_id,
        }
    }
}

/// Client-supplied ticket fields. A missing booking date means "now".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketDraft {
    pub price: Decimal,
    #[serde(default)]
    pub seat_number: String,
    #[serde(default = "Utc::now")]
    pub booking_date: DateTime<Utc>,
    pub account_id: AccountId,
    pub event_id: EventId,
}

impl TicketDraft {
    /// The zero-priced, unseated ticket that materialises an account/event link.
    pub fn placeholder(
        account_id: AccountId,
        event_id: EventId,
        booked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            price: Decimal::ZERO,
            seat_number: UNASSIGNED_SEAT.to_string(),
            booking_date: booked_at,
            account_id,
            event_id,
        }
    }
}

/// Replacement fields for an existing ticket. Without a booking date the
/// ticket keeps the one it already has.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketUpdate {
    pub price: Decimal,
    #[serde(default)]
    pub seat_number: String,
    #[serde(default)]
    pub booking_date: Option<DateTime<Utc>>,
    pub account_id: AccountId,
    pub event_id: EventId,
}

impl TicketUpdate {
    pub fn into_draft(self, current_booking: DateTime<Utc>) -> TicketDraft {
        TicketDraft {
            price: self.price,
            seat_number: self.seat_number,
            booking_date: self.booking_date.unwrap_or(current_booking),
            account_id: self.account_id,
            event_id: self.event_id,
        }
    }
}

impl From<TicketDraft> for TicketUpdate {
    fn from(draft: TicketDraft) -> Self {
        Self {
            price: draft.price,
            seat_number: draft.seat_number,
            booking_date: Some(draft.booking_date),
            account_id: draft.account_id,
            event_id: draft.event_id,
        }
    }
}

/// Ticket as seen from its account: no back-reference to the account itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketSummary {
    pub ticket_id: TicketId,
    pub price: Decimal,
    pub seat_number: String,
    pub booking_date: DateTime<Utc>,
    pub event_id: EventId,
}

impl From<&Ticket> for TicketSummary {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.ticket_id,
            price: ticket.price,
            seat_number: ticket.seat_number.clone(),
            booking_date: ticket.booking_date,
            event_id: ticket.event_id,
        }
    }
}

/// Ticket as seen from its event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTicketSummary {
    pub ticket_id: TicketId,
    pub price: Decimal,
    pub seat_number: String,
    pub booking_date: DateTime<Utc>,
    pub account_id: AccountId,
}

impl From<&Ticket> for EventTicketSummary {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.ticket_id,
            price: ticket.price,
            seat_number: ticket.seat_number.clone(),
            booking_date: ticket.booking_date,
            account_id: ticket.account_id,
        }
    }
}
