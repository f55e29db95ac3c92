//! Entity Store: durable storage for accounts, events and tickets.
//!
//! Every implementation enforces the same relational rules:
//!
//! - a ticket always references an existing account and an existing event;
//! - deleting an account or an event removes its tickets and links;
//! - ids are assigned on insert and never change;
//! - `update_*` is a full replace guarded by the snapshot the caller read
//!   (`expected`). A row that no longer matches yields
//!   [`StoreError::ConcurrencyConflict`], a row that is gone yields
//!   [`StoreError::NotFound`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{
    Account, AccountDraft, AccountId, Event, EventDraft, EventId, Ticket, TicketDraft, TicketId,
};

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{EntityKind, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

pub type SharedStore = Arc<dyn EntityStore>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link was recorded together with its placeholder ticket.
    Linked(Ticket),
    AlreadyLinked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnlinkOutcome {
    pub link_removed: bool,
    pub tickets_removed: u64,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn insert_account(&self, draft: AccountDraft) -> StoreResult<Account>;
    async fn find_account(&self, id: AccountId) -> StoreResult<Option<Account>>;
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;
    async fn update_account(&self, expected: &Account, replacement: AccountDraft)
        -> StoreResult<Account>;
    /// Removes the account along with its tickets and links.
    async fn delete_account(&self, id: AccountId) -> StoreResult<()>;

    async fn insert_event(&self, draft: EventDraft) -> StoreResult<Event>;
    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>>;
    async fn list_events(&self) -> StoreResult<Vec<Event>>;
    async fn update_event(&self, expected: &Event, replacement: EventDraft) -> StoreResult<Event>;
    /// Removes the event along with its tickets and links.
    async fn delete_event(&self, id: EventId) -> StoreResult<()>;

    async fn insert_ticket(&self, draft: TicketDraft) -> StoreResult<Ticket>;
    async fn find_ticket(&self, id: TicketId) -> StoreResult<Option<Ticket>>;
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>>;
    async fn update_ticket(&self, expected: &Ticket, replacement: TicketDraft)
        -> StoreResult<Ticket>;
    async fn delete_ticket(&self, id: TicketId) -> StoreResult<()>;

    async fn tickets_for_account(&self, id: AccountId) -> StoreResult<Vec<Ticket>>;
    async fn tickets_for_event(&self, id: EventId) -> StoreResult<Vec<Ticket>>;

    async fn is_linked(&self, account_id: AccountId, event_id: EventId) -> StoreResult<bool>;

    /// Atomically records the link and inserts `placeholder`, unless the pair
    /// is already linked.
    async fn link_account_event(
        &self,
        account_id: AccountId,
        event_id: EventId,
        placeholder: TicketDraft,
    ) -> StoreResult<LinkOutcome>;

    /// Atomically removes the link and every ticket held by the pair.
    async fn unlink_account_event(
        &self,
        account_id: AccountId,
        event_id: EventId,
    ) -> StoreResult<UnlinkOutcome>;
}
