//! In-process arena implementation of [`EntityStore`].
//!
//! Entities live in id-keyed maps and relations are plain ids, so there are
//! no reference cycles between accounts, events and tickets. A single lock
//! guards the whole arena, which makes every operation atomic.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::{EntityKind, EntityStore, LinkOutcome, StoreError, StoreResult, UnlinkOutcome};
use crate::models::{
    Account, AccountDraft, AccountId, Event, EventDraft, EventId, Ticket, TicketDraft, TicketId,
};

#[derive(Debug, Default)]
struct Arena {
    accounts: BTreeMap<AccountId, Account>,
    events: BTreeMap<EventId, Event>,
    tickets: BTreeMap<TicketId, Ticket>,
    links: BTreeSet<(AccountId, EventId)>,
    last_account_id: i32,
    last_event_id: i32,
    last_ticket_id: i32,
}

impl Arena {
    fn check_account(draft: &AccountDraft) -> StoreResult<()> {
        if draft.email.trim().is_empty() {
            return Err(StoreError::ConstraintViolation(
                "accounts.email must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn check_event(draft: &EventDraft) -> StoreResult<()> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::ConstraintViolation(
                "events.name must not be empty".to_string(),
            ));
        }
        if draft.total_tickets < 0 {
            return Err(StoreError::ConstraintViolation(
                "events.total_tickets must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn check_ticket(&self, draft: &TicketDraft) -> StoreResult<()> {
        if draft.price < Decimal::ZERO {
            return Err(StoreError::ConstraintViolation(
                "tickets.price must not be negative".to_string(),
            ));
        }
        if !self.accounts.contains_key(&draft.account_id) {
            return Err(StoreError::ConstraintViolation(format!(
                "tickets.account_id references missing account {}",
                draft.account_id
            )));
        }
        if !self.events.contains_key(&draft.event_id) {
            return Err(StoreError::ConstraintViolation(format!(
                "tickets.event_id references missing event {}",
                draft.event_id
            )));
        }
        Ok(())
    }

    fn push_ticket(&mut self, draft: TicketDraft) -> StoreResult<Ticket> {
        self.check_ticket(&draft)?;
        self.last_ticket_id += 1;
        let ticket = Ticket::from_draft(TicketId(self.last_ticket_id), draft);
        self.tickets.insert(ticket.ticket_id, ticket.clone());
        Ok(ticket)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    arena: RwLock<Arena>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_account(&self, draft: AccountDraft) -> StoreResult<Account> {
        Arena::check_account(&draft)?;
        let mut arena = self.arena.write().await;
        arena.last_account_id += 1;
        let account = Account::from_draft(AccountId(arena.last_account_id), draft);
        arena.accounts.insert(account.account_id, account.clone());
        Ok(account)
    }

    async fn find_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.arena.read().await.accounts.get(&id).cloned())
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        Ok(self.arena.read().await.accounts.values().cloned().collect())
    }

    async fn update_account(
        &self,
        expected: &Account,
        replacement: AccountDraft,
    ) -> StoreResult<Account> {
        Arena::check_account(&replacement)?;
        let id = expected.account_id;
        let mut arena = self.arena.write().await;
        let stored = arena
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Account, id))?;
        if stored != expected {
            return Err(StoreError::conflict(EntityKind::Account, id));
        }
        *stored = Account::from_draft(id, replacement);
        Ok(stored.clone())
    }

    async fn delete_account(&self, id: AccountId) -> StoreResult<()> {
        let mut arena = self.arena.write().await;
        if arena.accounts.remove(&id).is_none() {
            return Err(StoreError::not_found(EntityKind::Account, id));
        }
        arena.tickets.retain(|_, ticket| ticket.account_id != id);
        arena.links.retain(|(account_id, _)| *account_id != id);
        Ok(())
    }

    async fn insert_event(&self, draft: EventDraft) -> StoreResult<Event> {
        Arena::check_event(&draft)?;
        let mut arena = self.arena.write().await;
        arena.last_event_id += 1;
        let event = Event::from_draft(EventId(arena.last_event_id), draft);
        arena.events.insert(event.event_id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        Ok(self.arena.read().await.events.get(&id).cloned())
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        Ok(self.arena.read().await.events.values().cloned().collect())
    }

    async fn update_event(&self, expected: &Event, replacement: EventDraft) -> StoreResult<Event> {
        Arena::check_event(&replacement)?;
        let id = expected.event_id;
        let mut arena = self.arena.write().await;
        let stored = arena
            .events
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Event, id))?;
        if stored != expected {
            return Err(StoreError::conflict(EntityKind::Event, id));
        }
        *stored = Event::from_draft(id, replacement);
        Ok(stored.clone())
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<()> {
        let mut arena = self.arena.write().await;
        if arena.events.remove(&id).is_none() {
            return Err(StoreError::not_found(EntityKind::Event, id));
        }
        arena.tickets.retain(|_, ticket| ticket.event_id != id);
        arena.links.retain(|(_, event_id)| *event_id != id);
        Ok(())
    }

    async fn insert_ticket(&self, draft: TicketDraft) -> StoreResult<Ticket> {
        self.arena.write().await.push_ticket(draft)
    }

    async fn find_ticket(&self, id: TicketId) -> StoreResult<Option<Ticket>> {
        Ok(self.arena.read().await.tickets.get(&id).cloned())
    }

    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        Ok(self.arena.read().await.tickets.values().cloned().collect())
    }

    async fn update_ticket(
        &self,
        expected: &Ticket,
        replacement: TicketDraft,
    ) -> StoreResult<Ticket> {
        let id = expected.ticket_id;
        let mut arena = self.arena.write().await;
        arena.check_ticket(&replacement)?;
        let stored = arena
            .tickets
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Ticket, id))?;
        if stored != expected {
            return Err(StoreError::conflict(EntityKind::Ticket, id));
        }
        *stored = Ticket::from_draft(id, replacement);
        Ok(stored.clone())
    }

    async fn delete_ticket(&self, id: TicketId) -> StoreResult<()> {
        match self.arena.write().await.tickets.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(EntityKind::Ticket, id)),
        }
    }

    async fn tickets_for_account(&self, id: AccountId) -> StoreResult<Vec<Ticket>> {
        let arena = self.arena.read().await;
        Ok(arena
            .tickets
            .values()
            .filter(|ticket| ticket.account_id == id)
            .cloned()
            .collect())
    }

    async fn tickets_for_event(&self, id: EventId) -> StoreResult<Vec<Ticket>> {
        let arena = self.arena.read().await;
        Ok(arena
            .tickets
            .values()
            .filter(|ticket| ticket.event_id == id)
            .cloned()
            .collect())
    }

    async fn is_linked(&self, account_id: AccountId, event_id: EventId) -> StoreResult<bool> {
        Ok(self
            .arena
            .read()
            .await
            .links
            .contains(&(account_id, event_id)))
    }

    async fn link_account_event(
        &self,
        account_id: AccountId,
        event_id: EventId,
        placeholder: TicketDraft,
    ) -> StoreResult<LinkOutcome> {
        let mut arena = self.arena.write().await;
        if !arena.accounts.contains_key(&account_id) {
            return Err(StoreError::not_found(EntityKind::Account, account_id));
        }
        if !arena.events.contains_key(&event_id) {
            return Err(StoreError::not_found(EntityKind::Event, event_id));
        }
        if arena.links.contains(&(account_id, event_id)) {
            return Ok(LinkOutcome::AlreadyLinked);
        }
        // Ticket first: a rejected placeholder must not leave a dangling link.
        let ticket = arena.push_ticket(placeholder)?;
        arena.links.insert((account_id, event_id));
        Ok(LinkOutcome::Linked(ticket))
    }

    async fn unlink_account_event(
        &self,
        account_id: AccountId,
        event_id: EventId,
    ) -> StoreResult<UnlinkOutcome> {
        let mut arena = self.arena.write().await;
        if !arena.accounts.contains_key(&account_id) {
            return Err(StoreError::not_found(EntityKind::Account, account_id));
        }
        if !arena.events.contains_key(&event_id) {
            return Err(StoreError::not_found(EntityKind::Event, event_id));
        }
        let link_removed = arena.links.remove(&(account_id, event_id));
        let before = arena.tickets.len();
        arena
            .tickets
            .retain(|_, ticket| !(ticket.account_id == account_id && ticket.event_id == event_id));
        let tickets_removed = (before - arena.tickets.len()) as u64;
        Ok(UnlinkOutcome {
            link_removed,
            tickets_removed,
        })
    }
}
