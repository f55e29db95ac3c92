use chrono::Utc;
use tracing::{info, instrument};

use super::error::{ServiceError, ServiceResult};
use crate::models::{
    AccountId, Event, EventDetails, EventDraft, EventId, EventTicketSummary, TicketDraft,
};
use crate::store::{LinkOutcome, SharedStore, UnlinkOutcome};

#[derive(Clone)]
pub struct EventService {
    store: SharedStore,
}

fn validate(draft: &EventDraft) -> ServiceResult<()> {
    if draft.name.trim().is_empty() {
        return Err(ServiceError::validation("name is required"));
    }
    if draft.total_tickets < 0 {
        return Err(ServiceError::validation("total_tickets must not be negative"));
    }
    Ok(())
}

impl EventService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_events(&self) -> ServiceResult<Vec<Event>> {
        Ok(self.store.list_events().await?)
    }

    pub async fn get_event(&self, id: EventId) -> ServiceResult<Event> {
        self.store
            .find_event(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("event {id} not found")))
    }

    #[instrument(skip(self, draft))]
    pub async fn create_event(&self, draft: EventDraft) -> ServiceResult<Event> {
        validate(&draft)?;
        let event = self.store.insert_event(draft).await?;
        info!(event_id = %event.event_id, venue = %event.venue, "event created");
        Ok(event)
    }

    #[instrument(skip(self, draft))]
    pub async fn update_event(&self, id: EventId, draft: EventDraft) -> ServiceResult<Event> {
        validate(&draft)?;
        let current = self.get_event(id).await?;
        let event = self
            .store
            .update_event(&current, draft)
            .await
            .map_err(ServiceError::from_guarded_write)?;
        info!(event_id = %id, "event updated");
        Ok(event)
    }

    #[instrument(skip(self))]
    pub async fn delete_event(&self, id: EventId) -> ServiceResult<()> {
        self.store.delete_event(id).await?;
        info!(event_id = %id, "event deleted");
        Ok(())
    }

    pub async fn list_events_with_tickets(&self) -> ServiceResult<Vec<EventDetails>> {
        let events = self.store.list_events().await?;
        let mut details = Vec::with_capacity(events.len());
        for event in events {
            let tickets = self.store.tickets_for_event(event.event_id).await?;
            details.push(EventDetails {
                event,
                tickets: tickets.iter().map(EventTicketSummary::from).collect(),
            });
        }
        Ok(details)
    }

    /// Links the account to the event, issuing a placeholder ticket. Linking
    /// an already linked pair changes nothing.
    #[instrument(skip(self))]
    pub async fn link_event(
        &self,
        account_id: AccountId,
        event_id: EventId,
    ) -> ServiceResult<LinkOutcome> {
        let placeholder = TicketDraft::placeholder(account_id, event_id, Utc::now());
        let outcome = self
            .store
            .link_account_event(account_id, event_id, placeholder)
            .await?;
        match &outcome {
            LinkOutcome::Linked(ticket) => {
                info!(ticket_id = %ticket.ticket_id, "account linked to event")
            }
            LinkOutcome::AlreadyLinked => info!("account already linked to event"),
        }
        Ok(outcome)
    }

    /// Removes the link and the pair's tickets. Unlinking a pair that was
    /// never linked succeeds without changes.
    #[instrument(skip(self))]
    pub async fn unlink_event(
        &self,
        account_id: AccountId,
        event_id: EventId,
    ) -> ServiceResult<UnlinkOutcome> {
        let outcome = self
            .store
            .unlink_account_event(account_id, event_id)
            .await?;
        info!(
            link_removed = outcome.link_removed,
            tickets_removed = outcome.tickets_removed,
            "account unlinked from event"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{AccountDraft, Venue, UNASSIGNED_SEAT};
    use crate::services::AccountService;
    use crate::store::{EntityStore, MemoryStore};

    fn event_draft(name: &str) -> EventDraft {
        EventDraft {
            name: name.to_string(),
            description: "Live".to_string(),
            venue: Venue::MasseyHall,
            date: Utc.with_ymd_and_hms(2025, 9, 12, 20, 0, 0).unwrap(),
            total_tickets: 100,
        }
    }

    fn setup() -> (Arc<MemoryStore>, AccountService, EventService) {
        let store = Arc::new(MemoryStore::new());
        (
            store.clone(),
            AccountService::new(store.clone()),
            EventService::new(store),
        )
    }

    async fn seed_account(accounts: &AccountService, email: &str) -> AccountId {
        accounts
            .create_account(AccountDraft {
                email: email.to_string(),
                ..AccountDraft::default()
            })
            .await
            .unwrap()
            .account_id
    }

    #[tokio::test]
    async fn test_create_validates_name_and_capacity() {
        let (_, _, events) = setup();

        let err = events.create_event(event_draft(" ")).await.unwrap_err();
        assert_eq!(err, ServiceError::ValidationError("name is required".to_string()));

        let mut negative = event_draft("Show");
        negative.total_tickets = -1;
        let err = events.create_event(negative).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_event() {
        let (_, _, events) = setup();
        let event = events.create_event(event_draft("Show")).await.unwrap();

        let mut replacement = event_draft("Show (rescheduled)");
        replacement.venue = Venue::BellCentre;
        replacement.description = String::new();
        let updated = events.update_event(event.event_id, replacement.clone()).await.unwrap();

        assert_eq!(updated, Event::from_draft(event.event_id, replacement));
        assert_eq!(events.get_event(event.event_id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let (_, _, events) = setup();
        let err = events.update_event(EventId(9), event_draft("Show")).await.unwrap_err();
        assert_eq!(err, ServiceError::NotFound("event 9 not found".to_string()));
    }

    #[tokio::test]
    async fn test_link_creates_exactly_one_placeholder_ticket() {
        let (store, accounts, events) = setup();
        let account_id = seed_account(&accounts, "a@x.com").await;
        let event = events.create_event(event_draft("Show")).await.unwrap();

        let first = events.link_event(account_id, event.event_id).await.unwrap();
        let second = events.link_event(account_id, event.event_id).await.unwrap();

        assert!(matches!(first, LinkOutcome::Linked(_)));
        assert_eq!(second, LinkOutcome::AlreadyLinked);

        let tickets = store.tickets_for_event(event.event_id).await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].account_id, account_id);
        assert_eq!(tickets[0].price, Decimal::ZERO);
        assert_eq!(tickets[0].seat_number, UNASSIGNED_SEAT);
        assert!(store.is_linked(account_id, event.event_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unlink_after_link_removes_ticket_and_is_repeatable() {
        let (store, accounts, events) = setup();
        let account_id = seed_account(&accounts, "a@x.com").await;
        let event = events.create_event(event_draft("Show")).await.unwrap();
        events.link_event(account_id, event.event_id).await.unwrap();

        let outcome = events.unlink_event(account_id, event.event_id).await.unwrap();
        assert!(outcome.link_removed);
        assert_eq!(outcome.tickets_removed, 1);

        let again = events.unlink_event(account_id, event.event_id).await.unwrap();
        assert!(!again.link_removed);
        assert_eq!(again.tickets_removed, 0);

        assert!(store.list_tickets().await.unwrap().is_empty());
        assert!(!store.is_linked(account_id, event.event_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_link_and_unlink_report_missing_parents() {
        let (_, accounts, events) = setup();
        let account_id = seed_account(&accounts, "a@x.com").await;
        let event = events.create_event(event_draft("Show")).await.unwrap();

        assert!(matches!(
            events.link_event(account_id, EventId(99)).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            events.unlink_event(AccountId(99), event.event_id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_linked_account_deletion_keeps_event() {
        let (store, accounts, events) = setup();
        let account_id = seed_account(&accounts, "a@x.com").await;
        let event = events.create_event(event_draft("Show")).await.unwrap();
        assert_eq!(account_id, AccountId(1));
        assert_eq!(event.event_id, EventId(1));

        events.link_event(account_id, event.event_id).await.unwrap();
        accounts.delete_account(account_id).await.unwrap();

        assert!(store.list_tickets().await.unwrap().is_empty());
        assert_eq!(events.get_event(event.event_id).await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_events_with_tickets_lists_each_ticket_holder() {
        let (_, accounts, events) = setup();
        let first = seed_account(&accounts, "a@x.com").await;
        let second = seed_account(&accounts, "b@x.com").await;
        let show = events.create_event(event_draft("Show")).await.unwrap();
        let empty = events.create_event(event_draft("Matinee")).await.unwrap();
        events.link_event(first, show.event_id).await.unwrap();
        events.link_event(second, show.event_id).await.unwrap();

        let details = events.list_events_with_tickets().await.unwrap();

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].event, show);
        let holders: Vec<_> = details[0].tickets.iter().map(|t| t.account_id).collect();
        assert_eq!(holders, vec![first, second]);
        assert_eq!(details[1].event, empty);
        assert!(details[1].tickets.is_empty());
    }
}
