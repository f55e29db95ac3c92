use crate::services::{AccountService, EventService, TicketService};
use crate::store::SharedStore;

/// Shared handler state; cloning only bumps the store's reference count.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub events: EventService,
    pub tickets: TicketService,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self {
            accounts: AccountService::new(store.clone()),
            events: EventService::new(store.clone()),
            tickets: TicketService::new(store),
        }
    }
}
