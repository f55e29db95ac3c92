pub mod account;
pub mod event;
pub mod ticket;

pub use account::{Account, AccountDetails, AccountDraft, AccountId, AccountView};
pub use event::{Event, EventDetails, EventDraft, EventId, Venue};
pub use ticket::{
    EventTicketSummary, Ticket, TicketDraft, TicketId, TicketSummary, TicketUpdate,
    UNASSIGNED_SEAT,
};
