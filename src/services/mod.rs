//! Account, event and ticket operations.
//!
//! Each service is a stateless wrapper around the shared [`EntityStore`]
//! that validates input, issues store calls and translates store failures
//! into [`ServiceError`] kinds.
//!
//! [`EntityStore`]: crate::store::EntityStore

pub mod account_service;
pub mod error;
pub mod event_service;
pub mod ticket_service;

pub use account_service::AccountService;
pub use error::{ServiceError, ServiceResult};
pub use event_service::EventService;
pub use ticket_service::TicketService;
