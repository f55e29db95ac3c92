//! Postgres implementation of [`EntityStore`] on top of sqlx.
//!
//! Referential integrity and cascades are declared in the schema
//! (`migrations/`); this module maps the resulting database errors into
//! [`StoreError`] and never lets a raw `sqlx::Error` escape.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::debug;

use super::{EntityKind, EntityStore, LinkOutcome, StoreError, StoreResult, UnlinkOutcome};
use crate::models::{
    Account, AccountDraft, AccountId, Event, EventDraft, EventId, Ticket, TicketDraft, TicketId,
};

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

const ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Translate a sqlx failure into the store taxonomy.
pub fn map_sqlx_error(error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::Database(db_error) => {
            debug!(code = ?db_error.code(), message = db_error.message(), "database error");
            match db_error.code().as_deref() {
                Some(
                    FOREIGN_KEY_VIOLATION
                    | UNIQUE_VIOLATION
                    | NOT_NULL_VIOLATION
                    | CHECK_VIOLATION
                    | NUMERIC_VALUE_OUT_OF_RANGE,
                ) => StoreError::ConstraintViolation(db_error.message().to_string()),
                _ => StoreError::Persistence(db_error.message().to_string()),
            }
        }
        other => {
            debug!(error = %other, "sqlx operation failed");
            StoreError::Persistence(other.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }

    async fn begin(&self) -> StoreResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(map_sqlx_error)
    }

    async fn row_exists(&self, sql: &'static str, id: i32) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    /// Decide why a guarded update touched no row.
    async fn missed_update(
        &self,
        exists_sql: &'static str,
        entity: EntityKind,
        id: i32,
    ) -> StoreError {
        match self.row_exists(exists_sql, id).await {
            Ok(true) => StoreError::conflict(entity, id),
            Ok(false) => StoreError::not_found(entity, id),
            Err(error) => error,
        }
    }
}

const ACCOUNT_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM accounts WHERE account_id = $1)";
const EVENT_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM events WHERE event_id = $1)";
const TICKET_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM tickets WHERE ticket_id = $1)";

async fn ensure_parents(
    tx: &mut Transaction<'static, Postgres>,
    account_id: AccountId,
    event_id: EventId,
) -> StoreResult<()> {
    let account_exists = sqlx::query_scalar::<_, bool>(ACCOUNT_EXISTS)
        .bind(account_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;
    if !account_exists {
        return Err(StoreError::not_found(EntityKind::Account, account_id));
    }

    let event_exists = sqlx::query_scalar::<_, bool>(EVENT_EXISTS)
        .bind(event_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;
    if !event_exists {
        return Err(StoreError::not_found(EntityKind::Event, event_id));
    }
    Ok(())
}

#[async_trait]
impl EntityStore for PgStore {
    async fn insert_account(&self, draft: AccountDraft) -> StoreResult<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (first_name, last_name, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING account_id, first_name, last_name, email, password
            "#,
        )
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.password)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT account_id, first_name, last_name, email, password
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT account_id, first_name, last_name, email, password
            FROM accounts
            ORDER BY account_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_account(
        &self,
        expected: &Account,
        replacement: AccountDraft,
    ) -> StoreResult<Account> {
        let updated = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET first_name = $2, last_name = $3, email = $4, password = $5
            WHERE account_id = $1
              AND first_name = $6 AND last_name = $7 AND email = $8 AND password = $9
            RETURNING account_id, first_name, last_name, email, password
            "#,
        )
        .bind(expected.account_id)
        .bind(&replacement.first_name)
        .bind(&replacement.last_name)
        .bind(&replacement.email)
        .bind(&replacement.password)
        .bind(&expected.first_name)
        .bind(&expected.last_name)
        .bind(&expected.email)
        .bind(&expected.password)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match updated {
            Some(account) => Ok(account),
            None => Err(self
                .missed_update(ACCOUNT_EXISTS, EntityKind::Account, expected.account_id.0)
                .await),
        }
    }

    async fn delete_account(&self, id: AccountId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Account, id));
        }
        Ok(())
    }

    async fn insert_event(&self, draft: EventDraft) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, description, venue, event_date, total_tickets)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING event_id, name, description, venue, event_date, total_tickets
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.venue)
        .bind(draft.date)
        .bind(draft.total_tickets)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT event_id, name, description, venue, event_date, total_tickets
            FROM events
            WHERE event_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT event_id, name, description, venue, event_date, total_tickets
            FROM events
            ORDER BY event_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_event(&self, expected: &Event, replacement: EventDraft) -> StoreResult<Event> {
        let updated = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET name = $2, description = $3, venue = $4, event_date = $5, total_tickets = $6
            WHERE event_id = $1
              AND name = $7 AND description = $8 AND venue = $9
              AND event_date = $10 AND total_tickets = $11
            RETURNING event_id, name, description, venue, event_date, total_tickets
            "#,
        )
        .bind(expected.event_id)
        .bind(&replacement.name)
        .bind(&replacement.description)
        .bind(replacement.venue)
        .bind(replacement.date)
        .bind(replacement.total_tickets)
        .bind(&expected.name)
        .bind(&expected.description)
        .bind(expected.venue)
        .bind(expected.date)
        .bind(expected.total_tickets)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match updated {
            Some(event) => Ok(event),
            None => Err(self
                .missed_update(EVENT_EXISTS, EntityKind::Event, expected.event_id.0)
                .await),
        }
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Event, id));
        }
        Ok(())
    }

    async fn insert_ticket(&self, draft: TicketDraft) -> StoreResult<Ticket> {
        sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (price, seat_number, booking_date, account_id, event_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING ticket_id, price, seat_number, booking_date, account_id, event_id
            "#,
        )
        .bind(draft.price)
        .bind(&draft.seat_number)
        .bind(draft.booking_date)
        .bind(draft.account_id)
        .bind(draft.event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_ticket(&self, id: TicketId) -> StoreResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            r#"
            SELECT ticket_id, price, seat_number, booking_date, account_id, event_id
            FROM tickets
            WHERE ticket_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            r#"
            SELECT ticket_id, price, seat_number, booking_date, account_id, event_id
            FROM tickets
            ORDER BY ticket_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_ticket(
        &self,
        expected: &Ticket,
        replacement: TicketDraft,
    ) -> StoreResult<Ticket> {
        let updated = sqlx::query_as::<_, Ticket>(
            r#"
            UPDATE tickets
            SET price = $2, seat_number = $3, booking_date = $4, account_id = $5, event_id = $6
            WHERE ticket_id = $1
              AND price = $7 AND seat_number = $8 AND booking_date = $9
              AND account_id = $10 AND event_id = $11
            RETURNING ticket_id, price, seat_number, booking_date, account_id, event_id
            "#,
        )
        .bind(expected.ticket_id)
        .bind(replacement.price)
        .bind(&replacement.seat_number)
        .bind(replacement.booking_date)
        .bind(replacement.account_id)
        .bind(replacement.event_id)
        .bind(expected.price)
        .bind(&expected.seat_number)
        .bind(expected.booking_date)
        .bind(expected.account_id)
        .bind(expected.event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match updated {
            Some(ticket) => Ok(ticket),
            None => Err(self
                .missed_update(TICKET_EXISTS, EntityKind::Ticket, expected.ticket_id.0)
                .await),
        }
    }

    async fn delete_ticket(&self, id: TicketId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tickets WHERE ticket_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Ticket, id));
        }
        Ok(())
    }

    async fn tickets_for_account(&self, id: AccountId) -> StoreResult<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            r#"
            SELECT ticket_id, price, seat_number, booking_date, account_id, event_id
            FROM tickets
            WHERE account_id = $1
            ORDER BY ticket_id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn tickets_for_event(&self, id: EventId) -> StoreResult<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            r#"
            SELECT ticket_id, price, seat_number, booking_date, account_id, event_id
            FROM tickets
            WHERE event_id = $1
            ORDER BY ticket_id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn is_linked(&self, account_id: AccountId, event_id: EventId) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM account_events WHERE account_id = $1 AND event_id = $2)",
        )
        .bind(account_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn link_account_event(
        &self,
        account_id: AccountId,
        event_id: EventId,
        placeholder: TicketDraft,
    ) -> StoreResult<LinkOutcome> {
        let mut tx = self.begin().await?;
        ensure_parents(&mut tx, account_id, event_id).await?;

        // Concurrent linkers serialise on the primary key; the loser inserts nothing.
        let linked = sqlx::query(
            r#"
            INSERT INTO account_events (account_id, event_id)
            VALUES ($1, $2)
            ON CONFLICT (account_id, event_id) DO NOTHING
            "#,
        )
        .bind(account_id)
        .bind(event_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if linked.rows_affected() == 0 {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(LinkOutcome::AlreadyLinked);
        }

        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (price, seat_number, booking_date, account_id, event_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING ticket_id, price, seat_number, booking_date, account_id, event_id
            "#,
        )
        .bind(placeholder.price)
        .bind(&placeholder.seat_number)
        .bind(placeholder.booking_date)
        .bind(placeholder.account_id)
        .bind(placeholder.event_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(LinkOutcome::Linked(ticket))
    }

    async fn unlink_account_event(
        &self,
        account_id: AccountId,
        event_id: EventId,
    ) -> StoreResult<UnlinkOutcome> {
        let mut tx = self.begin().await?;
        ensure_parents(&mut tx, account_id, event_id).await?;

        let link = sqlx::query("DELETE FROM account_events WHERE account_id = $1 AND event_id = $2")
            .bind(account_id)
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let tickets = sqlx::query("DELETE FROM tickets WHERE account_id = $1 AND event_id = $2")
            .bind(account_id)
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(UnlinkOutcome {
            link_removed: link.rows_affected() > 0,
            tickets_removed: tickets.rows_affected(),
        })
    }
}
