use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ticket::TicketSummary;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct AccountId(pub i32);

impl From<AccountId> for i32 {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored account. The password is opaque and never serialized back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Account {
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Account {
    pub fn from_draft(account_id: AccountId, draft: AccountDraft) -> Self {
        Self {
            account_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            password: draft.password,
        }
    }
}

/// Client-supplied account fields, used for both create and full-replace update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccountDraft {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
        }
    }
}

/// An account together with the reduced view of every ticket it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountDetails {
    pub account: AccountView,
    pub tickets: Vec<TicketSummary>,
}
