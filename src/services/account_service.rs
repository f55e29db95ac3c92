use tracing::{info, instrument};

use super::error::{ServiceError, ServiceResult};
use crate::models::{Account, AccountDetails, AccountDraft, AccountId, AccountView, TicketSummary};
use crate::store::SharedStore;

#[derive(Clone)]
pub struct AccountService {
    store: SharedStore,
}

fn validate(draft: &AccountDraft) -> ServiceResult<()> {
    let email = draft.email.trim();
    if email.is_empty() {
        return Err(ServiceError::validation("email is required"));
    }
    if !email.contains('@') {
        return Err(ServiceError::validation("email must be an email address"));
    }
    Ok(())
}

impl AccountService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_accounts(&self) -> ServiceResult<Vec<Account>> {
        Ok(self.store.list_accounts().await?)
    }

    pub async fn get_account(&self, id: AccountId) -> ServiceResult<Account> {
        self.store
            .find_account(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("account {id} not found")))
    }

    #[instrument(skip(self, draft))]
    pub async fn create_account(&self, draft: AccountDraft) -> ServiceResult<Account> {
        validate(&draft)?;
        let account = self.store.insert_account(draft).await?;
        info!(account_id = %account.account_id, "account created");
        Ok(account)
    }

    /// Full replace: every field of the stored account is overwritten.
    #[instrument(skip(self, draft))]
    pub async fn update_account(
        &self,
        id: AccountId,
        draft: AccountDraft,
    ) -> ServiceResult<Account> {
        validate(&draft)?;
        let current = self.get_account(id).await?;
        let account = self
            .store
            .update_account(&current, draft)
            .await
            .map_err(ServiceError::from_guarded_write)?;
        info!(account_id = %id, "account updated");
        Ok(account)
    }

    /// Deletes the account; its tickets and event links go with it.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: AccountId) -> ServiceResult<()> {
        self.store.delete_account(id).await?;
        info!(account_id = %id, "account deleted");
        Ok(())
    }

    /// Reduced view of the account's tickets. An unknown account simply owns none.
    pub async fn tickets_for_account(&self, id: AccountId) -> ServiceResult<Vec<TicketSummary>> {
        let tickets = self.store.tickets_for_account(id).await?;
        Ok(tickets.iter().map(TicketSummary::from).collect())
    }

    pub async fn account_details(&self, id: AccountId) -> ServiceResult<AccountDetails> {
        let account = self.get_account(id).await?;
        let tickets = self.tickets_for_account(id).await?;
        Ok(AccountDetails {
            account: AccountView::from(&account),
            tickets,
        })
    }

    pub async fn list_account_details(&self) -> ServiceResult<Vec<AccountDetails>> {
        let accounts = self.store.list_accounts().await?;
        let mut details = Vec::with_capacity(accounts.len());
        for account in &accounts {
            details.push(AccountDetails {
                account: AccountView::from(account),
                tickets: self.tickets_for_account(account.account_id).await?,
            });
        }
        Ok(details)
    }
}
