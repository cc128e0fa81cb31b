//! In-memory wallet store.
//!
//! One mutex over wallets and ledger makes every [`WalletStore::apply`] an
//! atomic check-and-commit, the same guarantee the PostgreSQL adapter gets
//! from row locking. Used by tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::wallet::{
    LedgerEntry, ResourceBundle, ResourceType, TransactionType, Wallet, WalletMutation,
};
use crate::ports::{LedgerReader, WalletStore};

#[derive(Default)]
struct WalletState {
    wallets: HashMap<UserId, Wallet>,
    ledger: Vec<LedgerEntry>,
}

/// In-memory [`WalletStore`] + [`LedgerReader`].
#[derive(Default)]
pub struct InMemoryWalletStore {
    state: Mutex<WalletState>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a wallet with balances, without ledger entries.
    ///
    /// Test setup only: a seeded wallet intentionally diverges from its
    /// (empty) ledger, so reconciliation tests should seed via credits
    /// instead.
    pub fn seed_balances(&self, user_id: UserId, bundle: ResourceBundle) {
        let mut state = self.state.lock().unwrap();
        let now = Timestamp::now();
        let wallet = state
            .wallets
            .entry(user_id)
            .or_insert_with(|| Wallet::zeroed(user_id, now));
        wallet.project_vouchers = bundle.project_vouchers;
        wallet.facilitator_seats = bundle.facilitator_seats;
        wallet.storyteller_seats = bundle.storyteller_seats;
    }

    /// All ledger entries, oldest first.
    pub fn ledger_entries(&self) -> Vec<LedgerEntry> {
        self.state.lock().unwrap().ledger.clone()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Wallet, DomainError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .wallets
            .entry(*user_id)
            .or_insert_with(|| Wallet::zeroed(*user_id, now))
            .clone())
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<Wallet>, DomainError> {
        Ok(self.state.lock().unwrap().wallets.get(user_id).cloned())
    }

    async fn apply(
        &self,
        mutation: WalletMutation,
        now: Timestamp,
    ) -> Result<Wallet, DomainError> {
        let mut state = self.state.lock().unwrap();

        // Same guarantee as the partial unique index in PostgreSQL: one
        // purchase credit per (payment, resource), ever.
        for entry in mutation.entries() {
            if entry.transaction_type == TransactionType::Purchase {
                if let Some(payment_id) = &entry.payment_id {
                    let duplicate = state.ledger.iter().any(|existing| {
                        existing.transaction_type == TransactionType::Purchase
                            && existing.resource_type == entry.resource_type
                            && existing.payment_id.as_deref() == Some(payment_id)
                    });
                    if duplicate {
                        return Err(DomainError::new(
                            ErrorCode::DuplicatePaymentCredit,
                            "Payment has already credited this resource",
                        ));
                    }
                }
            }
        }

        let user_id = mutation.user_id();
        let wallet = state
            .wallets
            .get_mut(&user_id)
            .ok_or_else(|| DomainError::new(ErrorCode::WalletNotFound, "Wallet not found"))?;

        wallet.apply_deltas(mutation.deltas(), now)?;
        let snapshot = wallet.clone();
        state.ledger.extend(mutation.entries().iter().cloned());
        Ok(snapshot)
    }
}

#[async_trait]
impl LedgerReader for InMemoryWalletStore {
    async fn entries_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<LedgerEntry>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<_> = state
            .ledger
            .iter()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect();
        entries.reverse();
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn find_by_payment(&self, payment_id: &str) -> Result<Vec<LedgerEntry>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .ledger
            .iter()
            .filter(|e| e.payment_id.as_deref() == Some(payment_id))
            .cloned()
            .collect())
    }

    async fn sum_for(
        &self,
        user_id: &UserId,
        resource: ResourceType,
    ) -> Result<i64, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .ledger
            .iter()
            .filter(|e| &e.user_id == user_id && e.resource_type == resource)
            .map(|e| e.amount)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wallet::TransactionType;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    fn consume_mutation(user: UserId, amount: i64) -> WalletMutation {
        let entry = LedgerEntry::new(
            user,
            TransactionType::Consume,
            ResourceType::ProjectVoucher,
            -amount,
            format!("Consumed {} project_voucher", amount),
            now(),
        )
        .unwrap();
        WalletMutation::new(vec![entry]).unwrap()
    }

    #[tokio::test]
    async fn get_or_create_returns_same_wallet() {
        let store = InMemoryWalletStore::new();
        let user = UserId::new();

        let a = store.get_or_create(&user, now()).await.unwrap();
        let b = store.get_or_create(&user, now().add_hours(1)).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn apply_commits_balance_and_ledger_together() {
        let store = InMemoryWalletStore::new();
        let user = UserId::new();
        store.seed_balances(user, ResourceBundle::of(ResourceType::ProjectVoucher, 2));

        let wallet = store.apply(consume_mutation(user, 1), now()).await.unwrap();
        assert_eq!(wallet.project_vouchers, 1);
        assert_eq!(store.ledger_entries().len(), 1);
    }

    #[tokio::test]
    async fn apply_rejects_overdraft_and_writes_nothing() {
        let store = InMemoryWalletStore::new();
        let user = UserId::new();
        store.seed_balances(user, ResourceBundle::of(ResourceType::ProjectVoucher, 1));

        let err = store.apply(consume_mutation(user, 2), now()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientResources);
        assert!(store.ledger_entries().is_empty());
        assert_eq!(store.find(&user).await.unwrap().unwrap().project_vouchers, 1);
    }

    #[tokio::test]
    async fn apply_requires_existing_wallet() {
        let store = InMemoryWalletStore::new();
        let err = store
            .apply(consume_mutation(UserId::new(), 1), now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::WalletNotFound);
    }

    #[tokio::test]
    async fn ledger_queries_filter_by_user_and_payment() {
        let store = InMemoryWalletStore::new();
        let user = UserId::new();
        store.seed_balances(user, ResourceBundle::empty());

        let entry = LedgerEntry::new(
            user,
            TransactionType::Purchase,
            ResourceType::FacilitatorSeat,
            2,
            "Purchased 2 facilitator_seat",
            now(),
        )
        .unwrap()
        .for_payment("pi_42");
        store
            .apply(WalletMutation::new(vec![entry]).unwrap(), now())
            .await
            .unwrap();

        assert_eq!(store.entries_for_user(&user, 10).await.unwrap().len(), 1);
        assert_eq!(store.find_by_payment("pi_42").await.unwrap().len(), 1);
        assert_eq!(store.find_by_payment("pi_43").await.unwrap().len(), 0);
        assert_eq!(
            store
                .sum_for(&user, ResourceType::FacilitatorSeat)
                .await
                .unwrap(),
            2
        );
    }
}
