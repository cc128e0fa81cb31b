//! Wallet store port (write side).
//!
//! The store owns the unit of work for wallet mutations: balance deltas and
//! their ledger entries commit together or not at all. Callers never thread
//! transaction handles around; each [`WalletStore::apply`] call is one atomic
//! operation.
//!
//! # Concurrency contract
//!
//! Operations on a single wallet must be linearizable. Two concurrent debits
//! that cannot both be covered must resolve to exactly one success and one
//! `INSUFFICIENT_RESOURCES` rejection. Implementations use row-level locking
//! or a mutex over the store; lost races that are safe to replay surface as
//! the retryable `CONCURRENCY_CONFLICT`.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::wallet::{Wallet, WalletMutation};

/// Port for persisting wallets and their ledger atomically.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Returns the user's wallet, creating a zeroed one if absent.
    ///
    /// Idempotent; concurrent first calls for the same user must converge on
    /// one row.
    async fn get_or_create(&self, user_id: &UserId, now: Timestamp)
        -> Result<Wallet, DomainError>;

    /// Returns the user's wallet without creating one.
    async fn find(&self, user_id: &UserId) -> Result<Option<Wallet>, DomainError>;

    /// Applies balance deltas and appends the matching ledger entries as one
    /// unit of work, returning the updated wallet snapshot.
    ///
    /// # Errors
    ///
    /// - `WALLET_NOT_FOUND` if the wallet row is missing (retryable after
    ///   `get_or_create`)
    /// - `INSUFFICIENT_RESOURCES` if any delta would drive a balance negative;
    ///   nothing is applied
    /// - `CONCURRENCY_CONFLICT` on a lost optimistic/serialization race
    /// - `LEDGER_WRITE_FAILED` if the ledger append fails; the balance change
    ///   is rolled back with it
    async fn apply(
        &self,
        mutation: WalletMutation,
        now: Timestamp,
    ) -> Result<Wallet, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn wallet_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn WalletStore) {}
    }
}
