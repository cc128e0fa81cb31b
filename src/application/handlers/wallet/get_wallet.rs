//! GetWalletHandler - wallet balance query.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::wallet::{ResourceWalletService, Wallet};

/// Handler for reading a user's wallet.
///
/// Get-or-create semantics: the first resource-related request materializes
/// a zeroed wallet.
pub struct GetWalletHandler {
    wallet: Arc<ResourceWalletService>,
}

impl GetWalletHandler {
    pub fn new(wallet: Arc<ResourceWalletService>) -> Self {
        Self { wallet }
    }

    pub async fn handle(&self, user_id: UserId) -> Result<Wallet, DomainError> {
        self.wallet.get_or_create_wallet(&user_id).await
    }
}
