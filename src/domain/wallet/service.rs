//! Resource wallet service - the single authority for balance mutation.
//!
//! Every voucher/seat debit and credit in the system goes through this
//! service. It builds the ledger entries, delegates the atomic
//! balance-plus-ledger commit to the [`WalletStore`], enforces the soft
//! resource ceiling, and retries race-lost operations a bounded number of
//! times before surfacing them.
//!
//! ## Atomicity
//!
//! The store commits balance deltas and ledger entries in one unit of work;
//! a ledger entry must never exist without its balance mutation, and vice
//! versa. This service never holds a wallet lock across an external call;
//! payment lookups happen in the purchase saga before the credit is applied.

use std::sync::Arc;

use crate::domain::foundation::{
    DomainError, ErrorCode, ProjectId, Timestamp, TransactionId, UserId,
};
use crate::ports::{Clock, LedgerReader, WalletStore};

use super::{LedgerEntry, ResourceBundle, ResourceType, TransactionType, Wallet, WalletMutation};

/// Configurable wallet policy.
///
/// The ceiling is an anti-abuse measure, not a domain invariant; it is
/// checked before credits and may lag slightly under concurrent credits.
#[derive(Debug, Clone, Copy)]
pub struct WalletPolicy {
    /// Soft upper bound per resource balance.
    pub max_units_per_resource: i64,

    /// Internal retries for race-lost store operations.
    pub conflict_retry_limit: u32,
}

impl Default for WalletPolicy {
    fn default() -> Self {
        Self {
            max_units_per_resource: 1000,
            conflict_retry_limit: 3,
        }
    }
}

/// Request to debit a single resource.
#[derive(Debug, Clone)]
pub struct ConsumeResourcesRequest {
    pub user_id: UserId,
    pub resource_type: ResourceType,
    pub amount: i64,
    pub project_id: Option<ProjectId>,
    pub description: Option<String>,
}

/// Request to credit a single resource.
#[derive(Debug, Clone)]
pub struct AddResourcesRequest {
    pub user_id: UserId,
    pub resource_type: ResourceType,
    pub amount: i64,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub project_id: Option<ProjectId>,
    pub payment_id: Option<String>,
}

/// Outcome of a committed single-resource operation.
#[derive(Debug, Clone)]
pub struct WalletOperation {
    /// Wallet snapshot after the commit.
    pub wallet: Wallet,

    /// Ledger entry recording the mutation.
    pub transaction_id: TransactionId,
}

/// Outcome of a committed multi-resource credit.
#[derive(Debug, Clone)]
pub struct BundleCredit {
    /// Wallet snapshot after the commit.
    pub wallet: Wallet,

    /// One ledger entry per non-zero resource in the bundle.
    pub transaction_ids: Vec<TransactionId>,
}

/// Per-resource reconciliation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationLine {
    pub resource: ResourceType,
    pub balance: i64,
    pub ledger_sum: i64,
}

impl ReconciliationLine {
    /// True when the ledger sum matches the maintained balance.
    pub fn is_consistent(&self) -> bool {
        self.balance == self.ledger_sum
    }
}

/// Result of auditing one wallet against its ledger.
#[derive(Debug, Clone)]
pub struct ReconciliationReport {
    pub user_id: UserId,
    pub lines: Vec<ReconciliationLine>,
}

impl ReconciliationReport {
    /// True when every resource reconciles.
    pub fn is_consistent(&self) -> bool {
        self.lines.iter().all(ReconciliationLine::is_consistent)
    }

    /// Lines where the ledger and balance diverge.
    pub fn mismatches(&self) -> Vec<&ReconciliationLine> {
        self.lines.iter().filter(|l| !l.is_consistent()).collect()
    }
}

/// The single authority for reading and mutating wallet balances.
pub struct ResourceWalletService {
    store: Arc<dyn WalletStore>,
    ledger: Arc<dyn LedgerReader>,
    clock: Arc<dyn Clock>,
    policy: WalletPolicy,
}

impl ResourceWalletService {
    pub fn new(
        store: Arc<dyn WalletStore>,
        ledger: Arc<dyn LedgerReader>,
        clock: Arc<dyn Clock>,
        policy: WalletPolicy,
    ) -> Self {
        Self {
            store,
            ledger,
            clock,
            policy,
        }
    }

    /// Returns the user's wallet, creating a zeroed one on first use.
    pub async fn get_or_create_wallet(&self, user_id: &UserId) -> Result<Wallet, DomainError> {
        self.store.get_or_create(user_id, self.clock.now()).await
    }

    /// Pure pre-flight read: can the wallet cover `amount` of `resource`?
    ///
    /// Never mutates; an absent wallet covers nothing.
    pub async fn has_sufficient_resources(
        &self,
        user_id: &UserId,
        resource: ResourceType,
        amount: i64,
    ) -> Result<bool, DomainError> {
        let wallet = self.store.find(user_id).await?;
        Ok(wallet
            .map(|w| w.can_cover(resource, amount))
            .unwrap_or(amount <= 0))
    }

    /// Debits a single resource, committing the balance decrement and the
    /// negative ledger entry as one unit of work.
    pub async fn consume_resources(
        &self,
        request: ConsumeResourcesRequest,
    ) -> Result<WalletOperation, DomainError> {
        let amount = positive_amount(request.amount)?;
        let now = self.clock.now();

        let description = request.description.unwrap_or_else(|| {
            format!("Consumed {} {}", amount, request.resource_type)
        });

        let mut entry = LedgerEntry::new(
            request.user_id,
            TransactionType::Consume,
            request.resource_type,
            -amount,
            description,
            now,
        )
        .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;
        if let Some(project_id) = request.project_id {
            entry = entry.for_project(project_id);
        }
        let transaction_id = entry.id;

        let mutation = WalletMutation::new(vec![entry])?;
        let wallet = self.apply_with_retry(mutation, now).await?;

        tracing::info!(
            user_id = %request.user_id,
            resource = %request.resource_type,
            amount,
            remaining = wallet.balance_of(request.resource_type),
            "Consumed wallet resources"
        );

        Ok(WalletOperation {
            wallet,
            transaction_id,
        })
    }

    /// Credits a single resource (purchase, grant, or refund), enforcing the
    /// soft per-resource ceiling.
    pub async fn add_resources(
        &self,
        request: AddResourcesRequest,
    ) -> Result<WalletOperation, DomainError> {
        let amount = positive_amount(request.amount)?;
        if request.transaction_type.is_debit() {
            return Err(DomainError::validation(
                "transaction_type",
                "add_resources only accepts credit transaction types",
            ));
        }
        let now = self.clock.now();

        let wallet = self.store.get_or_create(&request.user_id, now).await?;
        self.check_ceiling(&wallet, request.resource_type, amount)?;

        let description = request.description.unwrap_or_else(|| {
            format!(
                "{} {} {}",
                credit_verb(request.transaction_type),
                amount,
                request.resource_type
            )
        });

        let mut entry = LedgerEntry::new(
            request.user_id,
            request.transaction_type,
            request.resource_type,
            amount,
            description,
            now,
        )
        .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;
        if let Some(project_id) = request.project_id {
            entry = entry.for_project(project_id);
        }
        if let Some(payment_id) = &request.payment_id {
            entry = entry.for_payment(payment_id.clone());
        }
        let transaction_id = entry.id;

        let mutation = WalletMutation::new(vec![entry])?;
        let wallet = self.apply_with_retry(mutation, now).await?;

        tracing::info!(
            user_id = %request.user_id,
            resource = %request.resource_type,
            amount,
            transaction_type = %request.transaction_type,
            balance = wallet.balance_of(request.resource_type),
            "Credited wallet resources"
        );

        Ok(WalletOperation {
            wallet,
            transaction_id,
        })
    }

    /// Compensating credit; identical to [`Self::add_resources`] with
    /// `transaction_type = refund`, distinct only in the audit trail.
    pub async fn refund_resources(
        &self,
        user_id: UserId,
        resource_type: ResourceType,
        amount: i64,
        description: impl Into<String>,
        project_id: Option<ProjectId>,
    ) -> Result<WalletOperation, DomainError> {
        self.add_resources(AddResourcesRequest {
            user_id,
            resource_type,
            amount,
            transaction_type: TransactionType::Refund,
            description: Some(description.into()),
            project_id,
            payment_id: None,
        })
        .await
    }

    /// Credits a whole package bundle atomically: one ledger entry per
    /// non-zero resource, all three balances moved in the same unit of work
    /// or none at all.
    pub async fn credit_bundle(
        &self,
        user_id: UserId,
        bundle: ResourceBundle,
        transaction_type: TransactionType,
        payment_id: Option<String>,
        description: impl Into<String>,
    ) -> Result<BundleCredit, DomainError> {
        if transaction_type.is_debit() {
            return Err(DomainError::validation(
                "transaction_type",
                "credit_bundle only accepts credit transaction types",
            ));
        }
        let parts = bundle.non_zero();
        if parts.is_empty() {
            return Err(DomainError::validation(
                "bundle",
                "Bundle credit needs at least one non-zero resource",
            ));
        }
        if parts.iter().any(|(_, amount)| *amount < 0) {
            return Err(DomainError::validation(
                "bundle",
                "Bundle credit amounts must be positive",
            ));
        }
        let now = self.clock.now();
        let description = description.into();

        let wallet = self.store.get_or_create(&user_id, now).await?;
        for (resource, amount) in &parts {
            self.check_ceiling(&wallet, *resource, *amount)?;
        }

        let mut entries = Vec::with_capacity(parts.len());
        for (resource, amount) in parts {
            let mut entry = LedgerEntry::new(
                user_id,
                transaction_type,
                resource,
                amount,
                description.clone(),
                now,
            )
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;
            if let Some(payment_id) = &payment_id {
                entry = entry.for_payment(payment_id.clone());
            }
            entries.push(entry);
        }
        let transaction_ids = entries.iter().map(|e| e.id).collect();

        let mutation = WalletMutation::new(entries)?;
        let wallet = self.apply_with_retry(mutation, now).await?;

        tracing::info!(
            user_id = %user_id,
            transaction_type = %transaction_type,
            payment_id = payment_id.as_deref().unwrap_or("-"),
            "Credited resource bundle"
        );

        Ok(BundleCredit {
            wallet,
            transaction_ids,
        })
    }

    /// Audits one wallet against its ledger.
    ///
    /// A mismatch is a data-integrity incident: it is reported (and logged at
    /// error level), never auto-repaired.
    pub async fn reconcile_wallet(
        &self,
        user_id: &UserId,
    ) -> Result<ReconciliationReport, DomainError> {
        let wallet = self
            .store
            .find(user_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::WalletNotFound, "Wallet not found"))?;

        let mut lines = Vec::with_capacity(ResourceType::ALL.len());
        for resource in ResourceType::ALL {
            let ledger_sum = self.ledger.sum_for(user_id, resource).await?;
            lines.push(ReconciliationLine {
                resource,
                balance: wallet.balance_of(resource),
                ledger_sum,
            });
        }

        let report = ReconciliationReport {
            user_id: *user_id,
            lines,
        };

        for line in report.mismatches() {
            tracing::error!(
                user_id = %user_id,
                resource = %line.resource,
                balance = line.balance,
                ledger_sum = line.ledger_sum,
                "Wallet balance diverged from ledger"
            );
        }

        Ok(report)
    }

    fn check_ceiling(
        &self,
        wallet: &Wallet,
        resource: ResourceType,
        amount: i64,
    ) -> Result<(), DomainError> {
        let balance = wallet.balance_of(resource);
        if balance + amount > self.policy.max_units_per_resource {
            return Err(DomainError::new(
                ErrorCode::ResourceLimitExceeded,
                format!(
                    "Crediting {} {} would exceed the {}-unit limit",
                    amount, resource, self.policy.max_units_per_resource
                ),
            )
            .with_detail("resource", resource.as_str())
            .with_detail("balance", balance.to_string()));
        }
        Ok(())
    }

    /// Applies a mutation, retrying race-lost attempts a bounded number of
    /// times. A missing wallet row is created and retried once per attempt.
    async fn apply_with_retry(
        &self,
        mutation: WalletMutation,
        now: Timestamp,
    ) -> Result<Wallet, DomainError> {
        let user_id = mutation.user_id();
        let mut attempt = 0;
        loop {
            match self.store.apply(mutation.clone(), now).await {
                Ok(wallet) => return Ok(wallet),
                Err(err) if err.is_retryable() && attempt < self.policy.conflict_retry_limit => {
                    attempt += 1;
                    if err.code == ErrorCode::WalletNotFound {
                        self.store.get_or_create(&user_id, now).await?;
                    }
                    tracing::warn!(
                        user_id = %user_id,
                        attempt,
                        code = %err.code,
                        "Retrying wallet mutation after retryable failure"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn positive_amount(amount: i64) -> Result<i64, DomainError> {
    if amount <= 0 {
        return Err(DomainError::validation(
            "amount",
            format!("Amount must be positive, got {}", amount),
        ));
    }
    Ok(amount)
}

fn credit_verb(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Purchase => "Purchased",
        TransactionType::Refund => "Refunded",
        TransactionType::Grant => "Granted",
        TransactionType::Consume | TransactionType::Expire => "Adjusted",
    }
}
