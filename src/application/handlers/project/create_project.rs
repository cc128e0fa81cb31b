//! CreateProjectHandler - voucher-funded project creation.
//!
//! Project creation spans the wallet and the project store, which may not
//! share one storage transaction in every deployment topology. The
//! documented recovery strategy here is compensation, not rollback: the
//! voucher debit commits first (atomically with its ledger entry), and any
//! later failure credits it back with an explicit refund entry so the audit
//! trail shows both movements.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::project::{Project, ProjectRole, RoleKind, Subscription};
use crate::domain::wallet::{
    ConsumeResourcesRequest, ResourceType, ResourceWalletService, Wallet,
};
use crate::ports::{Clock, ProjectStore};

/// Command to create a project.
#[derive(Debug, Clone)]
pub struct CreateProjectCommand {
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
}

/// Result of successful project creation.
#[derive(Debug, Clone)]
pub struct CreateProjectResult {
    pub project: Project,
    pub subscription: Subscription,

    /// Wallet snapshot after the voucher debit.
    pub wallet: Wallet,
}

/// Handler for project creation.
pub struct CreateProjectHandler {
    projects: Arc<dyn ProjectStore>,
    wallet: Arc<ResourceWalletService>,
    clock: Arc<dyn Clock>,
}

impl CreateProjectHandler {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        wallet: Arc<ResourceWalletService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            projects,
            wallet,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateProjectCommand,
    ) -> Result<CreateProjectResult, DomainError> {
        // Fast-fail before opening any unit of work.
        let sufficient = self
            .wallet
            .has_sufficient_resources(&cmd.user_id, ResourceType::ProjectVoucher, 1)
            .await?;
        if !sufficient {
            let available = self
                .wallet
                .get_or_create_wallet(&cmd.user_id)
                .await?
                .balance_of(ResourceType::ProjectVoucher);
            return Err(DomainError::insufficient_resources(
                ResourceType::ProjectVoucher.as_str(),
                1,
                available,
            ));
        }

        let now = self.clock.now();
        let project = Project::create(cmd.user_id, cmd.name, cmd.description, now)
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;

        // Voucher debit commits first, linked to the project it funds.
        let operation = self
            .wallet
            .consume_resources(ConsumeResourcesRequest {
                user_id: cmd.user_id,
                resource_type: ResourceType::ProjectVoucher,
                amount: 1,
                project_id: Some(project.id),
                description: Some(format!("Voucher consumed for project {}", project.name)),
            })
            .await?;

        let creator_role = ProjectRole::new(cmd.user_id, project.id, RoleKind::Facilitator, now);
        let subscription = Subscription::initial_year(project.id, now);

        if let Err(err) = self
            .projects
            .create_project(&project, &creator_role, &subscription)
            .await
        {
            // Compensate with an audited refund, not a raw rollback.
            let refund = self
                .wallet
                .refund_resources(
                    cmd.user_id,
                    ResourceType::ProjectVoucher,
                    1,
                    "Voucher refunded after failed project creation",
                    Some(project.id),
                )
                .await;
            if let Err(refund_err) = refund {
                tracing::error!(
                    user_id = %cmd.user_id,
                    project_id = %project.id,
                    error = %refund_err,
                    "Voucher refund compensation failed"
                );
            }
            return Err(err);
        }

        tracing::info!(
            user_id = %cmd.user_id,
            project_id = %project.id,
            remaining_vouchers = operation.wallet.project_vouchers,
            "Created project"
        );

        Ok(CreateProjectResult {
            project,
            subscription,
            wallet: operation.wallet,
        })
    }
}
