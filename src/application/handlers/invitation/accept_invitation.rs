//! AcceptInvitationHandler - Command handler for invitation acceptance.
//!
//! The one place a seat leaves a wallet. The sequence of defensive expiry
//! check, race-safe role re-validation, seat consumption from the project
//! owner's wallet, role assignment, and compare-and-set status update must
//! leave no partial state behind: a lost seat race keeps the invitation
//! pending with no role assigned, and failures after the debit compensate it
//! with an audited refund.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId, Timestamp, UserId};
use crate::domain::invitation::{Invitation, InvitationStatus, InvitationToken};
use crate::domain::project::{Project, ProjectRole, RoleAssignmentValidator, RoleKind};
use crate::domain::wallet::{ConsumeResourcesRequest, ResourceWalletService};
use crate::ports::{Clock, InvitationRepository, NewUser, ProjectStore, UserDirectory};

/// Command to accept an invitation by token.
///
/// Either an authenticated user id or new-account details must be present.
#[derive(Debug, Clone)]
pub struct AcceptInvitationCommand {
    pub token: String,
    pub authenticated_user_id: Option<UserId>,
    pub new_user: Option<NewUser>,
}

/// Result of a successful acceptance.
#[derive(Debug, Clone)]
pub struct AcceptInvitationResult {
    pub project: Project,
    pub user_id: UserId,
    pub role: RoleKind,
}

/// Handler for invitation acceptance.
pub struct AcceptInvitationHandler {
    invitations: Arc<dyn InvitationRepository>,
    projects: Arc<dyn ProjectStore>,
    users: Arc<dyn UserDirectory>,
    wallet: Arc<ResourceWalletService>,
    validator: Arc<RoleAssignmentValidator>,
    clock: Arc<dyn Clock>,
}

impl AcceptInvitationHandler {
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        projects: Arc<dyn ProjectStore>,
        users: Arc<dyn UserDirectory>,
        wallet: Arc<ResourceWalletService>,
        validator: Arc<RoleAssignmentValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            invitations,
            projects,
            users,
            wallet,
            validator,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: AcceptInvitationCommand,
    ) -> Result<AcceptInvitationResult, DomainError> {
        let token = InvitationToken::parse(&cmd.token)
            .map_err(|_| invalid_invitation("Unknown or malformed invitation token"))?;

        let mut invitation = self
            .invitations
            .find_by_token(&token)
            .await?
            .ok_or_else(|| invalid_invitation("Unknown or malformed invitation token"))?;

        // Deadline check against the injected clock, valid even before the
        // expiry sweep has run.
        let now = self.clock.now();
        if !invitation.is_acceptable(now) {
            return Err(invalid_invitation("Invitation is no longer acceptable"));
        }

        let project = self
            .projects
            .find_project(&invitation.project_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::ProjectNotFound, "Project not found"))?;

        let acceptor = self.resolve_acceptor(&cmd).await?;

        // Seats may have been exhausted or roles assigned since creation;
        // the gap can be arbitrarily long, so re-validate.
        self.validator
            .validate(Some(&acceptor), &invitation.project_id, invitation.role)
            .await?;

        // The seat comes out of the project owner's wallet, not the
        // acceptor's. A lost race surfaces INSUFFICIENT_RESOURCES here and
        // the invitation stays pending, untouched.
        let seat = invitation.role.seat_resource();
        self.wallet
            .consume_resources(ConsumeResourcesRequest {
                user_id: project.owner_id,
                resource_type: seat,
                amount: 1,
                project_id: Some(project.id),
                description: Some(format!(
                    "Seat consumed for accepted {} invitation",
                    invitation.role
                )),
            })
            .await?;

        let role = ProjectRole::new(acceptor, project.id, invitation.role, now);
        if let Err(err) = self.projects.assign_role(&role).await {
            self.refund_seat(&project, invitation.role, "failed role assignment")
                .await;
            return Err(err);
        }

        invitation.accept(now)?;
        if let Err(err) = self
            .invitations
            .transition(&invitation, InvitationStatus::Pending)
            .await
        {
            // Someone else accepted between our read and the transition;
            // undo the role and the seat, then report the invitation gone.
            if let Err(remove_err) = self
                .projects
                .remove_role(&acceptor, &project.id, invitation.role)
                .await
            {
                tracing::error!(
                    invitation_id = %invitation.id,
                    error = %remove_err,
                    "Failed to undo role assignment after lost acceptance race"
                );
            }
            self.refund_seat(&project, invitation.role, "lost acceptance race")
                .await;

            return Err(if err.code == ErrorCode::ConcurrencyConflict {
                invalid_invitation("Invitation was already used")
            } else {
                err
            });
        }

        tracing::info!(
            invitation_id = %invitation.id,
            project_id = %project.id,
            user_id = %acceptor,
            role = %invitation.role,
            "Accepted invitation"
        );

        Ok(AcceptInvitationResult {
            project,
            user_id: acceptor,
            role: invitation.role,
        })
    }

    async fn resolve_acceptor(
        &self,
        cmd: &AcceptInvitationCommand,
    ) -> Result<UserId, DomainError> {
        if let Some(user_id) = cmd.authenticated_user_id {
            return self
                .users
                .find_by_id(&user_id)
                .await?
                .map(|account| account.id)
                .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }

        let new_user = cmd.new_user.clone().ok_or_else(|| {
            DomainError::validation(
                "new_user",
                "Accepting without a signed-in account requires name and email or phone",
            )
        })?;

        if new_user.name.trim().is_empty() {
            return Err(DomainError::validation("name", "Name is required"));
        }
        if new_user.email.is_none() && new_user.phone.is_none() {
            return Err(DomainError::validation(
                "contact",
                "Email or phone is required",
            ));
        }

        if let Some(email) = &new_user.email {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(user_exists());
            }
        }
        if let Some(phone) = &new_user.phone {
            if self.users.find_by_phone(phone).await?.is_some() {
                return Err(user_exists());
            }
        }

        let account = self.users.create_user(new_user).await?;
        Ok(account.id)
    }

    /// Compensating refund for a seat consumed by a step that then failed.
    /// Compensation failure is an integrity incident: logged, not retried
    /// here, surfaced by reconciliation.
    async fn refund_seat(&self, project: &Project, role: RoleKind, reason: &str) {
        let result = self
            .wallet
            .refund_resources(
                project.owner_id,
                role.seat_resource(),
                1,
                format!("Seat refunded after {}", reason),
                Some(project.id),
            )
            .await;

        if let Err(err) = result {
            tracing::error!(
                project_id = %project.id,
                owner_id = %project.owner_id,
                error = %err,
                "Seat refund compensation failed"
            );
        }
    }
}

fn invalid_invitation(message: &str) -> DomainError {
    DomainError::new(ErrorCode::InvalidInvitation, message)
}

fn user_exists() -> DomainError {
    DomainError::new(
        ErrorCode::UserExists,
        "An account with this email or phone already exists; sign in instead",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryInvitationRepository, InMemoryProjectStore, InMemoryUserDirectory,
        InMemoryWalletStore,
    };
    use crate::domain::invitation::ContactInfo;
    use crate::domain::project::Subscription;
    use crate::domain::wallet::{ResourceBundle, ResourceType, TransactionType, WalletPolicy};
    use crate::ports::{FixedClock, UserAccount, WalletStore};

    struct Fixture {
        handler: AcceptInvitationHandler,
        invitations: Arc<InMemoryInvitationRepository>,
        projects: Arc<InMemoryProjectStore>,
        users: Arc<InMemoryUserDirectory>,
        wallet_store: Arc<InMemoryWalletStore>,
        clock: Arc<FixedClock>,
        owner: UserId,
        project_id: ProjectId,
    }

    fn start() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    async fn fixture(seats: ResourceBundle) -> Fixture {
        let wallet_store = Arc::new(InMemoryWalletStore::new());
        let projects = Arc::new(InMemoryProjectStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let invitations = Arc::new(InMemoryInvitationRepository::new());
        let clock = Arc::new(FixedClock::at(start()));

        let owner = UserId::new();
        wallet_store.seed_balances(owner, seats);

        let project = Project::create(owner, "Family stories", None, start()).unwrap();
        let project_id = project.id;
        projects
            .create_project(
                &project,
                &ProjectRole::new(owner, project_id, RoleKind::Facilitator, start()),
                &Subscription::initial_year(project_id, start()),
            )
            .await
            .unwrap();

        let wallet = Arc::new(ResourceWalletService::new(
            wallet_store.clone(),
            wallet_store.clone(),
            clock.clone(),
            WalletPolicy::default(),
        ));
        let validator = Arc::new(RoleAssignmentValidator::new(projects.clone()));

        Fixture {
            handler: AcceptInvitationHandler::new(
                invitations.clone(),
                projects.clone(),
                users.clone(),
                wallet,
                validator,
                clock.clone(),
            ),
            invitations,
            projects,
            users,
            wallet_store,
            clock,
            owner,
            project_id,
        }
    }

    async fn pending_invitation(f: &Fixture, role: RoleKind) -> Invitation {
        let invitation = Invitation::create(
            f.project_id,
            role,
            f.owner,
            ContactInfo::default(),
            f.clock.now(),
        );
        f.invitations.save(&invitation).await.unwrap();
        invitation
    }

    fn jane() -> NewUser {
        NewUser {
            name: "Jane".to_string(),
            email: Some("jane@x.com".to_string()),
            phone: None,
        }
    }

    fn accept_as_new_user(invitation: &Invitation, new_user: NewUser) -> AcceptInvitationCommand {
        AcceptInvitationCommand {
            token: invitation.token.to_string(),
            authenticated_user_id: None,
            new_user: Some(new_user),
        }
    }

    #[tokio::test]
    async fn new_user_acceptance_consumes_one_owner_seat() {
        let f = fixture(ResourceBundle {
            project_vouchers: 2,
            facilitator_seats: 3,
            storyteller_seats: 2,
        })
        .await;
        let invitation = pending_invitation(&f, RoleKind::Facilitator).await;

        let result = f
            .handler
            .handle(accept_as_new_user(&invitation, jane()))
            .await
            .unwrap();

        // Wallet went 3 -> 2 on the owner's facilitator seats.
        let wallet = f.wallet_store.find(&f.owner).await.unwrap().unwrap();
        assert_eq!(wallet.facilitator_seats, 2);
        assert_eq!(wallet.project_vouchers, 2);
        assert_eq!(wallet.storyteller_seats, 2);

        // Jane got an account and the facilitator role.
        let jane_account = f.users.find_by_email("jane@x.com").await.unwrap().unwrap();
        assert_eq!(result.user_id, jane_account.id);
        assert!(f
            .projects
            .has_active_role(&jane_account.id, &f.project_id, RoleKind::Facilitator)
            .await
            .unwrap());

        // Invitation is terminal with used_at set.
        let stored = f.invitations.find_by_id(&invitation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvitationStatus::Accepted);
        assert!(stored.used_at.is_some());

        // The ledger carries exactly one consume entry linked to the project.
        let entries = f.wallet_store.ledger_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].transaction_type, TransactionType::Consume);
        assert_eq!(entries[0].amount, -1);
        assert_eq!(entries[0].project_id, Some(f.project_id));
    }

    #[tokio::test]
    async fn expired_token_fails_with_zero_wallet_side_effects() {
        let f = fixture(ResourceBundle::of(ResourceType::FacilitatorSeat, 3)).await;
        let invitation = pending_invitation(&f, RoleKind::Facilitator).await;

        // No sweep has run; only the clock moved past the deadline.
        f.clock.advance_hours(73);

        let err = f
            .handler
            .handle(accept_as_new_user(&invitation, jane()))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidInvitation);
        assert!(f.wallet_store.ledger_entries().is_empty());
        assert_eq!(
            f.wallet_store.find(&f.owner).await.unwrap().unwrap().facilitator_seats,
            3
        );
        let stored = f.invitations.find_by_id(&invitation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvitationStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_token_fails_without_leaking_existence() {
        let f = fixture(ResourceBundle::of(ResourceType::FacilitatorSeat, 1)).await;

        let err = f
            .handler
            .handle(AcceptInvitationCommand {
                token: "zz".repeat(32),
                authenticated_user_id: None,
                new_user: Some(jane()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInvitation);
    }

    #[tokio::test]
    async fn exhausted_seats_leave_invitation_pending() {
        let f = fixture(ResourceBundle::of(ResourceType::FacilitatorSeat, 0)).await;
        let invitation = pending_invitation(&f, RoleKind::Facilitator).await;

        let err = f
            .handler
            .handle(accept_as_new_user(&invitation, jane()))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientResources);
        let stored = f.invitations.find_by_id(&invitation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvitationStatus::Pending);
        assert!(f.projects.roles().iter().all(|r| r.user_id == f.owner));
    }

    #[tokio::test]
    async fn existing_email_directs_to_sign_in() {
        let f = fixture(ResourceBundle::of(ResourceType::FacilitatorSeat, 3)).await;
        let invitation = pending_invitation(&f, RoleKind::Facilitator).await;
        f.users.insert(UserAccount {
            id: UserId::new(),
            name: "Jane".to_string(),
            email: Some("jane@x.com".to_string()),
            phone: None,
        });

        let err = f
            .handler
            .handle(accept_as_new_user(&invitation, jane()))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::UserExists);
        assert!(f.wallet_store.ledger_entries().is_empty());
    }

    #[tokio::test]
    async fn new_user_requires_name_and_contact() {
        let f = fixture(ResourceBundle::of(ResourceType::FacilitatorSeat, 3)).await;
        let invitation = pending_invitation(&f, RoleKind::Facilitator).await;

        let err = f
            .handler
            .handle(accept_as_new_user(
                &invitation,
                NewUser {
                    name: "Jane".to_string(),
                    email: None,
                    phone: None,
                },
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn second_acceptance_of_same_invitation_fails() {
        let f = fixture(ResourceBundle::of(ResourceType::FacilitatorSeat, 3)).await;
        let invitation = pending_invitation(&f, RoleKind::Facilitator).await;

        f.handler
            .handle(accept_as_new_user(&invitation, jane()))
            .await
            .unwrap();

        let err = f
            .handler
            .handle(accept_as_new_user(
                &invitation,
                NewUser {
                    name: "John".to_string(),
                    email: Some("john@x.com".to_string()),
                    phone: None,
                },
            ))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidInvitation);
        // Exactly one seat left the wallet across both attempts.
        assert_eq!(
            f.wallet_store.find(&f.owner).await.unwrap().unwrap().facilitator_seats,
            2
        );
    }

    #[tokio::test]
    async fn storyteller_acceptance_re_checks_global_uniqueness() {
        let f = fixture(ResourceBundle::of(ResourceType::StorytellerSeat, 2)).await;
        let invitation = pending_invitation(&f, RoleKind::Storyteller).await;

        // The invited person became a storyteller elsewhere after the
        // invitation was created.
        let busy = UserAccount {
            id: UserId::new(),
            name: "Nana".to_string(),
            email: Some("nana@x.com".to_string()),
            phone: None,
        };
        f.users.insert(busy.clone());
        f.projects
            .assign_role(&ProjectRole::new(
                busy.id,
                ProjectId::new(),
                RoleKind::Storyteller,
                start(),
            ))
            .await
            .unwrap();

        let err = f
            .handler
            .handle(AcceptInvitationCommand {
                token: invitation.token.to_string(),
                authenticated_user_id: Some(busy.id),
                new_user: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::StorytellerElsewhere);
        assert!(f.wallet_store.ledger_entries().is_empty());
    }

    #[tokio::test]
    async fn storyteller_landing_after_creation_rejects_before_any_debit() {
        let f = fixture(ResourceBundle::of(ResourceType::StorytellerSeat, 1)).await;
        let invitation = pending_invitation(&f, RoleKind::Storyteller).await;

        // A storyteller was assigned directly after the invitation went out.
        f.projects
            .assign_role(&ProjectRole::new(
                UserId::new(),
                f.project_id,
                RoleKind::Storyteller,
                start(),
            ))
            .await
            .unwrap();

        let err = f
            .handler
            .handle(accept_as_new_user(&invitation, jane()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProjectHasStoryteller);

        assert_eq!(
            f.wallet_store.find(&f.owner).await.unwrap().unwrap().storyteller_seats,
            1
        );
        assert!(f.wallet_store.ledger_entries().is_empty());

        let stored = f.invitations.find_by_id(&invitation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvitationStatus::Pending);
    }

    /// Project store wrapper that fails `assign_role` after validation has
    /// already passed, forcing the compensation path.
    struct FailingAssignStore {
        inner: Arc<InMemoryProjectStore>,
    }

    #[async_trait::async_trait]
    impl ProjectStore for FailingAssignStore {
        async fn create_project(
            &self,
            project: &Project,
            creator_role: &ProjectRole,
            subscription: &Subscription,
        ) -> Result<(), DomainError> {
            self.inner.create_project(project, creator_role, subscription).await
        }

        async fn find_project(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
            self.inner.find_project(id).await
        }

        async fn assign_role(&self, _role: &ProjectRole) -> Result<(), DomainError> {
            Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated role assignment failure",
            ))
        }

        async fn remove_role(
            &self,
            user_id: &UserId,
            project_id: &ProjectId,
            role: RoleKind,
        ) -> Result<(), DomainError> {
            self.inner.remove_role(user_id, project_id, role).await
        }

        async fn has_active_role(
            &self,
            user_id: &UserId,
            project_id: &ProjectId,
            role: RoleKind,
        ) -> Result<bool, DomainError> {
            self.inner.has_active_role(user_id, project_id, role).await
        }

        async fn find_active_storyteller(
            &self,
            project_id: &ProjectId,
        ) -> Result<Option<UserId>, DomainError> {
            self.inner.find_active_storyteller(project_id).await
        }

        async fn storyteller_project_of(
            &self,
            user_id: &UserId,
        ) -> Result<Option<ProjectId>, DomainError> {
            self.inner.storyteller_project_of(user_id).await
        }

        async fn find_subscription(
            &self,
            project_id: &ProjectId,
        ) -> Result<Option<Subscription>, DomainError> {
            self.inner.find_subscription(project_id).await
        }
    }

    #[tokio::test]
    async fn role_assignment_failure_refunds_the_consumed_seat() {
        let f = fixture(ResourceBundle::of(ResourceType::FacilitatorSeat, 3)).await;
        let invitation = pending_invitation(&f, RoleKind::Facilitator).await;

        // Rebuild the handler around a store whose assign_role fails after
        // the seat has already been consumed.
        let failing = Arc::new(FailingAssignStore {
            inner: f.projects.clone(),
        });
        let clock = f.clock.clone();
        let wallet = Arc::new(ResourceWalletService::new(
            f.wallet_store.clone(),
            f.wallet_store.clone(),
            clock.clone(),
            WalletPolicy::default(),
        ));
        let handler = AcceptInvitationHandler::new(
            f.invitations.clone(),
            failing.clone(),
            f.users.clone(),
            wallet,
            Arc::new(RoleAssignmentValidator::new(failing)),
            clock,
        );

        let err = handler
            .handle(accept_as_new_user(&invitation, jane()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        // Net balance restored and both movements audited.
        let wallet = f.wallet_store.find(&f.owner).await.unwrap().unwrap();
        assert_eq!(wallet.facilitator_seats, 3);
        let entries = f.wallet_store.ledger_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].transaction_type, TransactionType::Consume);
        assert_eq!(entries[1].transaction_type, TransactionType::Refund);

        // Invitation never left pending.
        let stored = f.invitations.find_by_id(&invitation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvitationStatus::Pending);
    }
}
