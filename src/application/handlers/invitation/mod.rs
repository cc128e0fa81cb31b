//! Invitation use-case handlers.

mod accept_invitation;
mod cleanup_expired_invitations;
mod create_invitation;
mod invalidate_project_invitations;
mod resend_invitation;

pub use accept_invitation::{
    AcceptInvitationCommand, AcceptInvitationHandler, AcceptInvitationResult,
};
pub use cleanup_expired_invitations::CleanupExpiredInvitationsHandler;
pub use create_invitation::{CreateInvitationCommand, CreateInvitationHandler};
pub use invalidate_project_invitations::{
    InvalidateProjectInvitationsCommand, InvalidateProjectInvitationsHandler,
};
pub use resend_invitation::{ResendInvitationCommand, ResendInvitationHandler};
