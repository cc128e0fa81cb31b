//! Invitation domain - time-boxed, single-use role offers.

mod aggregate;
mod status;
mod token;

pub use aggregate::{ContactInfo, Invitation, INVITATION_TTL_HOURS};
pub use status::InvitationStatus;
pub use token::InvitationToken;
