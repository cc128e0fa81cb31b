//! Invitation HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{AcceptInvitationResponse, InvitationResponse};
pub use handlers::InvitationAppState;
pub use routes::invitation_routes;
