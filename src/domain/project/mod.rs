//! Project domain - projects, roles, subscriptions, role validation.

mod aggregate;
mod role;
mod role_validator;
mod subscription;

pub use aggregate::Project;
pub use role::{ProjectRole, RoleKind, RoleStatus};
pub use role_validator::RoleAssignmentValidator;
pub use subscription::{Subscription, SubscriptionStatus};
