//! Project HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{CreateProjectResponse, ProjectResponse};
pub use handlers::ProjectAppState;
pub use routes::project_routes;
