//! Project use-case handlers.

mod create_project;

pub use create_project::{CreateProjectCommand, CreateProjectHandler, CreateProjectResult};
