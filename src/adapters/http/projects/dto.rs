//! HTTP DTOs for project endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::project::CreateProjectResult;
use crate::domain::project::Project;

use super::super::wallet::WalletResponse;

/// Request to create a project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Project details for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.to_string(),
            owner_id: project.owner_id.to_string(),
            name: project.name,
            description: project.description,
            created_at: project.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Response for a created project.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectResponse {
    pub project: ProjectResponse,
    /// Wallet snapshot after the voucher debit.
    pub resource_usage: WalletResponse,
    /// End of the initial subscription period (ISO 8601).
    pub subscription_ends_at: String,
}

impl From<CreateProjectResult> for CreateProjectResponse {
    fn from(result: CreateProjectResult) -> Self {
        Self {
            project: ProjectResponse::from(result.project),
            resource_usage: WalletResponse::from(result.wallet),
            subscription_ends_at: result
                .subscription
                .current_period_end
                .as_datetime()
                .to_rfc3339(),
        }
    }
}
