//! Per-project subscription record.
//!
//! Subscription state gates archival mode: an out-of-access project keeps
//! read/export but refuses new-story creation. The gating itself lives
//! outside this core; we expose the boolean and day-count it consumes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProjectId, Timestamp};

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    /// Stable string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SubscriptionStatus::Active),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "canceled" => Some(SubscriptionStatus::Canceled),
            _ => None,
        }
    }
}

/// Subscription period for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub project_id: ProjectId,
    pub status: SubscriptionStatus,
    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,
}

impl Subscription {
    /// The initial one-year period created with the project.
    pub fn initial_year(project_id: ProjectId, now: Timestamp) -> Self {
        Self {
            project_id,
            status: SubscriptionStatus::Active,
            current_period_start: now,
            current_period_end: now.add_days(365),
        }
    }

    /// Whether the project is out of archival mode.
    ///
    /// Past-due keeps access during the grace period; canceled keeps access
    /// until the paid-through date.
    pub fn has_access(&self, now: Timestamp) -> bool {
        match self.status {
            SubscriptionStatus::Active | SubscriptionStatus::PastDue => true,
            SubscriptionStatus::Canceled => !now.is_after(&self.current_period_end),
        }
    }

    /// Whole days until the current period ends; negative when past due.
    pub fn days_remaining(&self, now: Timestamp) -> i64 {
        now.days_until(&self.current_period_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    #[test]
    fn initial_year_runs_365_days() {
        let sub = Subscription::initial_year(ProjectId::new(), now());
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.days_remaining(now()), 365);
    }

    #[test]
    fn canceled_keeps_access_until_period_end() {
        let mut sub = Subscription::initial_year(ProjectId::new(), now());
        sub.status = SubscriptionStatus::Canceled;

        assert!(sub.has_access(now().add_days(100)));
        assert!(!sub.has_access(now().add_days(366)));
    }

    #[test]
    fn past_due_retains_access() {
        let mut sub = Subscription::initial_year(ProjectId::new(), now());
        sub.status = SubscriptionStatus::PastDue;
        assert!(sub.has_access(now().add_days(400)));
    }
}
