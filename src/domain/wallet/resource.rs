//! Resource and transaction vocabulary for the wallet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scarce resource tracked by the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Consumed to create one storytelling project.
    ProjectVoucher,

    /// Consumed when a facilitator invitation is accepted.
    FacilitatorSeat,

    /// Consumed when a storyteller invitation is accepted.
    StorytellerSeat,
}

impl ResourceType {
    /// All resource types, in ledger ordering.
    pub const ALL: [ResourceType; 3] = [
        ResourceType::ProjectVoucher,
        ResourceType::FacilitatorSeat,
        ResourceType::StorytellerSeat,
    ];

    /// Stable string form used in the ledger and over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::ProjectVoucher => "project_voucher",
            ResourceType::FacilitatorSeat => "facilitator_seat",
            ResourceType::StorytellerSeat => "storyteller_seat",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "project_voucher" => Some(ResourceType::ProjectVoucher),
            "facilitator_seat" => Some(ResourceType::FacilitatorSeat),
            "storyteller_seat" => Some(ResourceType::StorytellerSeat),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a wallet balance mutation in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Credit from a completed package purchase.
    Purchase,

    /// Debit from project creation or invitation acceptance.
    Consume,

    /// Compensating credit after a failed downstream step.
    Refund,

    /// Administrative credit outside a purchase.
    Grant,

    /// Debit from resource expiry.
    Expire,
}

impl TransactionType {
    /// Stable string form used in the ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "purchase",
            TransactionType::Consume => "consume",
            TransactionType::Refund => "refund",
            TransactionType::Grant => "grant",
            TransactionType::Expire => "expire",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(TransactionType::Purchase),
            "consume" => Some(TransactionType::Consume),
            "refund" => Some(TransactionType::Refund),
            "grant" => Some(TransactionType::Grant),
            "expire" => Some(TransactionType::Expire),
            _ => None,
        }
    }

    /// Whether entries of this type carry a negative (debit) amount.
    pub fn is_debit(&self) -> bool {
        matches!(self, TransactionType::Consume | TransactionType::Expire)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A quantity of each resource type, used for package contents and
/// multi-resource credits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBundle {
    pub project_vouchers: i64,
    pub facilitator_seats: i64,
    pub storyteller_seats: i64,
}

impl ResourceBundle {
    /// An empty bundle.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bundle holding `amount` of a single resource.
    pub fn of(resource: ResourceType, amount: i64) -> Self {
        let mut bundle = Self::default();
        bundle.set(resource, amount);
        bundle
    }

    /// Quantity of one resource in the bundle.
    pub fn get(&self, resource: ResourceType) -> i64 {
        match resource {
            ResourceType::ProjectVoucher => self.project_vouchers,
            ResourceType::FacilitatorSeat => self.facilitator_seats,
            ResourceType::StorytellerSeat => self.storyteller_seats,
        }
    }

    /// Sets the quantity of one resource.
    pub fn set(&mut self, resource: ResourceType, amount: i64) {
        match resource {
            ResourceType::ProjectVoucher => self.project_vouchers = amount,
            ResourceType::FacilitatorSeat => self.facilitator_seats = amount,
            ResourceType::StorytellerSeat => self.storyteller_seats = amount,
        }
    }

    /// Adds to the quantity of one resource.
    pub fn add(&mut self, resource: ResourceType, amount: i64) {
        self.set(resource, self.get(resource) + amount);
    }

    /// True when every quantity is zero.
    pub fn is_empty(&self) -> bool {
        ResourceType::ALL.iter().all(|r| self.get(*r) == 0)
    }

    /// (resource, quantity) pairs with non-zero quantity, in ledger order.
    pub fn non_zero(&self) -> Vec<(ResourceType, i64)> {
        ResourceType::ALL
            .iter()
            .copied()
            .filter_map(|r| {
                let amount = self.get(r);
                (amount != 0).then_some((r, amount))
            })
            .collect()
    }
}
