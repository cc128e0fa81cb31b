//! Purchasable resource packages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PackageId;
use crate::domain::wallet::ResourceBundle;

/// A purchasable bundle of vouchers and seats.
///
/// Money is integer cents, never floats. A package is immutable once
/// referenced by a completed purchase; price changes create new package
/// records, mirroring payment-processor immutable-price semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Unique identifier.
    pub id: PackageId,

    /// Display name.
    pub name: String,

    /// Price in integer cents.
    pub price_cents: i64,

    /// ISO currency code, lowercase.
    pub currency: String,

    /// Resources credited on purchase.
    pub resources: ResourceBundle,

    /// Whether the package is currently offered for sale.
    pub is_active: bool,
}

impl Package {
    /// Exact charge validation: integer-cents equality plus currency match.
    ///
    /// Refuses to credit resources for a tampered or stale price.
    pub fn matches_charge(&self, amount_cents: i64, currency: &str) -> bool {
        self.price_cents == amount_cents && self.currency.eq_ignore_ascii_case(currency)
    }
}
