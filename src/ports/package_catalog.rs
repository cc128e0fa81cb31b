//! Package catalog port (read side).

use async_trait::async_trait;

use crate::domain::billing::Package;
use crate::domain::foundation::{DomainError, PackageId};

/// Port for reading the package catalog.
///
/// Packages referenced by completed purchases are immutable; pricing changes
/// arrive as new records, so lookups by id always reflect what a historical
/// payment was priced against.
#[async_trait]
pub trait PackageCatalog: Send + Sync {
    /// Looks up a package by id, active or not.
    async fn find_by_id(&self, id: &PackageId) -> Result<Option<Package>, DomainError>;

    /// Packages currently offered for sale.
    async fn list_active(&self) -> Result<Vec<Package>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn package_catalog_is_object_safe() {
        fn _accepts_dyn(_catalog: &dyn PackageCatalog) {}
    }
}
