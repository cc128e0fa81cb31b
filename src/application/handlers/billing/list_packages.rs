//! ListPackagesHandler - active catalog query.

use std::sync::Arc;

use crate::domain::billing::Package;
use crate::domain::foundation::DomainError;
use crate::ports::PackageCatalog;

/// Handler for listing purchasable packages.
pub struct ListPackagesHandler {
    catalog: Arc<dyn PackageCatalog>,
}

impl ListPackagesHandler {
    pub fn new(catalog: Arc<dyn PackageCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self) -> Result<Vec<Package>, DomainError> {
        self.catalog.list_active().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPackageCatalog;
    use crate::domain::foundation::PackageId;
    use crate::domain::wallet::ResourceBundle;

    #[tokio::test]
    async fn lists_only_active_packages() {
        let catalog = Arc::new(InMemoryPackageCatalog::new());
        catalog.insert(Package {
            id: PackageId::new(),
            name: "Starter".to_string(),
            price_cents: 9900,
            currency: "usd".to_string(),
            resources: ResourceBundle::default(),
            is_active: true,
        });
        catalog.insert(Package {
            id: PackageId::new(),
            name: "Legacy".to_string(),
            price_cents: 4900,
            currency: "usd".to_string(),
            resources: ResourceBundle::default(),
            is_active: false,
        });

        let handler = ListPackagesHandler::new(catalog);
        let packages = handler.handle().await.unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "Starter");
    }
}
