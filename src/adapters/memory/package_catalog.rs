//! In-memory package catalog.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::Package;
use crate::domain::foundation::{DomainError, PackageId};
use crate::ports::PackageCatalog;

/// In-memory [`PackageCatalog`].
#[derive(Default)]
pub struct InMemoryPackageCatalog {
    packages: Mutex<Vec<Package>>,
}

impl InMemoryPackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package to the catalog.
    pub fn insert(&self, package: Package) {
        self.packages.lock().unwrap().push(package);
    }
}

#[async_trait]
impl PackageCatalog for InMemoryPackageCatalog {
    async fn find_by_id(&self, id: &PackageId) -> Result<Option<Package>, DomainError> {
        Ok(self
            .packages
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Package>, DomainError> {
        Ok(self
            .packages
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }
}
