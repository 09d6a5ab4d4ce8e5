use uuid::Uuid;

use crate::{
    models::Service,
    store::{Store, StoreError},
};

/// Services a customer can pick from on the order form.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: Vec<Service>,
}

impl ServiceCatalog {
    pub async fn load(store: &dyn Store) -> Result<Self, StoreError> {
        let services = store.list_services(true).await?;
        tracing::debug!(count = services.len(), "service catalog loaded");
        Ok(Self::from_services(services))
    }

    /// Inactive services are dropped.
    pub fn from_services(services: Vec<Service>) -> Self {
        Self {
            services: services.into_iter().filter(|s| s.active).collect(),
        }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn find(&self, id: Uuid) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
