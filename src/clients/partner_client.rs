use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{NewPartner, Partner, PartnerId, PartnerPatch};
use crate::error::StoreError;

/// Client for interacting with the Partner actor.
#[derive(Clone)]
pub struct PartnerClient {
    inner: ResourceClient<Partner>,
}

impl_basic_client!(PartnerClient, Partner, "Partner", partner);

impl PartnerClient {
    #[instrument(skip(self))]
    pub async fn create_partner(&self, partner: NewPartner) -> Result<PartnerId, StoreError> {
        debug!("Sending request");
        self.inner
            .create(partner)
            .await
            .map_err(|e| StoreError::from_framework("Partner", e))
    }

    #[instrument(skip(self))]
    pub async fn update_partner(&self, id: PartnerId, patch: PartnerPatch) -> Result<Partner, StoreError> {
        debug!("Sending request");
        self.inner
            .update(id, patch)
            .await
            .map_err(|e| StoreError::from_framework("Partner", e))
    }
}
