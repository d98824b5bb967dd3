// Read-only controller exports
//
// Things the controller hands out but never accepts back: its certificate
// authority and seed files for appliances that have not joined yet.

use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::models::SeedRequest;
use crate::session::Session;

impl Session {
    /// `GET certificate-authority`: the CA currently signing appliance
    /// and client certificates.
    pub async fn certificate_authority(&self) -> Result<Value, Error> {
        self.get("certificate-authority", &[]).await
    }

    /// `POST appliances/{appliance}/export`: a seed file for an inactive
    /// appliance. `appliance` must already be a valid path segment.
    ///
    /// The request may carry an SSH password, so its body is never traced.
    pub async fn export_seed(
        &self,
        appliance: &str,
        request: &SeedRequest<'_>,
    ) -> Result<Value, Error> {
        debug!(appliance, "exporting appliance seed");
        self.post_secret(&format!("appliances/{appliance}/export"), request)
            .await
    }
}
