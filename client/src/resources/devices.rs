use crate::ApiClient;
use crate::error::ApiError;
use crate::models::{Device, NewDevice};

pub struct DevicesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DevicesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /devices — the full (unpaginated) device collection.
    pub async fn list(&self) -> Result<Vec<Device>, ApiError> {
        self.client.get("/devices", &[]).await
    }

    /// GET /devices/{id}
    pub async fn get(&self, id: &str) -> Result<Device, ApiError> {
        self.client.get(&format!("/devices/{id}"), &[]).await
    }

    /// POST /devices
    ///
    /// Registers a scanner. The server assigns the firmware secret token.
    pub async fn create(&self, payload: &NewDevice) -> Result<Device, ApiError> {
        self.client.post("/devices", payload).await
    }

    /// POST /devices/{id}/regenerate-token
    ///
    /// Rotates the device's firmware secret. The previous token stops being
    /// accepted for attendance submissions; firmware configured with it must
    /// be re-provisioned. Deliberate security operation.
    pub async fn regenerate_token(&self, id: &str) -> Result<Device, ApiError> {
        self.client
            .post_empty(&format!("/devices/{id}/regenerate-token"))
            .await
    }

    /// DELETE /devices/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/devices/{id}")).await
    }
}
