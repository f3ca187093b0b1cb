use client::ApiClient;
use client::error::ApiError;
use client::models::{Device, NewDevice};

use crate::cache::QueryCache;
use crate::controller::ViewState;
use crate::views::Confirmation;

/// Controller behind the Devices page. The endpoint is unpaginated, so the
/// whole collection is cached under a single key with the same
/// invalidate-on-mutation discipline as the paginated views.
pub struct DevicesView {
    cache: QueryCache<(), Vec<Device>>,
    loading: bool,
    error: Option<String>,
}

impl DevicesView {
    pub fn new() -> Self {
        Self {
            cache: QueryCache::new(),
            loading: false,
            error: None,
        }
    }

    pub fn state(&self) -> ViewState<'_, Device> {
        if let Some(message) = &self.error {
            return ViewState::Error(message);
        }
        if self.loading {
            return ViewState::Loading;
        }
        match self.cache.get(&()) {
            Some(devices) if devices.is_empty() => ViewState::Empty,
            Some(devices) => ViewState::Data(devices),
            None => ViewState::Loading,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn retry(&mut self) {
        self.error = None;
    }

    /// Fetches the collection unless it is already cached. A displayed error
    /// stays on screen until [`DevicesView::retry`] or the next successful
    /// mutation, whichever comes first.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        if self.error.is_some() || self.cache.get(&()).is_some() {
            self.loading = false;
            return Ok(());
        }

        self.loading = true;
        let ticket = self.cache.begin_fetch(());
        match api.devices().list().await {
            Ok(devices) => {
                if self.cache.complete(ticket, devices) {
                    self.loading = false;
                }
                Ok(())
            }
            Err(e) if e.is_auth_failure() => {
                self.loading = false;
                Err(e)
            }
            Err(e) => {
                if self.cache.is_current(&ticket) {
                    self.error = Some(e.to_string());
                    self.loading = false;
                }
                Ok(())
            }
        }
    }

    /// Mutations drop the cached collection and any stale error: the next
    /// refresh always refetches.
    fn invalidate(&mut self) {
        self.cache.invalidate_all();
        self.error = None;
    }

    pub async fn create(&mut self, api: &ApiClient, payload: &NewDevice) -> Result<Device, ApiError> {
        let device = api.devices().create(payload).await?;
        self.invalidate();
        Ok(device)
    }

    /// Rotates the device's firmware secret after explicit confirmation.
    /// Returns the device with its new token, or `None` when cancelled. The
    /// cached collection is dropped so the superseded token value no longer
    /// appears anywhere in view state.
    pub async fn regenerate_token(
        &mut self,
        api: &ApiClient,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<Option<Device>, ApiError> {
        if confirmation == Confirmation::Cancelled {
            return Ok(None);
        }
        let device = api.devices().regenerate_token(id).await?;
        self.invalidate();
        Ok(Some(device))
    }

    /// Removes a device after explicit confirmation. Returns whether a
    /// delete was actually issued.
    pub async fn delete(
        &mut self,
        api: &ApiClient,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<bool, ApiError> {
        if confirmation == Confirmation::Cancelled {
            return Ok(false);
        }
        api.devices().delete(id).await?;
        self.invalidate();
        Ok(true)
    }
}

impl Default for DevicesView {
    fn default() -> Self {
        Self::new()
    }
}
