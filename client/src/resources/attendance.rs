use crate::ApiClient;
use crate::error::ApiError;
use crate::models::AttendanceListResponse;
use crate::params::AttendanceListParams;

pub struct AttendanceApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AttendanceApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /attendance
    ///
    /// Paginated, filterable event log. Supplied constraints are ANDed by
    /// the server; omitted ones are unconstrained. Attendance is read-only
    /// from the console, so listing is the only operation.
    pub async fn list(
        &self,
        params: &AttendanceListParams,
    ) -> Result<AttendanceListResponse, ApiError> {
        let query = params.to_query()?;
        self.client.get("/attendance", &query).await
    }
}
