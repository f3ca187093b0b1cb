use chrono::NaiveDate;
use validator::Validate;

use crate::error::ApiError;

/// Query parameters for `GET /users`. Absent fields impose no constraint;
/// supplied fields are combined as an AND by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Validate)]
pub struct UserListParams {
    pub search: Option<String>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u64>,
}

impl UserListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn to_query(&self) -> Result<Vec<(&'static str, String)>, ApiError> {
        self.validate()
            .map_err(|e| ApiError::InvalidParams(common::format_validation_errors(&e)))?;

        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        Ok(query)
    }
}

/// Query parameters for `GET /attendance`. Dates are sent as `YYYY-MM-DD`
/// and bound the record's `createdAt` inclusively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Validate)]
pub struct AttendanceListParams {
    pub user_id: Option<String>,
    pub device_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u64>,
}

impl AttendanceListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn to_query(&self) -> Result<Vec<(&'static str, String)>, ApiError> {
        self.validate()
            .map_err(|e| ApiError::InvalidParams(common::format_validation_errors(&e)))?;

        let mut query = Vec::new();
        if let Some(user_id) = &self.user_id {
            query.push(("userId", user_id.clone()));
        }
        if let Some(device_id) = &self.device_id {
            query.push(("deviceId", device_id.clone()));
        }
        if let Some(start) = self.start_date {
            query.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            query.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        Ok(query)
    }
}
