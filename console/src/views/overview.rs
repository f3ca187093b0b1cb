use chrono::NaiveDate;

use client::ApiClient;
use client::error::ApiError;
use client::params::{AttendanceListParams, UserListParams};

/// Headline counts shown on the dashboard landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overview {
    pub total_users: u64,
    pub total_devices: u64,
    pub todays_attendance: u64,
}

/// Gathers the overview by composing the three listings. User and attendance
/// counts come from pagination totals, so only one record per listing crosses
/// the wire; `today` bounds the attendance count from below.
pub async fn fetch_overview(api: &ApiClient, today: NaiveDate) -> Result<Overview, ApiError> {
    let users = api.users().list(&UserListParams::new().with_limit(1)).await?;
    let devices = api.devices().list().await?;
    let attendance = api
        .attendance()
        .list(
            &AttendanceListParams::new()
                .with_start_date(today)
                .with_limit(1),
        )
        .await?;

    Ok(Overview {
        total_users: users.pagination.total,
        total_devices: devices.len() as u64,
        todays_attendance: attendance.pagination.total,
    })
}
