use chrono::NaiveDate;

use client::ApiClient;
use client::error::ApiError;
use client::models::Attendance;
use client::params::AttendanceListParams;

use crate::controller::{ListController, PageData, Poll, ViewState};

pub const ATTENDANCE_PAGE_SIZE: u64 = 50;

/// Filter state of the attendance log: user equality, device equality, and
/// an inclusive date range. Constraints are ANDed; absent fields are
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttendanceFilters {
    pub user_id: Option<String>,
    pub device_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Controller behind the Attendance page. Strictly read-only: no mutation
/// flows exist for attendance records.
pub struct AttendanceView {
    list: ListController<AttendanceFilters, Attendance>,
}

impl AttendanceView {
    pub fn new() -> Self {
        Self {
            list: ListController::new(ATTENDANCE_PAGE_SIZE),
        }
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.list.update_filters(|f| f.user_id = user_id);
    }

    pub fn set_device_id(&mut self, device_id: Option<String>) {
        self.list.update_filters(|f| f.device_id = device_id);
    }

    /// Sets both range bounds in one filter edit (one page reset).
    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.list.update_filters(|f| {
            f.start_date = start;
            f.end_date = end;
        });
    }

    pub fn clear_filters(&mut self) {
        self.list.clear_filters();
    }

    pub fn next_page(&mut self) {
        self.list.next_page();
    }

    pub fn prev_page(&mut self) {
        self.list.prev_page();
    }

    pub fn page(&self) -> u64 {
        self.list.page()
    }

    pub fn pagination(&self) -> Option<&client::models::Pagination> {
        self.list.pagination()
    }

    pub fn state(&self) -> ViewState<'_, Attendance> {
        self.list.view()
    }

    pub fn retry(&mut self) {
        self.list.retry();
    }

    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let ticket = match self.list.poll() {
            Poll::Ready => return Ok(()),
            Poll::Fetch(ticket) => ticket,
        };
        let (filters, page) = ticket.key().clone();

        let mut params = AttendanceListParams::new()
            .with_page(page)
            .with_limit(ATTENDANCE_PAGE_SIZE);
        if let Some(user_id) = filters.user_id {
            params = params.with_user_id(user_id);
        }
        if let Some(device_id) = filters.device_id {
            params = params.with_device_id(device_id);
        }
        if let Some(start) = filters.start_date {
            params = params.with_start_date(start);
        }
        if let Some(end) = filters.end_date {
            params = params.with_end_date(end);
        }

        match api.attendance().list(&params).await {
            Ok(response) => {
                self.list.apply(
                    ticket,
                    Ok(PageData {
                        items: response.attendances,
                        pagination: response.pagination,
                    }),
                );
                Ok(())
            }
            Err(e) if e.is_auth_failure() => {
                self.list.abandon(ticket);
                Err(e)
            }
            Err(e) => {
                self.list.apply(ticket, Err(e));
                Ok(())
            }
        }
    }
}

impl Default for AttendanceView {
    fn default() -> Self {
        Self::new()
    }
}

/// Absent confidence renders as a placeholder, never as `0%`.
pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(value) => format!("{value:.1}%"),
        None => "--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_confidence_is_a_placeholder_not_zero() {
        assert_eq!(format_confidence(None), "--");
        assert_eq!(format_confidence(Some(97.25)), "97.2%");
        assert_ne!(format_confidence(None), "0.0%");
    }

    #[test]
    fn date_range_is_one_atomic_filter_edit() {
        let mut view = AttendanceView::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        view.set_date_range(Some(day), Some(day));
        assert_eq!(view.list.filters().start_date, Some(day));
        assert_eq!(view.list.filters().end_date, Some(day));
        assert_eq!(view.page(), 1);
    }
}
