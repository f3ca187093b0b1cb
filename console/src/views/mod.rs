mod attendance;
mod devices;
mod overview;
mod users;

pub use attendance::{ATTENDANCE_PAGE_SIZE, AttendanceFilters, AttendanceView, format_confidence};
pub use devices::DevicesView;
pub use overview::{Overview, fetch_overview};
pub use users::{USERS_PAGE_SIZE, UserFilters, UsersView};

/// Operator answer to a destructive-action prompt. Delete and
/// regenerate-token flows refuse to issue a request without `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}
