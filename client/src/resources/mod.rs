mod attendance;
mod auth;
mod devices;
mod users;

pub use attendance::AttendanceApi;
pub use auth::AuthApi;
pub use devices::DevicesApi;
pub use users::UsersApi;
