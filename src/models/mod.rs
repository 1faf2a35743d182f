mod access_token;
mod leave;
mod user;

pub use access_token::AccessToken;
pub use leave::{FormattedDates, Leave, LeaveStatus, LeaveType, LeaveView};
pub use user::{EmployeeSummary, Role, User};
