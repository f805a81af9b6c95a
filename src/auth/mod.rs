//! Session cookies, the shared log-in password and the route guards.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod role;
mod token;

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_current_user, post_log_in};
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{
    PasswordHash, ValidatedPassword, create_shared_password_table, get_shared_password,
    set_shared_password,
};
pub use role::{admin_guard, manager_guard};
