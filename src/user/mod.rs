//! Users, their roles, and the admin endpoints for managing them.

mod core;
mod create_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use self::core::{
    NewUser, Role, USER_COLUMNS, User, UserID, UserWithStats, create_user, create_user_table,
    display_name, get_user_by_email, get_user_by_id, get_users_with_stats,
    map_user_row, map_user_row_at, toggle_user_status, update_user_role,
};
pub use create_endpoint::create_user_endpoint;
pub use edit_endpoint::{toggle_user_status_endpoint, update_user_role_endpoint};
pub use list_endpoint::list_users_endpoint;
