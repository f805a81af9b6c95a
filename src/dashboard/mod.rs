//! Dashboard module
//!
//! Provides the summary figures shown on the client's dashboard: cash received and spent,
//! pending claims, and breakdowns by category and by staff member.

mod handlers;
mod stats;

pub use handlers::get_dashboard_stats_endpoint;
pub use stats::{DashboardStats, DateRange, get_dashboard_stats, get_user_breakdown};
