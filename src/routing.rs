//! Application router configuration with protected and unprotected route definitions.

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, get, post, put},
};
use tower_http::services::{ServeDir, ServeFile};

use crate::{
    AppState,
    auth::{admin_guard, auth_guard, get_current_user, manager_guard, post_log_in, post_log_out},
    balance::{add_cash_endpoint, get_user_balance_endpoint},
    category::{create_category_endpoint, list_categories_endpoint},
    dashboard::get_dashboard_stats_endpoint,
    endpoints,
    expense::{
        MAX_RECEIPT_BYTES, create_expense_endpoint, get_expense_endpoint, list_expenses_endpoint,
        update_expense_status_endpoint,
    },
    not_found::get_404_not_found,
    report::{expense_report_csv_endpoint, expense_report_endpoint},
    top_up::{
        create_top_up_endpoint, list_top_ups_endpoint, reset_top_ups_endpoint,
        top_up_history_endpoint, transactions_endpoint,
    },
    user::{
        create_user_endpoint, list_users_endpoint, toggle_user_status_endpoint,
        update_user_role_endpoint,
    },
};

/// The largest request body accepted, a receipt plus room for the other form fields.
pub const MAX_REQUEST_BODY_BYTES: usize = MAX_RECEIPT_BYTES + 1024 * 1024;

/// Return a router with all the app's routes.
///
/// If `static_dir` is given, the client's files are served from it and any
/// path outside of the API falls back to its `index.html`.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let staff_routes = Router::new()
        .route(endpoints::CURRENT_USER, get(get_current_user))
        .route(endpoints::DASHBOARD_STATS, get(get_dashboard_stats_endpoint))
        .route(endpoints::CATEGORIES, get(list_categories_endpoint))
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint)
                .post(create_expense_endpoint)
                .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES)),
        )
        .route(endpoints::EXPENSE, get(get_expense_endpoint))
        .route(endpoints::TRANSACTIONS, get(transactions_endpoint));

    let manager_routes = Router::new()
        .route(endpoints::EXPENSE_STATUS, put(update_expense_status_endpoint))
        .route(endpoints::CASH_TOP_UP_HISTORY, get(top_up_history_endpoint))
        .route(endpoints::USER_BALANCE, get(get_user_balance_endpoint))
        .route(endpoints::ADD_CASH, post(add_cash_endpoint))
        .route(endpoints::EXPENSE_REPORT, get(expense_report_endpoint))
        .route(endpoints::EXPENSE_REPORT_CSV, get(expense_report_csv_endpoint))
        .route_layer(middleware::from_fn(manager_guard));

    let admin_routes = Router::new()
        .route(endpoints::CATEGORIES, post(create_category_endpoint))
        .route(
            endpoints::CASH_TOP_UPS,
            get(list_top_ups_endpoint).post(create_top_up_endpoint),
        )
        .route(endpoints::RESET_CASH_TOP_UPS, post(reset_top_ups_endpoint))
        .route(
            endpoints::USERS,
            get(list_users_endpoint).post(create_user_endpoint),
        )
        .route(endpoints::USER_ROLE, put(update_user_role_endpoint))
        .route(endpoints::USER_STATUS, put(toggle_user_status_endpoint))
        .route_layer(middleware::from_fn(admin_guard));

    // The role guards read the user that `auth_guard` adds to the request.
    let protected_routes = staff_routes
        .merge(manager_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let router = unprotected_routes
        .merge(protected_routes)
        .route(
            &format!("{}/{{*path}}", endpoints::API_PREFIX),
            any(get_404_not_found),
        )
        .nest_service(endpoints::UPLOADS, ServeDir::new(&state.upload_dir));

    let router = match static_dir {
        Some(static_dir) => router.fallback_service(
            ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html"))),
        ),
        None => router.fallback(get_404_not_found),
    };

    router.with_state(state)
}
