//! Middleware that restricts routes to users with particular roles.
//!
//! These guards must run after [auth_guard](super::auth_guard) so that the
//! logged in [User] is available as a request extension.

use axum::{
    Extension,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    user::{Role, User},
};

/// Only let admins through.
pub async fn admin_guard(Extension(user): Extension<User>, request: Request, next: Next) -> Response {
    require_role(&user, &[Role::Admin], request, next).await
}

/// Only let managers and admins through.
pub async fn manager_guard(
    Extension(user): Extension<User>,
    request: Request,
    next: Next,
) -> Response {
    require_role(&user, &[Role::Admin, Role::Manager], request, next).await
}

async fn require_role(user: &User, allowed: &[Role], request: Request, next: Next) -> Response {
    if !allowed.contains(&user.role) {
        tracing::info!(
            "Denied {} {} to {} user {}",
            request.method(),
            request.uri().path(),
            user.role,
            user.id
        );
        return Error::InsufficientPermissions.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use axum::{Extension, Router, middleware, routing::get};
    use axum_test::TestServer;
    use time::macros::datetime;

    use crate::{
        auth::{admin_guard, manager_guard},
        user::{Role, User, UserID},
    };

    fn user_with_role(role: Role) -> User {
        User {
            id: UserID::new(1),
            email: "someone@example.com".to_owned(),
            first_name: "Some".to_owned(),
            last_name: "One".to_owned(),
            role,
            department: String::new(),
            is_active: true,
            created_at: datetime!(2025-01-01 00:00:00 UTC),
        }
    }

    fn get_test_server(role: Role) -> TestServer {
        let app = Router::new()
            .route("/admin", get(|| async { "admin" }))
            .route_layer(middleware::from_fn(admin_guard))
            .merge(
                Router::new()
                    .route("/manager", get(|| async { "manager" }))
                    .route_layer(middleware::from_fn(manager_guard)),
            )
            .layer(Extension(user_with_role(role)));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn admin_passes_both_guards() {
        let server = get_test_server(Role::Admin);

        server.get("/admin").await.assert_status_ok();
        server.get("/manager").await.assert_status_ok();
    }

    #[tokio::test]
    async fn manager_only_passes_manager_guard() {
        let server = get_test_server(Role::Manager);

        server.get("/admin").await.assert_status_forbidden();
        server.get("/manager").await.assert_status_ok();
    }

    #[tokio::test]
    async fn staff_passes_neither_guard() {
        let server = get_test_server(Role::Staff);

        server.get("/admin").await.assert_status_forbidden();
        server.get("/manager").await.assert_status_forbidden();
    }
}
