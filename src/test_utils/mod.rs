#![allow(missing_docs)]

use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState,
    auth::{COOKIE_TOKEN, PasswordHash, set_shared_password},
    build_router, endpoints,
    user::{NewUser, Role, User, create_user},
};

/// The shared password every test app is set up with.
pub const TEST_PASSWORD: &str = "petty cash tin under the stairs";

static NEXT_UPLOAD_DIR: AtomicUsize = AtomicUsize::new(0);

/// A router backed by an in-memory database and a throwaway upload directory.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(connection, "42", "Etc/UTC", &temp_upload_dir())
            .expect("Could not create app state.");

        let password_hash = PasswordHash::from_raw_password(TEST_PASSWORD, 4)
            .expect("Could not hash test password.");
        set_shared_password(
            &password_hash,
            &state.db_connection.lock().expect("Could not lock database."),
        )
        .expect("Could not set shared password.");

        let server = TestServer::try_new(build_router(state.clone(), None))
            .expect("Could not create test server.");

        Self { server, state }
    }

    pub fn add_user(&self, email: &str, role: Role) -> User {
        let connection = self
            .state
            .db_connection
            .lock()
            .expect("Could not lock database.");

        create_user(new_user(email, role), &connection).expect("Could not create user")
    }

    /// Log in as `email` with the shared password and return the session cookie.
    pub async fn log_in(&self, email: &str) -> Cookie<'static> {
        self.server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .await
            .cookie(COOKIE_TOKEN)
    }
}

pub fn new_user(email: &str, role: Role) -> NewUser {
    let first_name = email.split('@').next().unwrap_or_default().trim();

    NewUser {
        email: email.to_owned(),
        first_name: capitalise(first_name),
        last_name: "Tester".to_owned(),
        role,
        department: String::new(),
    }
}

fn capitalise(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn temp_upload_dir() -> PathBuf {
    let id = NEXT_UPLOAD_DIR.fetch_add(1, Ordering::Relaxed);

    std::env::temp_dir().join(format!("petty-cash-test-{}-{id}", std::process::id()))
}
