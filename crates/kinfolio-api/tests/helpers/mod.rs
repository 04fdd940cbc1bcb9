//! Test helpers: build AppState and router over the in-memory database.
//!
//! Run from workspace root: `cargo test -p kinfolio-api`.

#![allow(dead_code)]

use axum_test::{TestResponse, TestServer};
use chrono_tz::Tz;
use kinfolio_api::constants;
use kinfolio_api::setup::routes;
use kinfolio_api::state::{AppState, DbState};
use kinfolio_core::config::LogFormat;
use kinfolio_core::models::{MemberRole, Subject};
use kinfolio_core::Config;
use kinfolio_db::test_helpers::InMemoryDatabase;
use kinfolio_db::SubjectRepositoryTrait;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Page size used by the timeline tests.
pub const TEST_PAGE_SIZE: i64 = 3;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus a handle on the shared tables.
pub struct TestApp {
    pub server: TestServer,
    pub db: InMemoryDatabase,
    pub state: Arc<AppState>,
}

/// A signed-in member and their bearer token.
pub struct TestMember {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub token: String,
}

impl TestMember {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Sign in a new user; the profile is created on first request.
    pub async fn member(&self, name: &str, role: MemberRole) -> TestMember {
        let user_id = Uuid::new_v4();
        let token = self
            .state
            .jwt
            .issue_token(user_id, name, role)
            .expect("Failed to issue token");
        let response = self
            .server
            .get(&api_path("/profiles/me"))
            .add_header("Authorization", format!("Bearer {}", token))
            .await;
        assert_eq!(response.status_code(), 200);
        let profile: Value = response.json();
        let profile_id = profile["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("Profile id missing");

        TestMember {
            user_id,
            profile_id,
            token,
        }
    }

    pub async fn teacher(&self, name: &str) -> TestMember {
        self.member(name, MemberRole::Teacher).await
    }

    pub async fn student(&self, name: &str) -> TestMember {
        self.member(name, MemberRole::Student).await
    }

    /// Create a family owned by `founder` and return its invite code.
    pub async fn found_family(&self, founder: &TestMember, name: &str) -> String {
        let response = self
            .server
            .post(&api_path("/families"))
            .add_header("Authorization", founder.bearer())
            .json(&json!({ "name": name }))
            .await;
        assert_eq!(response.status_code(), 201);
        let family: Value = response.json();
        family["invite_code"]
            .as_str()
            .expect("Family without invite code")
            .to_string()
    }

    pub async fn join(&self, member: &TestMember, invite_code: &str) -> TestResponse {
        self.server
            .post(&api_path("/families/join"))
            .add_header("Authorization", member.bearer())
            .json(&json!({ "invite_code": invite_code }))
            .await
    }

    /// A teacher with two students sharing one family.
    pub async fn classroom(&self) -> (TestMember, TestMember, TestMember) {
        let teacher = self.teacher("Ms. Rivera").await;
        let code = self.found_family(&teacher, "Rivera Homeschool").await;
        let alice = self.student("Alice").await;
        let ben = self.student("Ben").await;
        assert_eq!(self.join(&alice, &code).await.status_code(), 200);
        assert_eq!(self.join(&ben, &code).await.status_code(), 200);
        (teacher, alice, ben)
    }

    pub async fn subject(&self, name: &str) -> Subject {
        SubjectRepositoryTrait::create(&self.db, name)
            .await
            .expect("Failed to create subject")
    }

    /// Publish (or draft) a post through the API and return its JSON.
    pub async fn create_post(
        &self,
        author: &TestMember,
        subject: &Subject,
        title: &str,
        status: &str,
    ) -> Value {
        let response = self
            .server
            .post(&api_path("/posts"))
            .add_header("Authorization", author.bearer())
            .json(&json!({
                "subject_id": subject.id,
                "title": title,
                "content": format!("{} body", title),
                "status": status,
            }))
            .await;
        assert_eq!(response.status_code(), 201);
        response.json()
    }
}

pub fn create_test_config() -> Config {
    Config {
        server_port: 4000,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        database_url: "postgres://unused/kinfolio_test".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 5,
        jwt_secret: "test-secret-key-min-32-characters-long-for-testing".to_string(),
        jwt_expiry_hours: 24,
        time_zone: Tz::UTC,
        invite_code_max_attempts: 10_000,
        timeline_page_size: TEST_PAGE_SIZE,
        log_format: LogFormat::Compact,
    }
}

/// Build the full router over a fresh in-memory database.
pub async fn setup_test_app() -> TestApp {
    let db = InMemoryDatabase::new();
    let config = create_test_config();
    let state = Arc::new(AppState::new(
        config.clone(),
        DbState::from_backend(Arc::new(db.clone())),
    ));

    let app = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp { server, db, state }
}
