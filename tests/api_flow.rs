//! End-to-end test: serves the router on an ephemeral port and drives the
//! full proposal → approval → registration → check-in flow over HTTP.

#![allow(clippy::panic)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use campus_events::api;
use campus_events::app_state::AppState;

const ADMIN_EMAIL: &str = "admin@campus.test";
const ADMIN_PASSWORD: &str = "admin-password";

struct TestServer {
    base: String,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState::in_memory("api-flow-secret", 3600, 64);
        let Ok(_) = state
            .auth_service
            .ensure_admin("Admin", ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
        else {
            panic!("bootstrap admin failed");
        };

        let app = api::build_router().with_state(state);
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    async fn call(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self.client.request(method, format!("{}{path}", self.base));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let Ok(resp) = req.send().await else {
            panic!("request to {path} failed");
        };
        let status = resp.status();
        let json = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, json)
    }

    async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.call(reqwest::Method::GET, path, Some(token), None).await
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(reqwest::Method::POST, path, Some(token), Some(body))
            .await
    }

    async fn put(&self, path: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(reqwest::Method::PUT, path, Some(token), body).await
    }

    async fn patch(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.call(reqwest::Method::PATCH, path, Some(token), None)
            .await
    }

    async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.call(reqwest::Method::DELETE, path, Some(token), None)
            .await
    }

    /// Registers an account and returns `(token, user_id)`.
    async fn sign_up(&self, name: &str, email: &str) -> (String, String) {
        let (status, body) = self
            .call(
                reqwest::Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        token_and_id(&body)
    }

    async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            reqwest::Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn admin_token(&self) -> String {
        let (status, body) = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        token_and_id(&body).0
    }

    /// Creates and submits a proposal starting 2030-01-10T10:00:00Z.
    async fn pending_event(&self, token: &str, max_attendees: u32) -> String {
        let (status, body) = self
            .post(
                "/api/events/proposals",
                token,
                json!({
                    "title": "Rust Workshop",
                    "description": "Ownership and borrowing",
                    "category": "workshop",
                    "date": "2030-01-10T10:00:00Z",
                    "location": "Hall B",
                    "maxAttendees": max_attendees,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["event"]["status"], "draft");
        let Some(id) = body["event"]["id"].as_str().map(str::to_string) else {
            panic!("missing event id: {body}");
        };

        let (status, body) = self
            .post(&format!("/api/events/proposals/{id}/submit"), token, json!({}))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["event"]["status"], "pending");
        id
    }
}

fn token_and_id(body: &Value) -> (String, String) {
    let (Some(token), Some(id)) = (body["token"].as_str(), body["user"]["id"].as_str()) else {
        panic!("auth response without token or user id: {body}");
    };
    (token.to_string(), id.to_string())
}

#[tokio::test]
async fn proposal_to_attendance_flow() {
    let server = TestServer::start().await;
    let admin = server.admin_token().await;
    let (alice, _) = server.sign_up("Alice", "alice@campus.test").await;
    let (bob, bob_id) = server.sign_up("Bob", "bob@campus.test").await;
    let (carol, carol_id) = server.sign_up("Carol", "carol@campus.test").await;
    let (dave, _) = server.sign_up("Dave", "dave@campus.test").await;

    let id = server.pending_event(&alice, 2).await;

    // Second submit is not a valid transition.
    let (status, body) = server
        .post(&format!("/api/events/proposals/{id}/submit"), &alice, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "invalid_transition");

    // Students cannot approve.
    let (status, _) = server
        .put(&format!("/api/admin/events/{id}/approve"), &bob, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Approval without a body promotes the creator.
    let (status, body) = server
        .put(&format!("/api/admin/events/{id}/approve"), &admin, None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["event"]["status"], "approved");
    assert_eq!(body["creatorPromoted"], true);

    let (_, me) = server.get("/api/auth/me", &alice).await;
    assert_eq!(me["role"], "organizer");

    let (status, body) = server
        .put(&format!("/api/admin/events/{id}/approve"), &admin, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "not_pending");

    // Registration up to capacity.
    let register = format!("/api/events/{id}/register");
    let (status, body) = server.post(&register, &bob, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["event"]["currentAttendees"], 1);

    let (status, body) = server.post(&register, &bob, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "already_registered");

    let (status, _) = server.post(&register, &carol, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.post(&register, &dave, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "event_full");

    let (_, detail) = server.get(&format!("/api/events/{id}"), &bob).await;
    assert_eq!(detail["currentAttendees"], 2);
    assert_eq!(detail["isRegistered"], true);
    assert_eq!(detail["seatsLeft"], 0);
    assert_eq!(detail["acceptingRegistrations"], false);

    // Close and reopen registration.
    let (status, body) = server
        .patch(&format!("/api/events/{id}/close-registration"), &alice)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["event"]["registrationClosed"], true);
    assert!(body["event"]["closedAt"].is_string());

    let (status, body) = server.delete(&register, &carol).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, body) = server.post(&register, &dave, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "registration_closed");

    let (status, body) = server
        .patch(&format!("/api/events/{id}/open-registration"), &alice)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["registrationClosed"], false);
    assert!(body["event"]["closedAt"].is_null());

    // Check-in classification against the 10:00 start.
    let attendance = format!("/api/events/{id}/attendance");
    let (status, body) = server
        .post(
            &attendance,
            &alice,
            json!({ "userId": bob_id, "checkInTime": "2030-01-10T07:30:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["attendance"]["checkInStatus"], "early");

    let (status, body) = server
        .post(
            &attendance,
            &admin,
            json!({ "userId": carol_id, "checkInTime": "2030-01-10T11:30:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["attendance"]["checkInStatus"], "late");

    let (status, body) = server
        .post(
            &attendance,
            &alice,
            json!({ "userId": bob_id, "checkInTime": "2030-01-10T10:00:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "duplicate_attendance");

    let (status, _) = server
        .post(&attendance, &bob, json!({ "userId": bob_id }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.get(&attendance, &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = server
        .get(&format!("{attendance}/{bob_id}"), &bob)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checkedIn"], true);
    assert_eq!(body["attendance"]["checkInStatus"], "early");

    // Deletion cascades.
    let (status, body) = server.delete(&format!("/api/events/{id}"), &alice).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["registrationsRemoved"], 1);
    assert_eq!(body["attendanceRemoved"], 2);

    let (status, body) = server.get(&format!("/api/events/{id}"), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "event_not_found");
}

#[tokio::test]
async fn rejection_requires_notes() {
    let server = TestServer::start().await;
    let admin = server.admin_token().await;
    let (alice, _) = server.sign_up("Alice", "alice@campus.test").await;
    let id = server.pending_event(&alice, 10).await;
    let reject = format!("/api/admin/events/{id}/reject");

    let (status, body) = server.put(&reject, &admin, Some(json!({ "notes": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");

    let (_, pending) = server.get("/api/admin/events/pending", &admin).await;
    assert_eq!(pending["total"], 1);

    let (status, body) = server
        .put(&reject, &admin, Some(json!({ "notes": "Venue unavailable" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["event"]["status"], "rejected");
    assert_eq!(body["event"]["approvalNotes"], "Venue unavailable");

    // Rejected events stay out of the catalogue and are private.
    let (_, catalogue) = server.get("/api/events", &admin).await;
    assert_eq!(catalogue["pagination"]["total"], 0);

    let (bob, _) = server.sign_up("Bob", "bob@campus.test").await;
    let (status, _) = server.get(&format!("/api/events/{id}"), &bob).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .patch(&format!("/api/events/{id}/close-registration"), &alice)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "not_approved");

    let (_, mine) = server.get("/api/events/proposals/mine?status=rejected", &alice).await;
    assert_eq!(mine["total"], 1);
}

#[tokio::test]
async fn cancel_and_edit_draft() {
    let server = TestServer::start().await;
    let (alice, _) = server.sign_up("Alice", "alice@campus.test").await;
    let id = server.pending_event(&alice, 5).await;

    let (status, body) = server
        .put(&format!("/api/events/proposals/{id}"), &alice, Some(json!({ "title": "New" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "invalid_transition");

    let (status, body) = server
        .put(&format!("/api/events/proposals/{id}/cancel-submission"), &alice, None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["event"]["status"], "draft");

    let (status, body) = server
        .put(
            &format!("/api/events/proposals/{id}"),
            &alice,
            Some(json!({ "title": "Advanced Rust", "maxAttendees": 40 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["event"]["title"], "Advanced Rust");
    assert_eq!(body["event"]["maxAttendees"], 40);

    let (status, body) = server
        .put(&format!("/api/events/proposals/{id}/cancel-submission"), &alice, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "not_pending");
}

#[tokio::test]
async fn auth_errors() {
    let server = TestServer::start().await;
    server.sign_up("Alice", "alice@campus.test").await;

    let (status, body) = server
        .call(
            reqwest::Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Other", "email": "ALICE@campus.test", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "email_taken");

    let (status, body) = server.login("alice@campus.test", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "invalid_credentials");

    let (status, body) = server.get("/api/auth/me", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}
