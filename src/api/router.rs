//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Rate limiter → 2. Auth validator → 3. Access logger

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Returns a `Router` with all endpoints under `/api/`. Everything except
/// register/login and the hardware report requires bearer authentication.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

/// The full application: API plus the static web client (when a `web/`
/// directory exists) behind a permissive CORS layer for browser pollers.
pub fn app_router(core: Arc<CoreState>) -> Router {
    let mut app = api_router(core).layer(CorsLayer::permissive());

    let web_dir = config::web_dir();
    if web_dir.is_dir() {
        tracing::info!(dir = %web_dir.display(), "serving static web client");
        app = app.fallback_service(ServeDir::new(web_dir));
    }

    app
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes — require auth + full middleware stack
    //
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Rate limit → Auth → Access log (innermost) → Handler
    //
    // Extension must be outermost so all middleware can access ApiContext.
    // Routes with state — .with_state() converts Router<ApiContext> → Router<()>
    // so middleware layers (which use from_fn with state=()) are compatible.
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/logout", post(endpoints::auth::logout))
        .route(
            "/medications",
            get(endpoints::medications::list).post(endpoints::medications::register),
        )
        .route(
            "/medications/:compartment",
            get(endpoints::medications::detail).delete(endpoints::medications::remove),
        )
        .route(
            "/medications/:compartment/taken",
            post(endpoints::medications::taken),
        )
        .route(
            "/medications/:compartment/complete",
            post(endpoints::medications::complete),
        )
        .route("/history", get(endpoints::history::list))
        .route("/history/:id", get(endpoints::history::detail))
        .route(
            "/notifications/settings",
            get(endpoints::notifications::get_settings)
                .post(endpoints::notifications::set_settings),
        )
        .route("/box/status", get(endpoints::box_status::status))
        .route("/box/slots/:slot", post(endpoints::box_status::set_slot))
        .route(
            "/box/notifications",
            get(endpoints::box_status::poll_notifications),
        )
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::log::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (rate-limited only, no auth required):
    // account creation/login, and the hardware status report — the box
    // firmware has no login flow.
    let unprotected = Router::new()
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/box/report", post(endpoints::box_status::report))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx));

    // Mount all routes
    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let core = Arc::new(CoreState::with_db_path(tmp.path().join("pillbox.db")));
        (api_router(core.clone()), core, tmp)
    }

    fn json_request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    /// Register an account and return its token.
    async fn register_user(app: &Router, email: &str) -> String {
        let req = json_request(
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({"email": email, "password": "correct horse"})),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        json["token"].as_str().unwrap().to_string()
    }

    /// Register a medication into a compartment for the given token.
    async fn register_med(app: &Router, token: &str, compartment: u8, name: &str) {
        let req = json_request(
            "POST",
            "/api/medications",
            Some(token),
            Some(serde_json::json!({
                "compartment": compartment,
                "name": name,
                "times": {"morning": true, "lunch": false, "evening": true},
                "total_doses": 10,
                "memo": "with water"
            })),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // ── Auth ─────────────────────────────────────────────────

    #[tokio::test]
    async fn health_requires_auth() {
        let (app, _core, _tmp) = test_app();
        let req = json_request("GET", "/api/health", None, None);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_succeeds_with_valid_token() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request("GET", "/api/health", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // Auth middleware marks responses non-cacheable
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["slots"], 4);
        assert!(!json["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let (app, _core, _tmp) = test_app();
        let req = json_request("GET", "/api/health", Some("invalid-token"), None);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_validates_email_and_password() {
        let (app, _core, _tmp) = test_app();

        let req = json_request(
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({"email": "not-an-email", "password": "long enough"})),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let req = json_request(
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({"email": "a@b.c", "password": "short"})),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_email_returns_409() {
        let (app, _core, _tmp) = test_app();
        register_user(&app, "test1@gmail.com").await;

        let req = json_request(
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({"email": "test1@gmail.com", "password": "correct horse"})),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn login_returns_fresh_token() {
        let (app, _core, _tmp) = test_app();
        register_user(&app, "test1@gmail.com").await;

        let req = json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({"email": "test1@gmail.com", "password": "correct horse"})),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let token = json["token"].as_str().unwrap();

        let req = json_request("GET", "/api/medications", Some(token), None);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email() {
        let (app, _core, _tmp) = test_app();
        register_user(&app, "test1@gmail.com").await;

        let req = json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({"email": "test1@gmail.com", "password": "wrong password"})),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let req = json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({"email": "nobody@gmail.com", "password": "correct horse"})),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request("POST", "/api/auth/logout", Some(&token), None);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["revoked"], true);

        let req = json_request("GET", "/api/health", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (app, _core, _tmp) = test_app();
        let req = json_request("GET", "/api/nonexistent", Some("token"), None);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // ── Medications ──────────────────────────────────────────

    #[tokio::test]
    async fn register_and_list_medications() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;
        register_med(&app, &token, 2, "Cold medicine").await;

        let req = json_request("GET", "/api/medications", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;

        let meds = json["medications"].as_array().unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0]["compartment"], 2);
        assert_eq!(meds[0]["name"], "Cold medicine");
        assert_eq!(meds[0]["remaining"], 10);
        assert_eq!(meds[0]["percentage"], 0);
        assert_eq!(meds[0]["times"]["morning"], true);
    }

    #[tokio::test]
    async fn register_validates_payload() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        // Compartment out of range
        let req = json_request(
            "POST",
            "/api/medications",
            Some(&token),
            Some(serde_json::json!({
                "compartment": 5, "name": "X",
                "times": {"morning": true, "lunch": false, "evening": false},
                "total_doses": 10
            })),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // No dose time selected
        let req = json_request(
            "POST",
            "/api/medications",
            Some(&token),
            Some(serde_json::json!({
                "compartment": 1, "name": "X",
                "times": {"morning": false, "lunch": false, "evening": false},
                "total_doses": 10
            })),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Zero doses
        let req = json_request(
            "POST",
            "/api/medications",
            Some(&token),
            Some(serde_json::json!({
                "compartment": 1, "name": "X",
                "times": {"morning": true, "lunch": false, "evening": false},
                "total_doses": 0
            })),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reregistering_compartment_replaces_occupant() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;
        register_med(&app, &token, 1, "Old").await;
        register_med(&app, &token, 1, "New").await;

        let req = json_request("GET", "/api/medications", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;
        let meds = json["medications"].as_array().unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0]["name"], "New");
    }

    #[tokio::test]
    async fn empty_compartment_returns_404() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request("GET", "/api/medications/3", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn taken_increments_counter() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;
        register_med(&app, &token, 1, "Painkiller").await;

        let req = json_request("POST", "/api/medications/1/taken", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["doses_taken"], 1);
        assert_eq!(json["remaining"], 9);
        assert_eq!(json["percentage"], 10);
    }

    #[tokio::test]
    async fn complete_moves_to_history_and_clears_light() {
        use crate::hardware::SlotState;

        let (app, core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;
        register_med(&app, &token, 2, "Cold medicine").await;

        // Simulate the light being on for this compartment
        core.write_mirror()
            .unwrap()
            .set_slot(2, SlotState::Green)
            .unwrap();

        let req = json_request("POST", "/api/medications/2/complete", Some(&token), None);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let history_id = json["history_id"].as_str().unwrap().to_string();
        assert!(json["completed_at"].is_string());

        // Compartment is empty again
        let req = json_request("GET", "/api/medications/2", Some(&token), None);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Light cleared via the browser-side mirror write
        let status = core.read_mirror().unwrap().snapshot();
        assert_eq!(status.slots[1], SlotState::Empty);

        // History holds the record
        let req = json_request(
            "GET",
            &format!("/api/history/{history_id}"),
            Some(&token),
            None,
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["name"], "Cold medicine");
        assert_eq!(json["total_doses"], 10);
    }

    #[tokio::test]
    async fn complete_succeeds_when_mirror_lock_poisoned() {
        let (app, core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;
        register_med(&app, &token, 1, "Painkiller").await;

        // Panic while holding the write guard to poison the mirror lock
        let poisoner = core.clone();
        std::thread::spawn(move || {
            let _guard = poisoner.write_mirror();
            panic!("poison mirror lock");
        })
        .join()
        .unwrap_err();
        assert!(core.write_mirror().is_err());

        // The history move still goes through; only the light write is lost
        let req = json_request("POST", "/api/medications/1/complete", Some(&token), None);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let req = json_request("GET", "/api/history", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;
        assert_eq!(json["history"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_discards_without_history() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;
        register_med(&app, &token, 4, "Vitamin C").await;

        let req = json_request("DELETE", "/api/medications/4", Some(&token), None);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let req = json_request("GET", "/api/history", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;
        assert!(json["history"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn users_cannot_see_each_other() {
        let (app, _core, _tmp) = test_app();
        let alice = register_user(&app, "alice@gmail.com").await;
        let bob = register_user(&app, "bob@gmail.com").await;
        register_med(&app, &alice, 1, "Alice's pills").await;

        let req = json_request("GET", "/api/medications", Some(&bob), None);
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;
        assert!(json["medications"].as_array().unwrap().is_empty());
    }

    // ── History ──────────────────────────────────────────────

    #[tokio::test]
    async fn history_sorted_by_name() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;
        for (slot, name) in [(1, "Vitamin C"), (2, "Painkiller")] {
            register_med(&app, &token, slot, name).await;
            let req = json_request(
                "POST",
                &format!("/api/medications/{slot}/complete"),
                Some(&token),
                None,
            );
            app.clone().oneshot(req).await.unwrap();
        }

        let req = json_request("GET", "/api/history", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;
        let names: Vec<&str> = json["history"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Painkiller", "Vitamin C"]);
    }

    #[tokio::test]
    async fn history_detail_rejects_bad_id() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request("GET", "/api/history/not-a-uuid", Some(&token), None);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let req = json_request(
            "GET",
            &format!("/api/history/{}", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // ── Notification settings ────────────────────────────────

    #[tokio::test]
    async fn settings_default_initialized_on_first_read() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request("GET", "/api/notifications/settings", Some(&token), None);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["enabled"], false);
        assert_eq!(json["lead_time"], "30m");

        // Second read sees the persisted defaults
        let req = json_request("GET", "/api/notifications/settings", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;
        assert_eq!(json["lead_time"], "30m");
    }

    #[tokio::test]
    async fn settings_roundtrip() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request(
            "POST",
            "/api/notifications/settings",
            Some(&token),
            Some(serde_json::json!({"enabled": true, "lead_time": "2h"})),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let req = json_request("GET", "/api/notifications/settings", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;
        assert_eq!(json["enabled"], true);
        assert_eq!(json["lead_time"], "2h");
    }

    #[tokio::test]
    async fn settings_reject_unknown_lead_time() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request(
            "POST",
            "/api/notifications/settings",
            Some(&token),
            Some(serde_json::json!({"enabled": true, "lead_time": "45m"})),
        );
        let response = app.oneshot(req).await.unwrap();
        // serde rejects the unknown variant before the handler runs
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    // ── Box mirror ───────────────────────────────────────────

    #[tokio::test]
    async fn box_status_requires_auth_but_report_does_not() {
        let (app, _core, _tmp) = test_app();

        let req = json_request("GET", "/api/box/status", None, None);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let req = json_request(
            "POST",
            "/api/box/report",
            None,
            Some(serde_json::json!({"slots": ["green", "empty", "red", "empty"]})),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn report_then_poll_status() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request(
            "POST",
            "/api/box/report",
            None,
            Some(serde_json::json!({"slots": ["green", "green", "red", "empty"]})),
        );
        app.clone().oneshot(req).await.unwrap();

        let req = json_request("GET", "/api/box/status", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["slots"][0], "green");
        assert_eq!(json["slots"][2], "red");
        assert!(json["last_updated"][3].is_string());
    }

    #[tokio::test]
    async fn browser_slot_write_overrides_report() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request(
            "POST",
            "/api/box/report",
            None,
            Some(serde_json::json!({"slots": ["red", "red", "red", "red"]})),
        );
        app.clone().oneshot(req).await.unwrap();

        let req = json_request(
            "POST",
            "/api/box/slots/2",
            Some(&token),
            Some(serde_json::json!({"state": "green"})),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["slots"][1], "green");
        assert_eq!(json["slots"][0], "red");
    }

    #[tokio::test]
    async fn slot_write_rejects_out_of_range() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request(
            "POST",
            "/api/box/slots/5",
            Some(&token),
            Some(serde_json::json!({"state": "green"})),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn notifications_delivered_once() {
        let (app, _core, _tmp) = test_app();
        let token = register_user(&app, "test1@gmail.com").await;

        let req = json_request(
            "POST",
            "/api/box/report",
            None,
            Some(serde_json::json!({
                "slots": ["empty", "empty", "empty", "empty"],
                "notification": {"slot": 1, "message": "time to take your medication"}
            })),
        );
        app.clone().oneshot(req).await.unwrap();

        let req = json_request("GET", "/api/box/notifications", Some(&token), None);
        let response = app.clone().oneshot(req).await.unwrap();
        let json = response_json(response).await;
        let notifications = json["notifications"].as_array().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["slot"], 1);
        assert_eq!(notifications[0]["message"], "time to take your medication");
        assert!(notifications[0]["received_at"].is_string());

        // Drained — second poll is empty
        let req = json_request("GET", "/api/box/notifications", Some(&token), None);
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;
        assert!(json["notifications"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn report_rejects_bad_notification_slot() {
        let (app, _core, _tmp) = test_app();

        let req = json_request(
            "POST",
            "/api/box/report",
            None,
            Some(serde_json::json!({
                "slots": ["empty", "empty", "empty", "empty"],
                "notification": {"slot": 9, "message": "bogus"}
            })),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
