//! API routes

mod content;
mod health;
pub mod metrics;
pub mod types;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(content::routes(&state))
        .merge(users::routes(&state))
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use rolegate_auth::Claims;
    use rolegate_db::{Database, NewUser, RoleName, SeedData};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret";

    struct TestApp {
        router: Router,
        db: Database,
    }

    impl TestApp {
        async fn new() -> Self {
            let db = Database::in_memory().await.unwrap();
            db.seed(&SeedData::default()).await.unwrap();
            let router = create_router(AppState::new(db.clone(), SECRET), None);
            Self { router, db }
        }

        /// Create a user holding exactly `roles` and return its ID
        async fn user_with_roles(&self, username: &str, roles: &[RoleName]) -> i64 {
            let user = self
                .db
                .insert_user(NewUser {
                    username: username.to_string(),
                    name: None,
                    email: format!("{}@example.com", username),
                    password_hash: "hash".to_string(),
                    phone: None,
                    website: None,
                })
                .await
                .unwrap();
            for role in roles {
                let role = self.db.get_role_by_name(*role).await.unwrap().unwrap();
                self.db.grant_role(user.id, role.id).await.unwrap();
            }
            user.id
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            (status, body)
        }

        async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            let mut builder = Request::builder().uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        async fn post_json(&self, uri: &str, token: &str, body: &str) -> (StatusCode, Value) {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }
    }

    fn token_for(id: i64) -> String {
        let now = Utc::now();
        let claims = Claims {
            id,
            exp: Some((now + Duration::hours(1)).timestamp()),
            iat: Some(now.timestamp()),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    #[tokio::test]
    async fn test_public_and_health_routes() {
        let app = TestApp::new().await;

        let (status, body) = app.get("/api/test/all", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("Public Content.".to_string()));

        let (status, body) = app.get("/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_header_absent() {
        let app = TestApp::new().await;

        let (status, body) = app.get("/api/test/admin", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "No token provided!" }));
    }

    #[tokio::test]
    async fn test_bad_token() {
        let app = TestApp::new().await;

        let (status, body) = app.get("/api/test/user", Some("badtoken")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "Unauthorized!" }));
    }

    #[tokio::test]
    async fn test_non_ascii_authorization_header() {
        let app = TestApp::new().await;
        let request = Request::builder()
            .uri("/api/test/user")
            .header(
                header::AUTHORIZATION,
                header::HeaderValue::from_bytes(b"Bearer \xfftoken\xfe").unwrap(),
            )
            .body(Body::empty())
            .unwrap();

        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "Unauthorized!" }));
    }

    #[tokio::test]
    async fn test_token_without_expiry_is_accepted() {
        let app = TestApp::new().await;
        let id = app.user_with_roles("forever", &[RoleName::Admin]).await;
        let claims = Claims {
            id,
            exp: None,
            iat: None,
        };
        let token =
            encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
                .unwrap();

        let (status, body) = app.get("/api/test/admin", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("Admin Content.".to_string()));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let app = TestApp::new().await;
        let id = app.user_with_roles("late", &[RoleName::Admin]).await;
        let claims = Claims {
            id,
            exp: Some((Utc::now() - Duration::hours(1)).timestamp()),
            iat: None,
        };
        let token =
            encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
                .unwrap();

        let (status, _) = app.get("/api/test/admin", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_role_on_admin_route() {
        let app = TestApp::new().await;
        let id = app.user_with_roles("plain", &[RoleName::User]).await;

        let (status, body) = app.get("/api/test/admin", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "Require admin Role!" }));

        let (status, body) = app.get("/api/test/mod", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "Require Moderator Role!" }));

        let (status, body) = app.get("/api/test/staff", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "Require Moderator or Admin Role!" }));

        let (status, body) = app.get("/api/test/user", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("User Content.".to_string()));
    }

    #[tokio::test]
    async fn test_admin_role_on_admin_route() {
        let app = TestApp::new().await;
        let id = app.user_with_roles("boss", &[RoleName::Admin]).await;

        let (status, body) = app.get("/api/test/admin", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("Admin Content.".to_string()));

        let (status, _) = app.get("/api/test/staff", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.get("/api/test/mod", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_moderator_routes() {
        let app = TestApp::new().await;
        let id = app.user_with_roles("mod", &[RoleName::Moderator]).await;

        let (status, body) = app.get("/api/test/mod", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("Moderator Content.".to_string()));

        let (status, _) = app.get("/api/test/staff", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unassigned_user_is_forbidden() {
        let app = TestApp::new().await;
        let id = app.user_with_roles("nobody", &[]).await;

        let (status, body) = app.get("/api/test/staff", Some(&token_for(id))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "Require Moderator or Admin Role!" }));
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let app = TestApp::new().await;

        let (status, body) = app.get("/api/test/admin", Some(&token_for(9999))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "User not found" }));
    }

    #[tokio::test]
    async fn test_me_returns_profile_with_roles() {
        let app = TestApp::new().await;
        let seeded = app.db.get_user_by_username("stephen1").await.unwrap().unwrap();

        let (status, body) = app.get("/api/users/me", Some(&token_for(seeded.id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "stephen1");
        assert_eq!(body["roles"], json!(["user"]));
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_admin_grants_role() {
        let app = TestApp::new().await;
        let admin = app.user_with_roles("root", &[RoleName::Admin]).await;
        let target = app.user_with_roles("target", &[RoleName::User]).await;
        let uri = format!("/api/admin/users/{}/roles", target);

        let (status, _) = app.get("/api/test/mod", Some(&token_for(target))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .post_json(&uri, &token_for(admin), r#"{"role":"moderator"}"#)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "user_id": target, "role": "moderator", "granted": true }));

        let (_, body) = app
            .post_json(&uri, &token_for(admin), r#"{"role":"moderator"}"#)
            .await;
        assert_eq!(body["granted"], false);

        // Roles are re-read on every request
        let (status, _) = app.get("/api/test/mod", Some(&token_for(target))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_grant_role_requires_admin() {
        let app = TestApp::new().await;
        let moderator = app.user_with_roles("helper", &[RoleName::Moderator]).await;

        let (status, body) = app
            .post_json("/api/admin/users/1/roles", &token_for(moderator), r#"{"role":"admin"}"#)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "Require admin Role!" }));
    }

    #[tokio::test]
    async fn test_grant_role_validation() {
        let app = TestApp::new().await;
        let admin = app.user_with_roles("root", &[RoleName::Admin]).await;
        let uri = format!("/api/admin/users/{}/roles", admin);

        let (status, body) = app.post_json(&uri, &token_for(admin), r#"{"role":"root"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation error");
        assert!(body["errors"]["role"].is_array());

        let (status, body) = app.post_json(&uri, &token_for(admin), "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation error");
    }

    #[tokio::test]
    async fn test_grant_role_unknown_user() {
        let app = TestApp::new().await;
        let admin = app.user_with_roles("root", &[RoleName::Admin]).await;

        let (status, body) = app
            .post_json("/api/admin/users/4242/roles", &token_for(admin), r#"{"role":"user"}"#)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "User not found" }));
    }

    #[test]
    fn test_decisions_are_counted_per_stage() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        ::metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let app = TestApp::new().await;
                let id = app.user_with_roles("counted", &[RoleName::User]).await;

                let (status, _) = app.get("/api/test/user", Some(&token_for(id))).await;
                assert_eq!(status, StatusCode::OK);
                let (status, _) = app.get("/api/test/admin", Some(&token_for(id))).await;
                assert_eq!(status, StatusCode::FORBIDDEN);
            })
        });

        let rendered = handle.render();
        let count = |outcome: &str, stage: &str| {
            rendered
                .lines()
                .find(|line| {
                    line.starts_with("rolegate_auth_decisions_total{")
                        && line.contains(&format!("outcome=\"{}\"", outcome))
                        && line.contains(&format!("stage=\"{}\"", stage))
                })
                .and_then(|line| line.rsplit(' ').next())
                .map(str::to_string)
        };

        // Both requests pass token verification; only the admin check is rejected
        assert_eq!(count("authorized", "token_verified").as_deref(), Some("2"));
        assert_eq!(count("rejected", "roles_resolved").as_deref(), Some("1"));
        assert_eq!(count("authorized", "roles_resolved"), None);
    }
}
