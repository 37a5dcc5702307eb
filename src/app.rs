use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;
use crate::{courses, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .route("/", get(welcome).fallback(route_not_found))
                .merge(users::router())
                .merge(courses::router()),
        )
        .fallback(route_not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the REST API project!" }))
}

pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::basic::header_value, db::SqliteStore};
    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderMap, Request, StatusCode},
    };
    use tower::ServiceExt;

    struct Reply {
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
    }

    impl Reply {
        fn json(&self) -> Value {
            serde_json::from_slice(&self.body).expect("json body")
        }

        fn location(&self) -> &str {
            self.headers
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .expect("Location header")
        }
    }

    async fn test_app() -> Router {
        let store = SqliteStore::in_memory().await.expect("in-memory store");
        build_app(AppState::from_store(store))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        auth: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> Reply {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some((name, pass)) = auth {
            req = req.header(header::AUTHORIZATION, header_value(name, pass));
        }
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec();
        Reply {
            status,
            headers,
            body,
        }
    }

    async fn sign_up(app: &Router, email: &str, password: &str) {
        let reply = send(
            app,
            "POST",
            "/api/users",
            None,
            Some(json!({
                "firstName": "A",
                "lastName": "B",
                "emailAddress": email,
                "password": password,
            })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
    }

    async fn create_course(app: &Router, email: &str, password: &str, title: &str) -> String {
        let reply = send(
            app,
            "POST",
            "/api/courses",
            Some((email, password)),
            Some(json!({ "title": title, "description": "D" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        reply.location().to_string()
    }

    #[tokio::test]
    async fn signup_then_create_course() {
        let app = test_app().await;

        let reply = send(
            &app,
            "POST",
            "/api/users",
            None,
            Some(json!({
                "firstName": "A",
                "lastName": "B",
                "emailAddress": "a@b.com",
                "password": "x",
            })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.location(), "/");
        assert!(reply.body.is_empty());

        let reply = send(
            &app,
            "POST",
            "/api/courses",
            Some(("a@b.com", "x")),
            Some(json!({ "title": "T", "description": "D" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert!(reply.body.is_empty());
        let location = reply.location().to_string();
        let id = location
            .strip_prefix("/api/courses/")
            .expect("course location");
        assert!(id.parse::<i64>().is_ok());

        let reply = send(&app, "GET", &location, None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        let course = reply.json();
        assert_eq!(course["title"], "T");
        assert_eq!(course["description"], "D");
        assert_eq!(course["user"]["emailAddress"], "a@b.com");
        assert_eq!(course["userId"], course["user"]["id"]);
        assert!(course["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn signup_without_password_lists_missing_field() {
        let app = test_app().await;
        let reply = send(
            &app,
            "POST",
            "/api/users",
            None,
            Some(json!({ "firstName": "A", "lastName": "B", "emailAddress": "a@b.com" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        let errors = reply.json();
        let errors = errors.as_array().expect("error array");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn duplicate_email_is_bad_request() {
        let app = test_app().await;
        sign_up(&app, "dup@b.com", "x").await;

        let reply = send(
            &app,
            "POST",
            "/api/users",
            None,
            Some(json!({
                "firstName": "C",
                "lastName": "D",
                "emailAddress": "dup@b.com",
                "password": "y",
            })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        let errors = reply.json();
        assert_eq!(errors[0]["path"], "emailAddress");
        assert_eq!(errors[0]["type"], "unique violation");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = test_app().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn current_user_requires_valid_credentials() {
        let app = test_app().await;
        sign_up(&app, "me@b.com", "secret").await;

        let reply = send(&app, "GET", "/api/users", None, None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.json()["message"], "Access Denied");

        let reply = send(&app, "GET", "/api/users", Some(("me@b.com", "wrong")), None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        let reply = send(&app, "GET", "/api/users", Some(("nobody@b.com", "secret")), None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        let reply = send(&app, "GET", "/api/users", Some(("me@b.com", "secret")), None).await;
        assert_eq!(reply.status, StatusCode::OK);
        let user = reply.json();
        assert_eq!(user["emailAddress"], "me@b.com");
        assert_eq!(user["firstName"], "A");
        assert!(user.get("password").is_none());
    }

    #[tokio::test]
    async fn courses_are_listed_in_id_order() {
        let app = test_app().await;
        sign_up(&app, "a@b.com", "x").await;
        for title in ["Zoology", "Algebra", "Music"] {
            create_course(&app, "a@b.com", "x", title).await;
        }

        let reply = send(&app, "GET", "/api/courses", None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        let list = reply.json();
        let list = list.as_array().expect("array");
        let ids: Vec<i64> = list.iter().map(|c| c["id"].as_i64().unwrap()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(list[0]["title"], "Zoology");
        assert_eq!(list[0]["user"]["emailAddress"], "a@b.com");
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let app = test_app().await;
        let reply = send(&app, "GET", "/api/courses/999", None, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert!(reply.json()["message"].as_str().unwrap().contains("999"));

        let reply = send(&app, "GET", "/api/courses/abc", None, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert!(reply.json()["message"].as_str().unwrap().contains("abc"));
    }

    #[tokio::test]
    async fn course_validation_messages() {
        let app = test_app().await;
        sign_up(&app, "a@b.com", "x").await;
        let reply = send(
            &app,
            "POST",
            "/api/courses",
            Some(("a@b.com", "x")),
            Some(json!({ "estimatedTime": "1h" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            reply.json(),
            json!([
                "Please provide a value for \"title\"",
                "Please provide a value for \"description\"",
            ])
        );
    }

    #[tokio::test]
    async fn mutations_without_credentials_are_rejected() {
        let app = test_app().await;
        sign_up(&app, "a@b.com", "x").await;
        let location = create_course(&app, "a@b.com", "x", "Keep me").await;

        let reply = send(
            &app,
            "POST",
            "/api/courses",
            None,
            Some(json!({ "title": "T", "description": "D" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        let reply = send(
            &app,
            "PUT",
            &location,
            None,
            Some(json!({ "title": "Changed", "description": "D" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        let reply = send(&app, "DELETE", &location, None, None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

        let list = send(&app, "GET", "/api/courses", None, None).await.json();
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["title"], "Keep me");
    }

    #[tokio::test]
    async fn owner_updates_course() {
        let app = test_app().await;
        sign_up(&app, "a@b.com", "x").await;
        let location = create_course(&app, "a@b.com", "x", "Draft").await;
        let before = send(&app, "GET", &location, None, None).await.json();

        let reply = send(
            &app,
            "PUT",
            &location,
            Some(("a@b.com", "x")),
            Some(json!({ "title": "Final", "description": "D2", "materialsNeeded": "Pen" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT);
        assert!(reply.body.is_empty());

        let course = send(&app, "GET", &location, None, None).await.json();
        assert_eq!(course["title"], "Final");
        assert_eq!(course["description"], "D2");
        assert_eq!(course["materialsNeeded"], "Pen");
        assert_eq!(course["createdAt"], before["createdAt"]);
        assert_ne!(course["updatedAt"], before["updatedAt"]);

        let reply = send(
            &app,
            "PUT",
            &location,
            Some(("a@b.com", "x")),
            Some(json!({ "title": "" , "description": "D3" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_owner_cannot_modify_course() {
        let app = test_app().await;
        sign_up(&app, "owner@b.com", "x").await;
        sign_up(&app, "other@b.com", "y").await;
        let location = create_course(&app, "owner@b.com", "x", "Mine").await;

        let reply = send(&app, "DELETE", &location, Some(("other@b.com", "y")), None).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN);

        let reply = send(
            &app,
            "PUT",
            &location,
            Some(("other@b.com", "y")),
            Some(json!({ "title": "Stolen", "description": "D" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN);

        let course = send(&app, "GET", &location, None, None).await;
        assert_eq!(course.status, StatusCode::OK);
        assert_eq!(course.json()["title"], "Mine");
    }

    #[tokio::test]
    async fn owner_deletes_course() {
        let app = test_app().await;
        sign_up(&app, "a@b.com", "x").await;
        let location = create_course(&app, "a@b.com", "x", "Temporary").await;

        let reply = send(&app, "DELETE", &location, Some(("a@b.com", "x")), None).await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT);

        let reply = send(&app, "GET", &location, None, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        let reply = send(&app, "DELETE", &location, Some(("a@b.com", "x")), None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unmatched_routes_are_json_404() {
        let app = test_app().await;
        for (method, uri) in [
            ("GET", "/"),
            ("GET", "/api/nothing"),
            ("GET", "/elsewhere"),
            ("PATCH", "/api/courses"),
        ] {
            let reply = send(&app, method, uri, None, None).await;
            assert_eq!(reply.status, StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(reply.json(), json!({ "message": "Route Not Found" }));
        }
    }

    #[tokio::test]
    async fn greeting() {
        let app = test_app().await;
        let reply = send(&app, "GET", "/api", None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["message"], "Welcome to the REST API project!");
    }

    #[tokio::test]
    async fn body_without_json_content_type_reads_as_empty_object() {
        let app = test_app().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/users")
            .body(Body::from("firstName=A"))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let errors: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            errors,
            json!([
                "Please provide a value for \"firstName\"",
                "Please provide a value for \"lastName\"",
                "Please provide a value for \"emailAddress\"",
                "Please provide a value for \"password\"",
            ])
        );

        sign_up(&app, "a@b.com", "x").await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/courses")
            .header(header::AUTHORIZATION, header_value("a@b.com", "x"))
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let errors: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(errors.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn password_checks_leave_the_runtime_free() {
        use crate::auth::password::{hash_password, verify_password};
        use std::{
            sync::{
                atomic::{AtomicBool, Ordering},
                Arc,
            },
            time::{Duration, Instant},
        };

        // How long one argon2 verify holds a thread on this machine.
        let hash = hash_password("x").unwrap();
        let started = Instant::now();
        assert!(verify_password("x", &hash).unwrap());
        let verify_cost = started.elapsed();

        let app = test_app().await;
        sign_up(&app, "a@b.com", "x").await;

        let done = Arc::new(AtomicBool::new(false));
        let requests = {
            let done = done.clone();
            async move {
                for _ in 0..3 {
                    let reply = send(&app, "GET", "/api/users", Some(("a@b.com", "x")), None).await;
                    assert_eq!(reply.status, StatusCode::OK);
                }
                done.store(true, Ordering::SeqCst);
            }
        };
        let ticker = async {
            let mut longest = Duration::ZERO;
            let mut last = Instant::now();
            while !done.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(1)).await;
                longest = longest.max(last.elapsed());
                last = Instant::now();
            }
            longest
        };

        // Single-threaded runtime: a verify run inline would stall the
        // ticker for at least `verify_cost`.
        let ((), longest_gap) = tokio::join!(requests, ticker);
        assert!(
            longest_gap < verify_cost,
            "runtime stalled for {longest_gap:?}, one verify takes {verify_cost:?}"
        );
    }
}
