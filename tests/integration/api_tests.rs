//! API integration tests

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use hbnb_server::{api, config::AppConfig, repository::Repositories, AppState};

const ADMIN_EMAIL: &str = "admin@hbnb.io";
const ADMIN_PASSWORD: &str = "admin-pass";

/// Router over fresh in-memory storage with a bootstrapped admin
async fn app() -> Router {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-secret".to_string();
    config.auth.bootstrap_admin_email = Some(ADMIN_EMAIL.to_string());
    config.auth.bootstrap_admin_password = Some(ADMIN_PASSWORD.to_string());

    let state = AppState::new(config, Repositories::in_memory());
    state
        .services
        .auth
        .bootstrap_admin()
        .await
        .expect("Failed to bootstrap admin");
    api::create_router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

/// Create a user as admin and log in as them
async fn user_token(app: &Router, admin: &str, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(admin),
        Some(json!({
            "first_name": "Guest",
            "last_name": "User",
            "email": email,
            "password": "guest-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed: {}", body);
    let id = body["id"].as_str().unwrap().to_string();
    (id, login(app, email, "guest-pass").await)
}

fn place_body(title: &str, price: f64) -> Value {
    json!({
        "title": title,
        "description": "Quiet street",
        "price": price,
        "latitude": 48.85,
        "longitude": 2.35
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_login() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "wrong" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn test_me_requires_token_and_hides_password_hash() {
    let app = app().await;
    let (status, _) = send(&app, Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/auth/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], true);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_user_admin_rules() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (guest_id, guest) = user_token(&app, &admin, "guest@hbnb.io").await;

    // Duplicate email
    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(&admin),
        Some(json!({
            "first_name": "Other",
            "last_name": "Guest",
            "email": "GUEST@hbnb.io",
            "password": "guest-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");

    // Non-admins cannot create users
    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(&guest),
        Some(json!({
            "first_name": "Sneaky",
            "last_name": "Guest",
            "email": "sneaky@hbnb.io",
            "password": "guest-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Own names are editable, privileged fields are not
    let uri = format!("/users/{}", guest_id);
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&guest),
        Some(json!({ "first_name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Renamed");

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&guest),
        Some(json!({ "is_admin": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&guest),
        Some(json!({ "first_name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_amenities_are_admin_managed() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, guest) = user_token(&app, &admin, "guest@hbnb.io").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/amenities",
        Some(&guest),
        Some(json!({ "name": "Wi-Fi" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, wifi) = send(
        &app,
        Method::POST,
        "/amenities",
        Some(&admin),
        Some(json!({ "name": "Wi-Fi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/amenities",
        Some(&admin),
        Some(json!({ "name": "wi-fi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = send(&app, Method::GET, "/amenities", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/amenities/{}", wifi["id"].as_str().unwrap());
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({ "name": "Fibre" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Fibre");
}

#[tokio::test]
async fn test_place_lifecycle() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (host_id, host) = user_token(&app, &admin, "host@hbnb.io").await;
    let (_, other) = user_token(&app, &admin, "other@hbnb.io").await;

    let (_, wifi) = send(
        &app,
        Method::POST,
        "/amenities",
        Some(&admin),
        Some(json!({ "name": "Wi-Fi" })),
    )
    .await;

    // Anonymous callers cannot list a place
    let (status, _) = send(&app, Method::POST, "/places", None, Some(place_body("Loft", 80.0))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut body = place_body("Loft", 80.0);
    body["amenity_ids"] = json!([wifi["id"]]);
    let (status, place) = send(&app, Method::POST, "/places", Some(&host), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", place);
    assert_eq!(place["owner_id"], host_id.as_str());

    let uri = format!("/places/{}", place["id"].as_str().unwrap());
    let (status, details) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["title"], "Loft");
    assert_eq!(details["owner"]["id"], host_id.as_str());
    assert_eq!(details["amenities"][0]["name"], "Wi-Fi");
    assert_eq!(details["reviews"], json!([]));

    // Invalid price leaves the place untouched
    let (status, _) = send(&app, Method::PUT, &uri, Some(&host), Some(json!({ "price": -5.0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, details) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(details["price"], 80.0);

    // Only the owner (or an admin) may edit
    let (status, _) = send(&app, Method::PUT, &uri, Some(&other), Some(json!({ "price": 10.0 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, updated) = send(&app, Method::PUT, &uri, Some(&host), Some(json!({ "price": 95.5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 95.5);
    assert_eq!(updated["description"], "Quiet street");

    // An explicit null clears the description
    let (status, updated) =
        send(&app, Method::PUT, &uri, Some(&host), Some(json!({ "description": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], Value::Null);
    assert_eq!(updated["price"], 95.5);

    // Ownership transfers are admin only
    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&host),
        Some(json!({ "owner_id": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchResource");
}

#[tokio::test]
async fn test_place_with_unknown_amenity() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let missing = uuid::Uuid::new_v4();

    let mut body = place_body("Loft", 80.0);
    body["amenity_ids"] = json!([missing]);
    let (status, body) = send(&app, Method::POST, "/places", Some(&admin), Some(body)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains(&missing.to_string()));
}

#[tokio::test]
async fn test_review_rules() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, host) = user_token(&app, &admin, "host@hbnb.io").await;
    let (guest_id, guest) = user_token(&app, &admin, "guest@hbnb.io").await;
    let (_, other) = user_token(&app, &admin, "other@hbnb.io").await;

    let (_, place) = send(&app, Method::POST, "/places", Some(&host), Some(place_body("Cabin", 60.0))).await;
    let place_id = place["id"].as_str().unwrap().to_string();
    let review = json!({ "text": "Cosy", "rating": 5, "place_id": place_id });

    // Owners cannot review their own place
    let (status, body) = send(&app, Method::POST, "/reviews", Some(&host), Some(review.clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "RuleViolation");

    let (status, created) = send(&app, Method::POST, "/reviews", Some(&guest), Some(review.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["user_id"], guest_id.as_str());

    // One review per user and place
    let (status, _) = send(&app, Method::POST, "/reviews", Some(&guest), Some(review.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/reviews",
        Some(&other),
        Some(json!({ "text": "Meh", "rating": 6, "place_id": place_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = send(&app, Method::GET, &format!("/places/{}/reviews", place_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/reviews/{}", created["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::PUT, &uri, Some(&other), Some(json!({ "rating": 1 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, updated) = send(&app, Method::PUT, &uri, Some(&guest), Some(json!({ "rating": 4 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rating"], 4);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reviews_of_unknown_place() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/places/{}/reviews", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
