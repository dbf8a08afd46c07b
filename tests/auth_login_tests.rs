use bijou_auth::TestApp;

#[tokio::test]
async fn register_success_sets_refresh_cookie() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "name": "Amber",
        "email": "amber@example.com",
        "password": "garnet-and-gold",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;

    assert_eq!(res.status, 201);
    assert!(res.is_success());

    let data = res.data();
    assert!(data["access_token"].is_string());
    assert_eq!(data["user"]["email"], "amber@example.com");
    assert_eq!(data["user"]["role"], "customer");
    // secrets never serialized
    assert!(data["user"]["password_hash"].is_null());
    assert!(data["user"]["refresh_token"].is_null());

    let raw = res.refresh_cookie_raw().expect("no refresh cookie");
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("SameSite=Strict"));
    assert!(raw.contains("Path=/"));
    // test environment is not production
    assert!(!raw.contains("Secure"));
}

#[tokio::test]
async fn register_missing_fields_is_422() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "name": "",
        "email": "x@example.com",
        "password": "something",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;

    assert_eq!(res.status, 422);
    assert_eq!(res.json()["status"], "fail");
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.register_user("Ruby", "ruby@example.com", "password123")
        .await;

    let body = serde_json::json!({
        "name": "Ruby Again",
        "email": "ruby@example.com",
        "password": "password456",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.message(), "Email already registered");
}

#[tokio::test]
async fn concurrent_duplicate_registration_is_a_conflict_not_a_500() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "name": "Jade",
        "email": "jade@example.com",
        "password": "password123",
    })
    .to_string();

    // Whichever request loses the race on the unique email index must still
    // get the Conflict response, never a database error.
    let url_a = app.url("/api/auth/register");
    let url_b = app.url("/api/auth/register");
    let (a, b) = tokio::join!(
        app.client.post(&url_a, &body),
        app.client.post(&url_b, &body)
    );

    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [201, 400]);

    let loser = if a.status == 400 { &a } else { &b };
    assert_eq!(loser.message(), "Email already registered");
}

#[tokio::test]
async fn register_as_admin_is_rejected() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "name": "Mallory",
        "email": "mallory@example.com",
        "password": "password123",
        "role": "admin",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;

    assert_eq!(res.status, 422);
}

#[tokio::test]
async fn register_as_seller_is_allowed() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "name": "Opal & Co",
        "email": "shop@example.com",
        "password": "password123",
        "role": "seller",
        "phone": "555-0101",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;

    assert_eq!(res.status, 201);
    assert_eq!(res.data()["user"]["role"], "seller");
    assert_eq!(res.data()["user"]["phone"], "555-0101");
}

#[tokio::test]
async fn login_success_returns_public_projection() {
    let app = TestApp::new().await;
    app.register_user("Jade", "jade@example.com", "password123")
        .await;

    let body = serde_json::json!({
        "email": "jade@example.com",
        "password": "password123",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 200);
    let data = res.data();
    assert!(data["access_token"].is_string());
    assert_eq!(data["user"]["name"], "Jade");
    assert!(data["user"]["password_hash"].is_null());
    assert!(data["user"]["refresh_token"].is_null());
    assert!(res.refresh_cookie().is_some());
}

#[tokio::test]
async fn login_wrong_password_is_401() {
    let app = TestApp::new().await;
    app.register_user("A", "a@x.com", "correct-horse").await;

    let body = serde_json::json!({"email": "a@x.com", "password": "wrong"});
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.json()["status"], "fail");
    assert_eq!(res.message(), "Invalid password");
}

#[tokio::test]
async fn login_unknown_email_is_401() {
    let app = TestApp::new().await;

    let body = serde_json::json!({"email": "ghost@x.com", "password": "x"});
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.json()["status"], "fail");
    assert_eq!(res.message(), "Invalid email");
}

#[tokio::test]
async fn login_missing_fields_is_422() {
    let app = TestApp::new().await;

    let body = serde_json::json!({"email": "", "password": ""});
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 422);
}

#[tokio::test]
async fn email_is_case_normalized() {
    let app = TestApp::new().await;
    app.register_user("Case", "Case@Example.COM", "password123")
        .await;

    let (_, _) = app.login("case@example.com", "password123").await;

    // registering the uppercase variant again collides
    let body = serde_json::json!({
        "name": "Case2",
        "email": "CASE@EXAMPLE.COM",
        "password": "password123",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn me_returns_current_user() {
    let app = TestApp::new().await;
    let (token, _) = app
        .register_user("Coral", "coral@example.com", "password123")
        .await;

    let res = app
        .client
        .get_with_auth(&app.url("/api/auth/me"), &token)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.data()["email"], "coral@example.com");
}

#[tokio::test]
async fn me_rejects_garbage_token() {
    let app = TestApp::new().await;

    let res = app
        .client
        .get_with_auth(&app.url("/api/auth/me"), "not-a-jwt")
        .await;

    assert_eq!(res.status, 401);
}
