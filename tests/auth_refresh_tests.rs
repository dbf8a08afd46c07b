use std::time::Duration;

use bijou_auth::auth::jwt::create_refresh_token;
use bijou_auth::TestApp;

// JWT iat/exp have one-second resolution: two pairs minted within the same
// second are byte-identical. Space rotations out so old != new.
async fn next_second() {
    tokio::time::sleep(Duration::from_millis(1100)).await;
}

#[tokio::test]
async fn refresh_mints_new_access_token_cookie_only() {
    let app = TestApp::new().await;
    let (_, cookie) = app
        .register_user("Pearl", "pearl@example.com", "password123")
        .await;

    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), &cookie)
        .await;

    assert_eq!(res.status, 200);
    assert!(res.is_success());
    assert!(res.data()["access_token"].is_string());
    // the rotated refresh token travels in the cookie, never the body
    assert!(res.data()["refresh_token"].is_null());
    assert!(res.refresh_cookie().is_some());
}

#[tokio::test]
async fn refresh_without_cookie_is_401() {
    let app = TestApp::new().await;

    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), "other=1")
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.message(), "Refresh token missing");
}

#[tokio::test]
async fn refresh_with_garbage_cookie_is_401() {
    let app = TestApp::new().await;

    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), "jwt=not-a-jwt")
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.message(), "Invalid refresh token");
}

#[tokio::test]
async fn refresh_with_expired_cookie_is_401() {
    let app = TestApp::new().await;

    let expired = create_refresh_token(1, &app.config.refresh_token_secret, -120).unwrap();
    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), &format!("jwt={expired}"))
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.message(), "Refresh token expired");
}

#[tokio::test]
async fn refresh_for_deleted_user_is_403() {
    let app = TestApp::new().await;

    // structurally valid token for a user id that was never created
    let orphan = create_refresh_token(9999, &app.config.refresh_token_secret, 1_296_000).unwrap();
    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), &format!("jwt={orphan}"))
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.message(), "Invalid refresh token");
}

#[tokio::test]
async fn rotated_out_token_is_rejected_on_replay() {
    let app = TestApp::new().await;
    let (_, first_cookie) = app
        .register_user("Slate", "slate@example.com", "password123")
        .await;

    next_second().await;

    // first refresh rotates: new cookie issued, old value now dead
    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), &first_cookie)
        .await;
    assert_eq!(res.status, 200);
    let second_cookie = res.refresh_cookie().unwrap();
    assert_ne!(first_cookie, second_cookie);

    // replaying the first cookie is a theft signal
    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), &first_cookie)
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.message(), "Invalid refresh token");

    // the rotated-in cookie still works
    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), &second_cookie)
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn only_latest_login_holds_a_live_token() {
    let app = TestApp::new().await;
    let (_, first_cookie) = app
        .register_user("Flint", "flint@example.com", "password123")
        .await;

    next_second().await;

    let (_, second_cookie) = app.login("flint@example.com", "password123").await;
    assert_ne!(first_cookie, second_cookie);

    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), &first_cookie)
        .await;
    assert_eq!(res.status, 403);

    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), &second_cookie)
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn logout_revokes_the_stored_token() {
    let app = TestApp::new().await;
    let (_, cookie) = app
        .register_user("Onyx", "onyx@example.com", "password123")
        .await;

    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/logout"), &cookie)
        .await;
    assert_eq!(res.status, 200);
    assert!(res.is_success());

    // cookie is cleared with Max-Age=0
    let raw = res.refresh_cookie_raw().unwrap();
    assert!(raw.starts_with("jwt=;"));
    assert!(raw.contains("Max-Age=0"));

    // the revoked token can no longer refresh, expiry notwithstanding
    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/refresh"), &cookie)
        .await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn logout_without_cookie_is_a_204_noop() {
    let app = TestApp::new().await;

    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/logout"), "other=1")
        .await;

    assert_eq!(res.status, 204);
    assert!(res.body.is_empty());
}

#[tokio::test]
async fn logout_with_unknown_cookie_still_succeeds() {
    let app = TestApp::new().await;

    let res = app
        .client
        .post_with_cookie(&app.url("/api/auth/logout"), "jwt=nobody-has-this")
        .await;

    assert_eq!(res.status, 200);
    assert!(res.is_success());
}

#[tokio::test]
async fn logout_is_idempotent() {
    let app = TestApp::new().await;
    let (_, cookie) = app
        .register_user("Mica", "mica@example.com", "password123")
        .await;

    for _ in 0..2 {
        let res = app
            .client
            .post_with_cookie(&app.url("/api/auth/logout"), &cookie)
            .await;
        assert_eq!(res.status, 200);
    }
}
