use std::time::Duration;

use chrono::Duration as TimeDelta;
use racewatch::services::CheckOutcome;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::helpers::{
    race_day_morning, spawn_app, HOLDING_PAGE, NOT_HOLDING_PAGE, PUSH_PATH, RACE_LIST_PATH,
    TARGET_USER_ID,
};

fn push_of(text: &str) -> serde_json::Value {
    serde_json::json!({
        "to": TARGET_USER_ID,
        "messages": [{"type": "text", "text": text}]
    })
}

#[tokio::test]
async fn held_race_is_notified_and_recorded() {
    let app = spawn_app().await;
    let now = race_day_morning();

    Mock::given(method("GET"))
        .and(path(RACE_LIST_PATH))
        .and(query_param("jcd", "22"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOLDING_PAGE))
        .expect(1)
        .mount(&app.race_site)
        .await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .and(header("Authorization", "Bearer test-channel-token"))
        .and(body_json(push_of("2025-05-03 の福岡競艇：開催あり 🎉")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&app.line_api)
        .await;

    let outcome = app.race_checker.check_and_notify_at(now).await;

    assert_eq!(outcome, CheckOutcome::Notified);
    assert_eq!(app.cache_content(), Some(format!("1,{}", now.timestamp())));
}

#[tokio::test]
async fn immediate_rerun_is_suppressed() {
    let app = spawn_app().await;
    let now = race_day_morning();

    Mock::given(method("GET"))
        .and(path(RACE_LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOLDING_PAGE))
        .expect(2)
        .mount(&app.race_site)
        .await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&app.line_api)
        .await;

    assert_eq!(
        app.race_checker.check_and_notify_at(now).await,
        CheckOutcome::Notified
    );
    let cached = app.cache_content();

    assert_eq!(
        app.race_checker.check_and_notify_at(now).await,
        CheckOutcome::Suppressed
    );
    assert_eq!(app.cache_content(), cached);
}

#[tokio::test]
async fn fetch_timeout_skips_everything() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(RACE_LIST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(HOLDING_PAGE)
                .set_delay(Duration::from_secs(2)),
        )
        .expect(4)
        .mount(&app.race_site)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.line_api)
        .await;

    let outcome = app.race_checker.check_and_notify_at(race_day_morning()).await;

    assert_eq!(outcome, CheckOutcome::FetchFailed);
    assert_eq!(app.cache_content(), None);
}

#[tokio::test]
async fn state_change_after_window_sends_not_held_message() {
    let app = spawn_app().await;
    let t0 = race_day_morning();
    let t1 = t0 + TimeDelta::seconds(2000);
    app.write_cache(&format!("1,{}", t0.timestamp()));

    Mock::given(method("GET"))
        .and(path(RACE_LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(NOT_HOLDING_PAGE))
        .expect(1)
        .mount(&app.race_site)
        .await;
    Mock::given(method("POST"))
        .and(path(PUSH_PATH))
        .and(body_json(push_of("2025-05-03 の福岡競艇：開催なし ❌")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&app.line_api)
        .await;

    let outcome = app.race_checker.check_and_notify_at(t1).await;

    assert_eq!(outcome, CheckOutcome::Notified);
    assert_eq!(app.cache_content(), Some(format!("0,{}", t1.timestamp())));
}

#[tokio::test]
async fn state_change_within_window_is_notified() {
    let app = spawn_app().await;
    let t0 = race_day_morning();
    let t1 = t0 + TimeDelta::seconds(60);
    app.write_cache(&format!("0,{}", t0.timestamp()));

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOLDING_PAGE))
        .mount(&app.race_site)
        .await;
    Mock::given(method("POST"))
        .and(body_json(push_of("2025-05-03 の福岡競艇：開催あり 🎉")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&app.line_api)
        .await;

    assert_eq!(
        app.race_checker.check_and_notify_at(t1).await,
        CheckOutcome::Notified
    );
    assert_eq!(app.cache_content(), Some(format!("1,{}", t1.timestamp())));
}

#[tokio::test]
async fn rejected_push_still_records_state() {
    let app = spawn_app().await;
    let now = race_day_morning();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOLDING_PAGE))
        .mount(&app.race_site)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"message": "The request body has 1 error(s)"})),
        )
        .expect(1)
        .mount(&app.line_api)
        .await;

    let outcome = app.race_checker.check_and_notify_at(now).await;

    assert_eq!(outcome, CheckOutcome::NotifyFailed);
    assert_eq!(app.cache_content(), Some(format!("1,{}", now.timestamp())));

    // The failed push is not retried inside the window
    assert_eq!(
        app.race_checker.check_and_notify_at(now).await,
        CheckOutcome::Suppressed
    );
}

#[tokio::test]
async fn malformed_cache_is_treated_as_absent() {
    let app = spawn_app().await;
    app.write_cache("not,a-record");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NOT_HOLDING_PAGE))
        .mount(&app.race_site)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&app.line_api)
        .await;

    let now = race_day_morning();

    assert_eq!(
        app.race_checker.check_and_notify_at(now).await,
        CheckOutcome::Notified
    );
    assert_eq!(app.cache_content(), Some(format!("0,{}", now.timestamp())));
}
