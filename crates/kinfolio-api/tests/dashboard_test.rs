//! Teacher dashboard tests.
//!
//! Run with: `cargo test -p kinfolio-api --test dashboard_test`

mod helpers;

use helpers::{api_path, setup_test_app};
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
async fn test_dashboard_is_teacher_only() {
    let app = setup_test_app().await;
    let (_teacher, alice, _ben) = app.classroom().await;

    let response = app
        .client()
        .get(&api_path("/dashboard"))
        .add_header("Authorization", alice.bearer())
        .await;

    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_dashboard_totals_and_distribution() {
    let app = setup_test_app().await;
    let math = app.subject("Math").await;
    let art = app.subject("Art").await;
    let (teacher, alice, ben) = app.classroom().await;

    app.create_post(&alice, &math, "Fractions", "published").await;
    app.create_post(&alice, &math, "Decimals", "draft").await;
    app.create_post(&ben, &math, "Geometry", "published").await;
    app.create_post(&ben, &art, "Clay pots", "published").await;
    app.create_post(&teacher, &art, "Lesson plan", "published")
        .await;

    let response = app
        .client()
        .get(&api_path("/dashboard"))
        .add_header("Authorization", teacher.bearer())
        .await;

    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert_eq!(data["total_posts"], 4);
    assert_eq!(data["students"].as_array().unwrap().len(), 2);
    assert!(data["selected_student"].is_null());

    let shares = data["subject_distribution"].as_array().unwrap();
    assert_eq!(shares[0]["subject"], "Art");
    assert_eq!(shares[0]["count"], 1);
    assert_eq!(shares[0]["percentage"], 25.0);
    assert_eq!(shares[1]["subject"], "Math");
    assert_eq!(shares[1]["count"], 3);
    assert_eq!(shares[1]["percentage"], 75.0);

    assert_eq!(data["heatmap"]["summary"]["total_posts_last_year"], 4);
    let sections = data["subject_posts"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
}

#[tokio::test]
async fn test_dashboard_filters_by_student_and_query() {
    let app = setup_test_app().await;
    let math = app.subject("Math").await;
    let (teacher, alice, ben) = app.classroom().await;

    app.create_post(&alice, &math, "Fractions", "published").await;
    app.create_post(&alice, &math, "Long division", "published")
        .await;
    app.create_post(&ben, &math, "Fraction games", "published")
        .await;

    let response = app
        .client()
        .get(&api_path("/dashboard"))
        .add_query_param("student", alice.profile_id)
        .add_query_param("q", "  FRACTION ")
        .add_header("Authorization", teacher.bearer())
        .await;

    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert_eq!(data["total_posts"], 1);
    assert_eq!(data["search_query"], "FRACTION");
    assert_eq!(data["selected_student"]["id"], alice.profile_id.to_string());
    assert_eq!(data["subject_posts"][0]["posts"][0]["title"], "Fractions");
}

#[tokio::test]
async fn test_dashboard_blank_query_is_ignored() {
    let app = setup_test_app().await;
    let math = app.subject("Math").await;
    let (teacher, alice, _ben) = app.classroom().await;
    app.create_post(&alice, &math, "Fractions", "published").await;

    let response = app
        .client()
        .get(&api_path("/dashboard"))
        .add_query_param("q", "   ")
        .add_header("Authorization", teacher.bearer())
        .await;

    let data: Value = response.json();
    assert!(data["search_query"].is_null());
    assert_eq!(data["total_posts"], 1);
}

#[tokio::test]
async fn test_dashboard_unknown_student() {
    let app = setup_test_app().await;
    let (teacher, _alice, _ben) = app.classroom().await;

    let response = app
        .client()
        .get(&api_path("/dashboard"))
        .add_query_param("student", Uuid::new_v4())
        .add_header("Authorization", teacher.bearer())
        .await;

    assert_eq!(response.status_code(), 404);
    let data: Value = response.json();
    assert_eq!(data["error"], "Student not found");
}
