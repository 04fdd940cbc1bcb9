//! Cross-family access tests: members only ever see their own family.
//!
//! Run with: `cargo test -p kinfolio-api --test tenant_isolation_test`

mod helpers;

use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};

#[tokio::test]
async fn test_other_family_content_reads_as_missing() {
    let app = setup_test_app().await;
    let science = app.subject("Science").await;
    let (_teacher, alice, _ben) = app.classroom().await;
    let post = app.create_post(&alice, &science, "Magnets", "published").await;
    let post_id = post["id"].as_str().unwrap();

    let outsider = app.teacher("Mr. Okafor").await;
    app.found_family(&outsider, "Okafor").await;

    for path in [
        format!("/posts/{}", post_id),
        format!("/profiles/{}", alice.profile_id),
        format!("/authors/{}/posts", alice.profile_id),
        format!("/authors/{}/heatmap", alice.profile_id),
    ] {
        let response = app
            .client()
            .get(&api_path(&path))
            .add_header("Authorization", outsider.bearer())
            .await;
        assert_eq!(response.status_code(), 404, "GET {}", path);
    }

    let comment = app
        .client()
        .post(&api_path(&format!("/posts/{}/comments", post_id)))
        .add_header("Authorization", outsider.bearer())
        .json(&json!({ "body": "Hello" }))
        .await;
    assert_eq!(comment.status_code(), 404);
}

#[tokio::test]
async fn test_member_without_family_gets_family_required() {
    let app = setup_test_app().await;
    let science = app.subject("Science").await;
    let (_teacher, alice, _ben) = app.classroom().await;
    let post = app.create_post(&alice, &science, "Magnets", "published").await;

    let loner = app.student("Loner").await;
    for path in [
        format!("/posts/{}", post["id"].as_str().unwrap()),
        format!("/profiles/{}", alice.profile_id),
        "/timeline".to_string(),
        "/announcements".to_string(),
    ] {
        let response = app
            .client()
            .get(&api_path(&path))
            .add_header("Authorization", loner.bearer())
            .await;
        assert_eq!(response.status_code(), 409, "GET {}", path);
        let data: Value = response.json();
        assert_eq!(data["code"], "FAMILY_REQUIRED");
    }
}

#[tokio::test]
async fn test_timeline_excludes_other_families() {
    let app = setup_test_app().await;
    let science = app.subject("Science").await;
    let (teacher, alice, _ben) = app.classroom().await;
    app.create_post(&alice, &science, "Ours", "published").await;

    let outsider = app.student("Zed").await;
    app.create_post(&outsider, &science, "Theirs", "published")
        .await;

    let response = app
        .client()
        .get(&api_path("/timeline"))
        .add_header("Authorization", teacher.bearer())
        .await;
    let page: Value = response.json();
    let posts = page["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Ours");
}

#[tokio::test]
async fn test_announcements_stay_in_family() {
    let app = setup_test_app().await;
    let (teacher, alice, _ben) = app.classroom().await;
    let outsider = app.teacher("Mr. Okafor").await;
    app.found_family(&outsider, "Okafor").await;

    let created = app
        .client()
        .post(&api_path("/announcements"))
        .add_header("Authorization", teacher.bearer())
        .json(&json!({ "title": "Field trip", "body": "Museum on Friday" }))
        .await;
    assert_eq!(created.status_code(), 201);

    let student_post = app
        .client()
        .post(&api_path("/announcements"))
        .add_header("Authorization", alice.bearer())
        .json(&json!({ "title": "Hi", "body": "Me too" }))
        .await;
    assert_eq!(student_post.status_code(), 403);

    let ours = app
        .client()
        .get(&api_path("/announcements"))
        .add_header("Authorization", alice.bearer())
        .await;
    let ours: Value = ours.json();
    assert_eq!(ours.as_array().unwrap().len(), 1);
    assert_eq!(ours[0]["title"], "Field trip");

    let theirs = app
        .client()
        .get(&api_path("/announcements"))
        .add_header("Authorization", outsider.bearer())
        .await;
    let theirs: Value = theirs.json();
    assert!(theirs.as_array().unwrap().is_empty());
}
