//! Presentation and portfolio tests.
//!
//! Run with: `cargo test -p kinfolio-api --test presentations_test`

mod helpers;

use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};

fn id_of(post: &Value) -> &str {
    post["id"].as_str().unwrap()
}

#[tokio::test]
async fn test_presentation_groups_posts_by_subject() {
    let app = setup_test_app().await;
    let science = app.subject("Science").await;
    let art = app.subject("Art").await;
    let (teacher, alice, _ben) = app.classroom().await;

    let magnets = app.create_post(&alice, &science, "Magnets", "published").await;
    let clay = app.create_post(&alice, &art, "Clay pots", "published").await;
    let circuits = app.create_post(&alice, &science, "Circuits", "published").await;

    let response = app
        .client()
        .post(&api_path("/presentations"))
        .add_header("Authorization", alice.bearer())
        .json(&json!({
            "kind": "portfolio",
            "title": "Spring term",
            "posts": [id_of(&circuits), id_of(&clay), id_of(&magnets)],
        }))
        .await;

    assert_eq!(response.status_code(), 201);
    let created: Value = response.json();
    assert_eq!(created["kind"], "portfolio");
    assert_eq!(created["author_id"], alice.profile_id.to_string());

    let response = app
        .client()
        .get(&api_path(&format!("/presentations/{}", id_of(&created))))
        .add_header("Authorization", teacher.bearer())
        .await;
    assert_eq!(response.status_code(), 200);
    let detail: Value = response.json();
    let sections = detail["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["subject"], "Art");
    assert_eq!(sections[1]["subject"], "Science");
    assert_eq!(sections[1]["posts"][0]["title"], "Circuits");
    assert_eq!(sections[1]["posts"][1]["title"], "Magnets");
}

#[tokio::test]
async fn test_presentation_rejects_foreign_and_duplicate_posts() {
    let app = setup_test_app().await;
    let science = app.subject("Science").await;
    let (_teacher, alice, ben) = app.classroom().await;
    let own = app.create_post(&alice, &science, "Magnets", "published").await;
    let bens = app.create_post(&ben, &science, "Circuits", "published").await;

    let foreign = app
        .client()
        .post(&api_path("/presentations"))
        .add_header("Authorization", alice.bearer())
        .json(&json!({ "title": "Mine", "posts": [id_of(&own), id_of(&bens)] }))
        .await;
    assert_eq!(foreign.status_code(), 400);

    let duplicate = app
        .client()
        .post(&api_path("/presentations"))
        .add_header("Authorization", alice.bearer())
        .json(&json!({ "title": "Mine", "posts": [id_of(&own), id_of(&own)] }))
        .await;
    assert_eq!(duplicate.status_code(), 400);
}

#[tokio::test]
async fn test_drafts_in_presentation_hidden_from_others() {
    let app = setup_test_app().await;
    let science = app.subject("Science").await;
    let (teacher, alice, _ben) = app.classroom().await;
    let published = app.create_post(&alice, &science, "Magnets", "published").await;
    let draft = app.create_post(&alice, &science, "Half done", "draft").await;

    let created = app
        .client()
        .post(&api_path("/presentations"))
        .add_header("Authorization", alice.bearer())
        .json(&json!({ "title": "Term", "posts": [id_of(&published), id_of(&draft)] }))
        .await;
    let created: Value = created.json();
    let path = api_path(&format!("/presentations/{}", id_of(&created)));

    let own: Value = app
        .client()
        .get(&path)
        .add_header("Authorization", alice.bearer())
        .await
        .json();
    assert_eq!(own["sections"][0]["posts"].as_array().unwrap().len(), 2);

    let other: Value = app
        .client()
        .get(&path)
        .add_header("Authorization", teacher.bearer())
        .await
        .json();
    assert_eq!(other["sections"][0]["posts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_presentation_update_and_delete_by_author_only() {
    let app = setup_test_app().await;
    let science = app.subject("Science").await;
    let (_teacher, alice, ben) = app.classroom().await;
    let post = app.create_post(&alice, &science, "Magnets", "published").await;

    let created = app
        .client()
        .post(&api_path("/presentations"))
        .add_header("Authorization", alice.bearer())
        .json(&json!({ "title": "Term", "posts": [id_of(&post)] }))
        .await;
    let created: Value = created.json();
    let path = api_path(&format!("/presentations/{}", id_of(&created)));
    let replacement = json!({ "title": "Renamed", "description": "Final", "posts": [] });

    let forbidden = app
        .client()
        .put(&path)
        .add_header("Authorization", ben.bearer())
        .json(&replacement)
        .await;
    assert_eq!(forbidden.status_code(), 403);

    let updated = app
        .client()
        .put(&path)
        .add_header("Authorization", alice.bearer())
        .json(&replacement)
        .await;
    assert_eq!(updated.status_code(), 200);
    let updated: Value = updated.json();
    assert_eq!(updated["title"], "Renamed");
    assert!(updated["sections"].as_array().unwrap().is_empty());

    let author_page: Value = app
        .client()
        .get(&api_path(&format!("/authors/{}/posts", alice.profile_id)))
        .add_header("Authorization", ben.bearer())
        .await
        .json();
    assert_eq!(author_page["presentations"][0]["title"], "Renamed");

    let forbidden = app
        .client()
        .delete(&path)
        .add_header("Authorization", ben.bearer())
        .await;
    assert_eq!(forbidden.status_code(), 403);

    let deleted = app
        .client()
        .delete(&path)
        .add_header("Authorization", alice.bearer())
        .await;
    assert_eq!(deleted.status_code(), 204);

    let gone = app
        .client()
        .get(&path)
        .add_header("Authorization", alice.bearer())
        .await;
    assert_eq!(gone.status_code(), 404);
}
