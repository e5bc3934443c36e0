mod common;

use axum::http::StatusCode;
use backend_blog::AppState;
use common::{flash, location, spawn_app_with};

#[tokio::test]
async fn seeding_fills_an_empty_store_once() -> anyhow::Result<()> {
    let app = spawn_app_with(|config| config.seed_posts = true).await;

    let posts = app.state.posts_service.get_posts().await?;
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|post| post.user_id.is_none()));
    assert!(posts.iter().all(|post| post.image_file.is_none()));

    // A restart against the same store adds nothing.
    let restarted = AppState::init(app.state.config.clone()).await?;
    assert_eq!(restarted.posts_service.get_posts().await?.len(), 2);

    let res = app.get("/", None).await;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn seeded_posts_are_editable_by_admin_only() -> anyhow::Result<()> {
    let app = spawn_app_with(|config| config.seed_posts = true).await;
    let admin = app.login_as("root").await;
    let bob = app.login_as("bob").await;

    let posts = app.state.posts_service.get_posts().await?;
    let (first, second) = (posts[0].id, posts[1].id);

    let res = app
        .post_multipart(
            &format!("/post/{}/edit", first),
            &[("title", "Edited welcome"), ("content", "updated")],
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(location(&res), format!("/post/{}", first));
    assert_eq!(
        app.state.posts_service.get_post(first).await?.title,
        "Edited welcome"
    );

    let before = app.state.posts_service.get_post(second).await?;
    let res = app
        .post_multipart(
            &format!("/post/{}/edit", second),
            &[("title", "Taken over"), ("content", "changed")],
            None,
            Some(&bob),
        )
        .await;
    assert_eq!(location(&res), format!("/post/{}", second));
    assert_eq!(
        flash(&res).as_deref(),
        Some("You are not allowed to modify this post.")
    );

    let res = app
        .post_form(&format!("/post/{}/delete", second), "", Some(&bob))
        .await;
    assert_eq!(location(&res), format!("/post/{}", second));
    assert_eq!(app.state.posts_service.get_post(second).await?, before);

    Ok(())
}
