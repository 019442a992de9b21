// tests/api_tests.rs

mod common;

use common::{post_counters, seed_post, seed_user, spawn_app, token};

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let Some((address, _pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn add_comment_requires_a_token() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let author = seed_user(&pool, "author").await;
    let post_id = seed_post(&pool, author).await;

    let response = client
        .post(format!("{}/add-comment", address))
        .json(&serde_json::json!({ "post_id": post_id, "comment": "hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn add_comment_rejects_empty_text() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let author = seed_user(&pool, "author").await;
    let commenter = seed_user(&pool, "commenter").await;
    let post_id = seed_post(&pool, author).await;

    let response = client
        .post(format!("{}/add-comment", address))
        .header("Authorization", format!("Bearer {}", token(commenter)))
        .json(&serde_json::json!({ "post_id": post_id, "comment": "   " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("publish a comment"));
}

#[tokio::test]
async fn comment_counters_follow_the_cascade() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let author = seed_user(&pool, "author").await;
    let commenter = seed_user(&pool, "commenter").await;
    let post_id = seed_post(&pool, author).await;

    // Top-level comment.
    let response = client
        .post(format!("{}/add-comment", address))
        .header("Authorization", format!("Bearer {}", token(commenter)))
        .json(&serde_json::json!({ "post_id": post_id, "comment": "First!" }))
        .send()
        .await
        .expect("add-comment failed");
    assert_eq!(response.status().as_u16(), 200);
    let c1: serde_json::Value = response.json().await.unwrap();
    let c1_id = c1["id"].as_i64().unwrap();
    assert_eq!(post_counters(&pool, post_id).await, (1, 1));

    // Reply from the post author.
    let response = client
        .post(format!("{}/add-comment", address))
        .header("Authorization", format!("Bearer {}", token(author)))
        .json(&serde_json::json!({
            "post_id": post_id,
            "comment": "Welcome!",
            "replying_to": c1_id,
        }))
        .send()
        .await
        .expect("add-comment (reply) failed");
    assert_eq!(response.status().as_u16(), 200);
    let r1: serde_json::Value = response.json().await.unwrap();
    let r1_id = r1["id"].as_i64().unwrap();

    // Replies bump the total but not the parent count.
    assert_eq!(post_counters(&pool, post_id).await, (2, 1));

    // The reply is recorded in the parent's children list.
    let children = sqlx::query_scalar::<_, Vec<i64>>("SELECT children FROM comments WHERE id = $1")
        .bind(c1_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(children, vec![r1_id]);

    // Deleting the root cascades through the reply.
    let response = client
        .post(format!("{}/delete-comment", address))
        .header("Authorization", format!("Bearer {}", token(commenter)))
        .json(&serde_json::json!({ "comment_id": c1_id }))
        .send()
        .await
        .expect("delete-comment failed");
    assert_eq!(response.status().as_u16(), 200);

    assert_eq!(post_counters(&pool, post_id).await, (0, 0));

    let remaining =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);

    // Notification cleanup rode along with each deleted node.
    let orphaned = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE comment_id = $1 OR comment_id = $2",
    )
    .bind(c1_id)
    .bind(r1_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(orphaned, 0);
}

#[tokio::test]
async fn only_comment_author_or_post_author_may_delete() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let author = seed_user(&pool, "author").await;
    let commenter = seed_user(&pool, "commenter").await;
    let bystander = seed_user(&pool, "bystander").await;
    let post_id = seed_post(&pool, author).await;

    let response = client
        .post(format!("{}/add-comment", address))
        .header("Authorization", format!("Bearer {}", token(commenter)))
        .json(&serde_json::json!({ "post_id": post_id, "comment": "mine" }))
        .send()
        .await
        .expect("add-comment failed");
    let comment_id = response.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap();

    // A third user is refused.
    let response = client
        .post(format!("{}/delete-comment", address))
        .header("Authorization", format!("Bearer {}", token(bystander)))
        .json(&serde_json::json!({ "comment_id": comment_id }))
        .send()
        .await
        .expect("delete-comment failed");
    assert_eq!(response.status().as_u16(), 403);

    // The post author may moderate comments on their own post.
    let response = client
        .post(format!("{}/delete-comment", address))
        .header("Authorization", format!("Bearer {}", token(author)))
        .json(&serde_json::json!({ "comment_id": comment_id }))
        .send()
        .await
        .expect("delete-comment failed");
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn replies_page_newest_first_with_skip() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let author = seed_user(&pool, "author").await;
    let commenter = seed_user(&pool, "commenter").await;
    let post_id = seed_post(&pool, author).await;

    let response = client
        .post(format!("{}/add-comment", address))
        .header("Authorization", format!("Bearer {}", token(commenter)))
        .json(&serde_json::json!({ "post_id": post_id, "comment": "thread root" }))
        .send()
        .await
        .expect("add-comment failed");
    let root_id = response.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap();

    let mut reply_ids = Vec::new();
    for i in 0..7 {
        let response = client
            .post(format!("{}/add-comment", address))
            .header("Authorization", format!("Bearer {}", token(author)))
            .json(&serde_json::json!({
                "post_id": post_id,
                "comment": format!("reply {}", i),
                "replying_to": root_id,
            }))
            .send()
            .await
            .expect("add-comment (reply) failed");
        reply_ids.push(
            response.json::<serde_json::Value>().await.unwrap()["id"]
                .as_i64()
                .unwrap(),
        );
    }

    // First page: five newest replies.
    let response = client
        .post(format!("{}/get-replies", address))
        .json(&serde_json::json!({ "comment_id": root_id, "skip": 0 }))
        .send()
        .await
        .expect("get-replies failed");
    let body: serde_json::Value = response.json().await.unwrap();
    let first_page: Vec<i64> = body["replies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(first_page.len(), 5);
    assert_eq!(first_page[0], *reply_ids.last().unwrap());

    // Second page picks up where the first stopped.
    let response = client
        .post(format!("{}/get-replies", address))
        .json(&serde_json::json!({ "comment_id": root_id, "skip": 5 }))
        .send()
        .await
        .expect("get-replies failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["replies"].as_array().unwrap().len(), 2);
}
