// tests/notification_tests.rs

mod common;

use common::{like_count, seed_post, seed_user, spawn_app, token};

#[tokio::test]
async fn like_toggle_round_trip() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let author = seed_user(&pool, "author").await;
    let reader = seed_user(&pool, "reader").await;
    let post_id = seed_post(&pool, author).await;

    // Like.
    let response = client
        .post(format!("{}/like-blog", address))
        .header("Authorization", format!("Bearer {}", token(reader)))
        .json(&serde_json::json!({ "post_id": post_id, "isLikedByUser": false }))
        .send()
        .await
        .expect("like-blog failed");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["liked_by_user"], true);
    assert_eq!(like_count(&pool, post_id).await, 1);

    // A second like from the same user must not double-count.
    let response = client
        .post(format!("{}/like-blog", address))
        .header("Authorization", format!("Bearer {}", token(reader)))
        .json(&serde_json::json!({ "post_id": post_id, "isLikedByUser": false }))
        .send()
        .await
        .expect("like-blog failed");
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(like_count(&pool, post_id).await, 1);

    let response = client
        .post(format!("{}/isliked-by-user", address))
        .header("Authorization", format!("Bearer {}", token(reader)))
        .json(&serde_json::json!({ "post_id": post_id }))
        .send()
        .await
        .expect("isliked-by-user failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["result"], true);

    // Unlike removes the notification and the count.
    let response = client
        .post(format!("{}/like-blog", address))
        .header("Authorization", format!("Bearer {}", token(reader)))
        .json(&serde_json::json!({ "post_id": post_id, "isLikedByUser": true }))
        .send()
        .await
        .expect("like-blog failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["liked_by_user"], false);
    assert_eq!(like_count(&pool, post_id).await, 0);

    let response = client
        .post(format!("{}/isliked-by-user", address))
        .header("Authorization", format!("Bearer {}", token(reader)))
        .json(&serde_json::json!({ "post_id": post_id }))
        .send()
        .await
        .expect("isliked-by-user failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["result"], false);

    let remaining = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE post_id = $1 AND type = 'like'",
    )
    .bind(post_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn listing_notifications_marks_the_page_seen() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let author = seed_user(&pool, "author").await;
    let commenter = seed_user(&pool, "commenter").await;
    let post_id = seed_post(&pool, author).await;

    client
        .post(format!("{}/add-comment", address))
        .header("Authorization", format!("Bearer {}", token(commenter)))
        .json(&serde_json::json!({ "post_id": post_id, "comment": "nice post" }))
        .send()
        .await
        .expect("add-comment failed");

    // Something unseen is waiting for the post author.
    let response = client
        .get(format!("{}/new-notification", address))
        .header("Authorization", format!("Bearer {}", token(author)))
        .send()
        .await
        .expect("new-notification failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["new_notification_available"], true);

    // The list is populated for rendering.
    let response = client
        .post(format!("{}/notifications", address))
        .header("Authorization", format!("Bearer {}", token(author)))
        .json(&serde_json::json!({ "page": 1, "filter": "all" }))
        .send()
        .await
        .expect("notifications failed");
    let body: serde_json::Value = response.json().await.unwrap();
    let items = body["notifications"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "comment");
    assert_eq!(items[0]["blog"]["title"], "Test post");
    assert_eq!(items[0]["comment"]["comment"], "nice post");

    let commenter_username =
        sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = $1")
            .bind(commenter)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(items[0]["user"]["username"], commenter_username.as_str());

    // Serving the page flipped the seen flag.
    let response = client
        .get(format!("{}/new-notification", address))
        .header("Authorization", format!("Bearer {}", token(author)))
        .send()
        .await
        .expect("new-notification failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["new_notification_available"], false);

    // Counts follow the same filter.
    let response = client
        .post(format!("{}/all-notifications-count", address))
        .header("Authorization", format!("Bearer {}", token(author)))
        .json(&serde_json::json!({ "filter": "comment" }))
        .send()
        .await
        .expect("all-notifications-count failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["totalDocs"], 1);

    let response = client
        .post(format!("{}/all-notifications-count", address))
        .header("Authorization", format!("Bearer {}", token(author)))
        .json(&serde_json::json!({ "filter": "like" }))
        .send()
        .await
        .expect("all-notifications-count failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["totalDocs"], 0);
}

#[tokio::test]
async fn reply_from_a_notification_attaches_and_detaches_the_reply_ref() {
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
        .json(&serde_json::json!({ "post_id": post_id, "comment": "question?" }))
        .send()
        .await
        .expect("add-comment failed");
    let comment_id = response.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap();

    let notification_id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM notifications WHERE comment_id = $1 AND type = 'comment'",
    )
    .bind(comment_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    // The author answers straight from the notification card.
    let response = client
        .post(format!("{}/add-comment", address))
        .header("Authorization", format!("Bearer {}", token(author)))
        .json(&serde_json::json!({
            "post_id": post_id,
            "comment": "answer!",
            "replying_to": comment_id,
            "notification_id": notification_id,
        }))
        .send()
        .await
        .expect("add-comment (reply) failed");
    let reply_id = response.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap();

    let attached = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT reply_id FROM notifications WHERE id = $1",
    )
    .bind(notification_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(attached, Some(reply_id));

    // The reply notification lands with the parent comment's author.
    let recipient = sqlx::query_scalar::<_, i64>(
        "SELECT notification_for FROM notifications WHERE comment_id = $1 AND type = 'reply'",
    )
    .bind(reply_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(recipient, commenter);

    // Deleting the reply unsets the attachment instead of orphaning it.
    let response = client
        .post(format!("{}/delete-comment", address))
        .header("Authorization", format!("Bearer {}", token(author)))
        .json(&serde_json::json!({ "comment_id": reply_id }))
        .send()
        .await
        .expect("delete-comment failed");
    assert_eq!(response.status().as_u16(), 200);

    let attached = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT reply_id FROM notifications WHERE id = $1",
    )
    .bind(notification_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(attached, None);
}
