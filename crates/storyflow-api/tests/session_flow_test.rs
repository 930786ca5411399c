//! End-to-end flows over the demo catalog.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_play_story_to_completion_and_unlock_follow_up() {
    let app = common::build_test_app();
    let (session_id, player_id) = common::open_session(app.clone()).await;
    let base = format!("/api/v1/sessions/{session_id}");

    // Hub: the second story waits for the first.
    let (status, hub) = common::get_json(app.clone(), &format!("{base}/hub")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hub.as_array().unwrap().len(), 3);
    assert_eq!(hub[1]["lock"]["required_story_id"], 1);

    // Enter the first story.
    let (_, json) = common::post_json(app.clone(), &format!("{base}/story"), &json!({ "story_id": 1 })).await;
    assert_eq!(json["transition"]["outcome"], "entered_step");
    assert_eq!(json["transition"]["step_id"], 100);
    assert_eq!(json["session"]["step"]["character"], "Lucía");

    // Meeting the character grants her token.
    let (_, json) = common::post_json(app.clone(), &format!("{base}/advance"), &json!({})).await;
    assert_eq!(json["transition"]["step_id"], 101);
    assert_eq!(json["session"]["stats"]["known_characters"], 1);
    assert_eq!(json["session"]["stats"]["inventory_size"], 1);

    // Taking the rewarded option.
    let (_, json) = common::post_json(
        app.clone(),
        &format!("{base}/advance"),
        &json!({ "target_step_id": 103 }),
    )
    .await;
    assert_eq!(json["transition"]["step_id"], 103);
    assert_eq!(json["session"]["stats"]["xp_total"], 30);

    // Final step without a follow-up story.
    let (_, json) = common::post_json(app.clone(), &format!("{base}/advance"), &json!({})).await;
    assert_eq!(json["transition"]["outcome"], "story_complete");
    assert_eq!(json["session"]["phase"], "story_complete");
    assert_eq!(json["session"]["stats"]["stories_completed"], 1);

    // Back at the hub the follow-up is open.
    let (_, json) = common::post_json(app.clone(), &format!("{base}/hub"), &json!({})).await;
    assert_eq!(json["transition"]["outcome"], "returned_to_hub");
    let (_, hub) = common::get_json(app.clone(), &format!("{base}/hub")).await;
    assert_eq!(hub[0]["completed"], true);
    assert!(hub[1]["lock"].is_null());

    let (status, dashboard) =
        common::get_json(app, &format!("/api/v1/players/{player_id}/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["stories_completed"], 1);
    assert_eq!(dashboard["inventory_size"], 2);
}

#[tokio::test]
async fn test_final_step_chains_into_next_story() {
    let app = common::build_test_app();
    let (session_id, _) = common::open_session(app.clone()).await;
    let base = format!("/api/v1/sessions/{session_id}");

    common::post_json(app.clone(), &format!("{base}/story"), &json!({ "story_id": 1 })).await;
    common::post_json(app.clone(), &format!("{base}/advance"), &json!({})).await;
    common::post_json(
        app.clone(),
        &format!("{base}/advance"),
        &json!({ "target_step_id": 102 }),
    )
    .await;
    let (status, json) = common::post_json(app, &format!("{base}/advance"), &json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transition"]["outcome"], "entered_step");
    assert_eq!(json["transition"]["story_id"], 2);
    assert_eq!(json["transition"]["step_id"], 200);
    assert_eq!(json["session"]["story"]["title"], "Under the Arches");
    assert_eq!(json["session"]["visited_this_session"], json!([1, 2]));
}

#[tokio::test]
async fn test_scene_gate_blocks_advance_until_explored() {
    let app = common::build_test_app();
    let (session_id, _) = common::open_session(app.clone()).await;
    let base = format!("/api/v1/sessions/{session_id}");

    common::post_json(app.clone(), &format!("{base}/story"), &json!({ "story_id": 3 })).await;
    let (_, blocked) = common::post_json(app.clone(), &format!("{base}/advance"), &json!({})).await;
    common::post_json(app.clone(), &format!("{base}/overlay/dismiss"), &json!({})).await;
    common::post_json(
        app.clone(),
        &format!("{base}/hotspots"),
        &json!({ "mesh_name": "lantern_stall" }),
    )
    .await;
    let (_, last) = common::post_json(
        app.clone(),
        &format!("{base}/hotspots"),
        &json!({ "mesh_name": "storyteller" }),
    )
    .await;
    let (_, advanced) = common::post_json(app, &format!("{base}/advance"), &json!({})).await;

    assert_eq!(blocked["transition"]["reason"], "gate_closed");
    assert_eq!(last["discovery"]["all_discovered"], true);
    assert_eq!(last["session"]["gate"], "open");
    assert_eq!(advanced["transition"]["step_id"], 301);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(
        app,
        &format!("/api/v1/sessions/{}", uuid::Uuid::new_v4()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}
