mod helpers;

use helpers::spawn_app;
use serde_json::{json, Value};

async fn write_media(app: &helpers::TestApp, subdir: &str, filename: &str) {
    let dir = app.data_dir.path().join(subdir);
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join(filename), b"bytes").await.unwrap();
}

#[tokio::test]
async fn list_images_reflects_filesystem() {
    let app = spawn_app().await;

    let body: Value = app.server.get("/api/images").await.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["images"].as_array().unwrap().len(), 0);

    write_media(&app, "images", "a.png").await;
    write_media(&app, "images", "ignored.txt").await;

    let body: Value = app.server.get("/api/images").await.json();
    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["filename"], "a.png");
    assert_eq!(images[0]["url"], "/media/images/a.png");
}

#[tokio::test]
async fn delete_image_also_drops_journal_record() {
    let app = spawn_app().await;

    write_media(&app, "images", "a.png").await;
    app.server
        .post("/api/image-data")
        .json(&json!({
            "filename": "a.png",
            "localFilename": "a.png",
            "createdAt": "2026-01-01T00:00:00Z"
        }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .delete("/api/images")
        .add_query_param("filename", "a.png")
        .await;
    response.assert_status_ok();

    assert!(!app.data_dir.path().join("images/a.png").exists());
    let body: Value = app.server.get("/api/image-data").await.json();
    assert_eq!(body["images"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn delete_missing_image_is_not_found() {
    let app = spawn_app().await;

    let response = app
        .server
        .delete("/api/images")
        .add_query_param("filename", "nope.png")
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn delete_without_filename_is_invalid() {
    let app = spawn_app().await;

    let response = app.server.delete("/api/images").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn clear_all_empties_files_and_journal() {
    let app = spawn_app().await;

    write_media(&app, "videos", "a.mp4").await;
    write_media(&app, "videos", "b.gif").await;
    app.server
        .post("/api/video-data")
        .json(&json!({
            "filename": "a.mp4",
            "createdAt": "2026-01-01T00:00:00Z"
        }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .delete("/api/videos")
        .add_query_param("clearAll", "true")
        .await;
    response.assert_status_ok();

    let body: Value = app.server.get("/api/videos").await.json();
    assert_eq!(body["videos"].as_array().unwrap().len(), 0);
    let body: Value = app.server.get("/api/video-data").await.json();
    assert_eq!(body["videos"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn generate_requires_prompt() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/generate/image")
        .json(&json!({ "prompt": "   " }))
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn generate_with_engine_offline_is_bad_gateway() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/generate/image")
        .json(&json!({ "prompt": "a red fox" }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_eq!(body["code"], "ENGINE_UNAVAILABLE");
    assert_eq!(body["recoverable"], true);
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let app = spawn_app().await;

    let response = app
        .server
        .get(&format!("/api/jobs/{}", uuid::Uuid::new_v4()))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn chat_falls_back_when_runtime_offline() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/chat")
        .json(&json!({ "message": "hello there" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    // Canned greeting reply, not an error
    assert!(body["response"].as_str().unwrap().contains("Nice to meet you"));
}

#[tokio::test]
async fn models_fall_back_when_runtime_offline() {
    let app = spawn_app().await;

    let body: Value = app.server.get("/api/models").await.json();
    assert_eq!(body["success"], false);
    let models: Vec<&str> = body["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap())
        .collect();
    assert_eq!(models, vec!["gemma", "llama2", "mistral", "codellama"]);
}

#[tokio::test]
async fn health_reports_unreachable_services() {
    let app = spawn_app().await;

    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["engine"], "unreachable");
    assert_eq!(body["runtime"], "unreachable");
}
