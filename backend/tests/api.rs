use actix_web::{App, test, web};
use backend::pipeline::labels::LabelCatalog;
use backend::routes::{AppState, configure_routes};
use backend::upload::MAX_UPLOAD_BYTES;
use serde_json::Value;
use std::path::{Path, PathBuf};

const BOUNDARY: &str = "----brainapitestboundary";

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

fn sample_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(64, 64, image::Rgb([90, 90, 90]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

/// State for a server whose model artifact failed to load.
fn unloaded_state(upload_dir: PathBuf) -> web::Data<AppState> {
    web::Data::new(AppState {
        engine: None,
        catalog: LabelCatalog::builtin(),
        upload_dir,
    })
}

fn assert_no_leftover_uploads(dir: &Path) {
    let leftovers = std::fs::read_dir(dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0, "upload dir should be empty after the request");
}

macro_rules! init_app {
    ($state:expr, $static_dir:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .configure(|cfg| configure_routes(cfg, $static_dir.clone())),
        )
        .await
    };
}

#[actix_web::test]
async fn health_reports_model_not_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().to_string_lossy().to_string();
    let app = init_app!(unloaded_state(dir.path().join("uploads")), static_dir);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], false);
}

#[actix_web::test]
async fn predict_rejects_disallowed_extension() {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().to_string_lossy().to_string();
    let upload_dir = dir.path().join("uploads");
    let app = init_app!(unloaded_state(upload_dir.clone()), static_dir);

    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(("content-type", content_type()))
        .set_payload(multipart_body("image", "scan.gif", b"GIF89a"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("png, jpg, jpeg"));
    assert_no_leftover_uploads(&upload_dir);
}

#[actix_web::test]
async fn predict_without_image_field_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().to_string_lossy().to_string();
    let app = init_app!(unloaded_state(dir.path().join("uploads")), static_dir);

    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(("content-type", content_type()))
        .set_payload(multipart_body("file", "scan.png", &sample_png()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("no image part"));
}

#[actix_web::test]
async fn predict_with_empty_filename_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().to_string_lossy().to_string();
    let app = init_app!(unloaded_state(dir.path().join("uploads")), static_dir);

    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(("content-type", content_type()))
        .set_payload(multipart_body("image", "", &sample_png()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn predict_without_model_returns_500_before_inference() {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().to_string_lossy().to_string();
    let upload_dir = dir.path().join("uploads");
    let app = init_app!(unloaded_state(upload_dir.clone()), static_dir);

    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(("content-type", content_type()))
        .set_payload(multipart_body("image", "scan.png", &sample_png()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("model"));
    // the upload must never have been persisted
    assert_no_leftover_uploads(&upload_dir);
}

#[actix_web::test]
async fn predict_rejects_oversized_upload() {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().to_string_lossy().to_string();
    let upload_dir = dir.path().join("uploads");
    let app = init_app!(unloaded_state(upload_dir.clone()), static_dir);

    let oversized = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(("content-type", content_type()))
        .set_payload(multipart_body("image", "scan.jpg", &oversized))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert_no_leftover_uploads(&upload_dir);
}

#[actix_web::test]
async fn stats_distribution_serves_mock_counts() {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().to_string_lossy().to_string();
    let app = init_app!(unloaded_state(dir.path().join("uploads")), static_dir);

    let req = test::TestRequest::get()
        .uri("/stats/distribution")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["glioma"], 35);
    assert_eq!(body["meningioma"], 28);
    assert_eq!(body["notumor"], 22);
    assert_eq!(body["pituitary"], 15);
}

#[actix_web::test]
async fn stats_accuracy_serves_mock_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().to_string_lossy().to_string();
    let app = init_app!(unloaded_state(dir.path().join("uploads")), static_dir);

    let req = test::TestRequest::get().uri("/stats/accuracy").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["overall_accuracy"], 0.82);
    assert_eq!(body["class_accuracy"]["notumor"], 0.88);
}
