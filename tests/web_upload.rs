use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use image::{ImageFormat, Rgb, RgbImage};
use sat_collage::collage::CollageOptions;
use sat_collage::config::WebConfig;
use sat_collage::test_image_gen::disc_image;
use sat_collage::web::{WRONG_COUNT_MESSAGE, router};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "collage-test-boundary";

enum Part {
    File { file_name: String, data: Vec<u8> },
    Text { name: &'static str, value: &'static str },
}

fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn image_part(index: usize) -> Part {
    let tint = Rgb([40 * index as u8 + 20, 100, 180]);
    Part::File {
        file_name: format!("sat_2024-03-01_14{index}059.png"),
        data: png_bytes(&disc_image(64, 48, tint)),
    }
}

fn metadata_parts() -> Vec<Part> {
    vec![
        Part::Text { name: "sat_model", value: "Meteor-M2" },
        Part::Text { name: "orbit", value: "polar" },
    ]
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { file_name, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"images\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}").as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn test_config() -> (TempDir, WebConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = WebConfig {
        upload_dir: dir.path().join("uploads"),
        result_dir: dir.path().join("results"),
        collage: CollageOptions {
            font_name: String::new(),
            ..CollageOptions::default()
        },
        ..WebConfig::default()
    };
    config.ensure_dirs().unwrap();
    (dir, config)
}

async fn post_upload(config: &WebConfig, parts: &[Part]) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    router(config.clone()).oneshot(request).await.unwrap()
}

async fn get(config: &WebConfig, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router(config.clone()).oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn four_images_redirect_to_result() {
    let (_dir, config) = test_config();
    let mut parts: Vec<Part> = (0..4).map(image_part).collect();
    parts.extend(metadata_parts());

    let response = post_upload(&config, &parts).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/result");

    let saved = image::open(config.result_path()).unwrap();
    assert_eq!((saved.width(), saved.height()), (64, 48));
    assert_eq!(fs::read_dir(&config.upload_dir).unwrap().count(), 4);

    let page = get(&config, "/result").await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("/results/collage.jpg"));

    let served = get(&config, "/results/collage.jpg").await;
    assert_eq!(served.status(), StatusCode::OK);
}

#[tokio::test]
async fn three_images_are_a_client_error() {
    let (_dir, config) = test_config();
    let mut parts: Vec<Part> = (0..3).map(image_part).collect();
    parts.extend(metadata_parts());

    let response = post_upload(&config, &parts).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, WRONG_COUNT_MESSAGE);
    assert_eq!(fs::read_dir(&config.upload_dir).unwrap().count(), 0);
    assert!(!config.result_path().exists());
}

#[tokio::test]
async fn five_images_are_a_client_error() {
    let (_dir, config) = test_config();
    let parts: Vec<Part> = (0..5).map(image_part).collect();

    let response = post_upload(&config, &parts).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreadable_image_is_a_server_error() {
    let (_dir, config) = test_config();
    let mut parts: Vec<Part> = (0..3).map(image_part).collect();
    parts.push(Part::File {
        file_name: "corrupt.png".to_string(),
        data: b"this is not a png".to_vec(),
    });
    parts.extend(metadata_parts());

    let response = post_upload(&config, &parts).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_text(response).await;
    assert!(text.starts_with("Processing error:"), "unexpected body: {text}");
    assert!(text.contains("corrupt.png"));
}

#[tokio::test]
async fn non_ascii_file_names_are_processed() {
    let (_dir, config) = test_config();
    let mut parts: Vec<Part> = (0..4)
        .map(|index| Part::File {
            file_name: "żółć.png".to_string(),
            data: png_bytes(&disc_image(64, 48, Rgb([30 * index as u8, 120, 200]))),
        })
        .collect();
    parts.extend(metadata_parts());

    let response = post_upload(&config, &parts).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let mut stored: Vec<String> = fs::read_dir(&config.upload_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    stored.sort();
    assert_eq!(stored, ["0_upload.png", "1_upload.png", "2_upload.png", "3_upload.png"]);
    assert!(config.result_path().exists());
}

#[tokio::test]
async fn oversized_body_is_rejected_as_too_large() {
    let (_dir, mut config) = test_config();
    config.body_limit = 1024;
    let parts: Vec<Part> = (0..4)
        .map(|index| Part::File {
            file_name: format!("big_{index}.png"),
            data: (0..4096u32).map(|i| (i * 31 % 251) as u8).collect(),
        })
        .collect();

    let response = post_upload(&config, &parts).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(fs::read_dir(&config.upload_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn pages_are_served() {
    let (_dir, config) = test_config();

    let index = get(&config, "/").await;
    assert_eq!(index.status(), StatusCode::OK);
    assert!(body_text(index).await.contains("href=\"/upload\""));

    let form = get(&config, "/upload").await;
    assert_eq!(form.status(), StatusCode::OK);
    let html = body_text(form).await;
    assert!(html.contains("name=\"images\""));
    assert!(html.contains("name=\"sat_model\""));
    assert!(html.contains("name=\"orbit\""));
}
