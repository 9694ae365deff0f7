use base64::{Engine as _, engine::general_purpose::STANDARD};
use facecheck::{
    DetectFaceResponse, DetectionEngine, DetectionParams, ErrorBody, FaceDetector, Region,
    messages::StatusResponse,
    server::{self, ServerConfig},
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use reqwest::{StatusCode, header};
use serde_json::{Value, json};
use std::{convert::Infallible, io::Cursor, sync::Arc};

/// Reports as many faces as the gray value of the top-left pixel;
/// 255 makes it panic.
struct PixelCountDetector;

impl FaceDetector for PixelCountDetector {
    type Error = Infallible;

    fn detect(
        &mut self,
        image: &GrayImage,
        _params: &DetectionParams,
    ) -> Result<Vec<Region>, Self::Error> {
        let count = image.get_pixel(0, 0).0[0];
        if count == 255 {
            panic!("detector blew up");
        }
        Ok((0..count as i32)
            .map(|i| Region::new(i * 64, 0, 64, 64))
            .collect())
    }
}

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(ServerConfig {
            max_body_bytes: 16 * 1024 * 1024,
        })
        .await
    }

    async fn start_with(config: ServerConfig) -> Self {
        let engine = DetectionEngine::spawn(DetectionParams::default(), || {
            Ok::<_, Infallible>(PixelCountDetector)
        })
        .unwrap();
        let app = server::router(Arc::new(engine), &config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    async fn detect(&self, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/detect_face", self.base))
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

fn png_data_url(image: DynamicImage) -> String {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(buf.into_inner()))
}

/// A uniform gray image that the stub detector reads as `faces` faces.
fn image_with_faces(faces: u8) -> String {
    png_data_url(DynamicImage::ImageLuma8(GrayImage::from_pixel(
        64,
        64,
        Luma([faces]),
    )))
}

#[tokio::test]
async fn test_home_reports_running() {
    let server = TestServer::start().await;
    let response = server.client.get(&server.base).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_single_face() {
    let server = TestServer::start().await;
    let response = server.detect(json!({ "image": image_with_faces(1) })).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "success": true, "face_detected": true, "face_count": 1 })
    );
}

#[tokio::test]
async fn test_no_face() {
    let server = TestServer::start().await;
    let response = server.detect(json!({ "image": image_with_faces(0) })).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({
            "success": false,
            "error_type": "no_face",
            "message": "No face detected",
            "face_count": 0
        })
    );
}

#[tokio::test]
async fn test_multiple_faces_reports_true_count() {
    let server = TestServer::start().await;
    let response = server.detect(json!({ "image": image_with_faces(4) })).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({
            "success": false,
            "error_type": "multiple_faces",
            "message": "Multiple faces detected. Only one person allowed.",
            "face_count": 4
        })
    );
}

#[tokio::test]
async fn test_color_image_is_accepted() {
    // BT.601 luma of pure blue is 29, so the stub sees 29 faces
    let server = TestServer::start().await;
    let image = png_data_url(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        80,
        80,
        Rgb([0, 0, 255]),
    )));
    let response = server.detect(json!({ "image": image })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: DetectFaceResponse = response.json().await.unwrap();
    assert!(!body.success);
    assert_eq!(body.face_count, 29);
}

#[tokio::test]
async fn test_image_smaller_than_min_face_has_no_face() {
    let server = TestServer::start().await;
    let image = png_data_url(DynamicImage::ImageLuma8(GrayImage::from_pixel(
        32,
        32,
        Luma([1]),
    )));
    let response = server.detect(json!({ "image": image })).await;

    let body: DetectFaceResponse = response.json().await.unwrap();
    assert_eq!(body.face_count, 0);
    assert!(!body.success);
}

#[tokio::test]
async fn test_same_payload_same_answer() {
    let server = TestServer::start().await;
    let payload = json!({ "image": image_with_faces(1) });

    let first = server.detect(payload.clone()).await.json::<Value>().await.unwrap();
    let second = server.detect(payload).await.json::<Value>().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_image_is_bad_request() {
    let server = TestServer::start().await;
    let response = server.detect(json!({ "picture": image_with_faces(1) })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<ErrorBody>().await.unwrap().error,
        "No image provided"
    );
}

#[tokio::test]
async fn test_unparsable_body_is_bad_request() {
    let server = TestServer::start().await;

    for body in ["", "not json", "[1, 2, 3]", "{}"] {
        let response = server
            .client
            .post(format!("{}/detect_face", server.base))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(
            response.json::<ErrorBody>().await.unwrap().error,
            "No image provided"
        );
    }
}

#[tokio::test]
async fn test_malformed_base64_is_server_error() {
    let server = TestServer::start().await;
    let response = server
        .detect(json!({ "image": "data:image/png;base64,!!!notbase64!!!" }))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.json::<ErrorBody>().await.unwrap().error.is_empty());
}

#[tokio::test]
async fn test_decode_failures_are_server_errors() {
    let server = TestServer::start().await;
    let not_an_image = format!("data:image/png;base64,{}", STANDARD.encode(b"hello world"));

    for image in [json!("no separator here"), json!(not_an_image), json!(42)] {
        let response = server.detect(json!({ "image": image })).await;
        assert_eq!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "image {}",
            image
        );
        assert!(!response.json::<ErrorBody>().await.unwrap().error.is_empty());
    }
}

#[tokio::test]
async fn test_detector_panic_is_server_error_and_service_survives() {
    let server = TestServer::start().await;

    let response = server.detect(json!({ "image": image_with_faces(255) })).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json::<ErrorBody>().await.unwrap().error;
    assert!(error.contains("detector blew up"), "error {}", error);

    let response = server.detect(json!({ "image": image_with_faces(1) })).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_body_over_limit_is_rejected() {
    let server = TestServer::start_with(ServerConfig {
        max_body_bytes: 1024,
    })
    .await;
    let response = server
        .detect(json!({ "image": format!("data:,{}", "A".repeat(4096)) }))
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_cross_origin_requests_are_allowed() {
    let server = TestServer::start().await;

    let response = server
        .client
        .post(format!("{}/detect_face", server.base))
        .header(header::ORIGIN, "http://localhost:3000")
        .json(&json!({ "image": image_with_faces(1) }))
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let preflight = server
        .client
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/detect_face", server.base),
        )
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .send()
        .await
        .unwrap();
    assert!(preflight.status().is_success());
    assert_eq!(
        preflight.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_status_counts_detections() {
    let server = TestServer::start().await;
    server.detect(json!({ "image": image_with_faces(0) })).await;
    server.detect(json!({ "image": image_with_faces(2) })).await;
    server.detect(json!({ "image": image_with_faces(255) })).await;

    let status: StatusResponse = server
        .client
        .get(format!("{}/status", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status.status, "idle");
    assert_eq!(status.detections, 2);
    assert_eq!(status.failures, 1);
}
