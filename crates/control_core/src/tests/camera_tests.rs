use std::sync::atomic::Ordering;

use super::*;
use crate::{
    source::gesture_channel,
    test_support::{FakeCamera, ScriptedBackend, ScriptedCamera},
};
use shared::protocol::PredictResponse;

fn prediction(gesture: &str, confidence: f64) -> PredictResponse {
    PredictResponse {
        gesture: Some(gesture.to_string()),
        confidence,
    }
}

#[test]
fn frame_encodes_as_data_url() {
    let frame = Frame::jpeg(vec![0xFF, 0xD8, 0xFF]);
    assert_eq!(frame.to_data_url(), "data:image/jpeg;base64,/9j/");
}

#[tokio::test(start_paused = true)]
async fn confident_prediction_is_emitted_as_camera_gesture() {
    let backend = ScriptedBackend::new();
    backend.push_predict(Ok(prediction("thumbs_up", 0.9)));
    backend.push_predict(Ok(prediction("none", 0.99)));
    let (sink, mut rx) = gesture_channel();

    let camera = CameraGestureSource::start(
        Box::new(FakeCamera::new()),
        backend.clone(),
        sink,
        CameraOptions::default(),
    );

    let event = rx.recv().await.expect("camera gesture");
    assert_eq!(event.label, GestureLabel::ThumbsUp);
    assert_eq!(event.origin, GestureOrigin::Camera);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err(), "'none' frames never become gestures");
    assert!(backend.predict_requests()[0]
        .image
        .starts_with("data:image/jpeg;base64,"));

    camera.stop().await;
}

#[tokio::test(start_paused = true)]
async fn low_confidence_frames_are_not_gestures() {
    let backend = ScriptedBackend::new();
    backend.push_predict(Ok(prediction("fist", 0.29)));
    let (sink, mut rx) = gesture_channel();

    let camera = CameraGestureSource::start(
        Box::new(FakeCamera::new()),
        backend.clone(),
        sink,
        CameraOptions::default(),
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(backend.predict_calls() > 1);
    assert!(rx.try_recv().is_err());
    camera.stop().await;
}

#[tokio::test(start_paused = true)]
async fn one_request_in_flight_at_a_time() {
    let backend = ScriptedBackend::new();
    backend.push_predict(Ok(prediction("none", 0.0)));
    backend.set_predict_delay(Duration::from_millis(100));
    let (sink, _rx) = gesture_channel();
    let device = FakeCamera::new();
    let captures = Arc::clone(&device.captures);

    let camera = CameraGestureSource::start(
        Box::new(device),
        backend.clone(),
        sink,
        CameraOptions {
            threshold: 0.3,
            frame_interval: Duration::ZERO,
        },
    );

    tokio::time::sleep(Duration::from_millis(550)).await;
    // Captures start at 0, 100, ... 500: throughput is bounded by round-trip latency.
    assert_eq!(captures.load(Ordering::SeqCst), 6);
    assert_eq!(backend.predict_calls(), 5);
    camera.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_releases_device_and_discards_in_flight_result() {
    let backend = ScriptedBackend::new();
    backend.push_predict(Ok(prediction("open_palm", 0.95)));
    backend.set_predict_delay(Duration::from_millis(300));
    let (sink, mut rx) = gesture_channel();
    let device = FakeCamera::new();
    let captures = Arc::clone(&device.captures);
    let released = Arc::clone(&device.released);

    let camera = CameraGestureSource::start(Box::new(device), backend.clone(), sink, CameraOptions::default());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(captures.load(Ordering::SeqCst), 1);
    assert!(camera.is_running());

    camera.stop().await;
    assert!(released.load(Ordering::SeqCst));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(captures.load(Ordering::SeqCst), 1);
    assert_eq!(backend.predict_calls(), 1);
    assert!(rx.try_recv().is_err(), "late result must be discarded");
}

#[tokio::test(start_paused = true)]
async fn recognition_errors_do_not_stop_the_loop() {
    let backend = ScriptedBackend::new();
    backend.push_predict(Err("backend down".to_string()));
    backend.push_predict(Ok(prediction("peace", 0.5)));
    let (sink, mut rx) = gesture_channel();

    let camera = CameraGestureSource::start(
        Box::new(FakeCamera::new()),
        backend,
        sink,
        CameraOptions::default(),
    );

    let event = rx.recv().await.expect("gesture after error");
    assert_eq!(event.label, GestureLabel::Peace);
    camera.stop().await;
}

#[tokio::test(start_paused = true)]
async fn empty_and_failed_captures_are_retried_until_the_device_goes_away() {
    let backend = ScriptedBackend::new();
    backend.push_predict(Ok(prediction("fist", 0.9)));
    let (sink, mut rx) = gesture_channel();
    let device = ScriptedCamera::new(vec![
        Ok(None),
        Err(CameraError::Capture("sensor busy".to_string())),
        Ok(Some(Frame::jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9]))),
    ]);
    let attempts = Arc::clone(&device.attempts);

    let camera = CameraGestureSource::start(
        Box::new(device),
        backend.clone(),
        sink,
        CameraOptions::default(),
    );

    let event = rx.recv().await.expect("gesture from the only real frame");
    assert_eq!(event.label, GestureLabel::Fist);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(backend.predict_calls(), 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert!(!camera.is_running(), "released device ends the loop without stop()");
    assert!(rx.try_recv().is_err());

    camera.stop().await;
}
