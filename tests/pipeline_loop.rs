use cam_detect::pipeline::{LoopConfig, ObjectDetection, StopReason, TargetClassSet};

mod fakes;
use fakes::*;

fn pipeline(detector: ScriptedDetector) -> ObjectDetection<ScriptedDetector, RecordingPainter> {
    ObjectDetection::from_model(detector).with_painter(RecordingPainter::default())
}

#[test]
fn camera_that_fails_to_open_never_touches_the_display() {
    let log = EventLog::default();
    let mut backend = FakeBackend::frames(&log, 3);
    backend.open_fails = true;
    let mut display = FakeDisplay::new(&log);

    let summary = pipeline(ScriptedDetector::new(vec![])).run(&mut backend, &mut display).unwrap();

    assert_eq!(summary.stop, StopReason::DeviceUnavailable);
    assert_eq!(summary.frames_displayed, 0);
    assert_eq!(*log.borrow(), vec!["open 0".to_string()]);
}

#[test]
fn failed_first_read_releases_once_and_shows_nothing() {
    let log = EventLog::default();
    let mut backend = FakeBackend::new(&log, vec![Read::Fail]);
    let mut display = FakeDisplay::new(&log);
    let mut detection = pipeline(ScriptedDetector::new(vec![]));

    let summary = detection.run(&mut backend, &mut display).unwrap();

    assert_eq!(summary.stop, StopReason::EndOfStream);
    assert_eq!(summary.frames_displayed, 0);
    assert_eq!(count(&log, "release"), 1);
    assert_eq!(count(&log, "close"), 1);
    assert_eq!(count(&log, "show"), 0);
    assert_eq!(detection.model().calls, 0);
}

#[test]
fn stream_end_stops_after_every_frame_is_shown() {
    let log = EventLog::default();
    let mut backend = FakeBackend::frames(&log, 4);
    let mut display = FakeDisplay::new(&log);

    let summary = pipeline(ScriptedDetector::new(vec![])).run(&mut backend, &mut display).unwrap();

    assert_eq!(summary.stop, StopReason::EndOfStream);
    assert_eq!(summary.frames_displayed, 4);
    assert_eq!(display.shown.len(), 4);
    assert!(display.windows.iter().all(|w| w == "Web Camera"));
    assert_eq!(count(&log, "poll 1"), 4);
    assert_eq!(count(&log, "release"), 1);
    assert_eq!(count(&log, "close"), 1);
    assert_eq!(log.borrow().last().map(String::as_str), Some("close"));
}

#[test]
fn quit_key_stops_the_loop() {
    let log = EventLog::default();
    let mut backend = FakeBackend::frames(&log, 10);
    // high bits are ignored, only the low byte is compared
    let mut display = FakeDisplay::new(&log).with_keys(&[None, Some('x' as i32), Some(0x100000 | 'q' as i32)]);

    let summary = pipeline(ScriptedDetector::new(vec![])).run(&mut backend, &mut display).unwrap();

    assert_eq!(summary.stop, StopReason::QuitRequested);
    assert_eq!(summary.frames_displayed, 3);
    assert_eq!(count(&log, "release"), 1);
    assert_eq!(count(&log, "close"), 1);
}

#[test]
fn inference_error_propagates_after_release() {
    let log = EventLog::default();
    let mut backend = FakeBackend::frames(&log, 2);
    let mut display = FakeDisplay::new(&log);

    let err = pipeline(ScriptedDetector::failing()).run(&mut backend, &mut display).unwrap_err();

    assert!(err.to_string().contains("inference failed"));
    assert_eq!(count(&log, "release"), 1);
    assert_eq!(count(&log, "close"), 1);
    assert_eq!(count(&log, "show"), 0);
}

#[test]
fn each_frame_gets_boxes_for_targets_and_the_fps_overlay() {
    let log = EventLog::default();
    let mut backend = FakeBackend::frames(&log, 2);
    backend.fps = 29.97;
    let mut display = FakeDisplay::new(&log);
    let detector = ScriptedDetector::new(vec![
        detection(0, 0.91, 10., 10., 50., 50.),
        detection(2, 0.80, 5., 5., 20., 20.),
    ]);
    let mut detection = pipeline(detector).with_target_classes(TargetClassSet::new(["person"]));

    detection.run(&mut backend, &mut display).unwrap();

    let painter = detection.painter();
    assert_eq!(painter.rects.len(), 2);
    let texts: Vec<&str> = painter.texts.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["person 0.91", "FPS: 29.97", "person 0.91", "FPS: 29.97"]);
    let fps = &painter.texts[1];
    assert_eq!(fps.origin, (10, 30));
    assert_eq!(fps.color, image::Rgb([0, 0, 255]));
}

#[test]
fn custom_camera_index_and_window_name() {
    let log = EventLog::default();
    let mut backend = FakeBackend::frames(&log, 1);
    let mut display = FakeDisplay::new(&log);
    let config = LoopConfig {
        camera_index: 2,
        window_name: "Bench".to_string(),
        ..Default::default()
    };

    pipeline(ScriptedDetector::new(vec![]))
        .with_loop_config(config)
        .run(&mut backend, &mut display)
        .unwrap();

    assert_eq!(log.borrow()[0], "open 2");
    assert_eq!(display.windows, vec!["Bench".to_string()]);
}
