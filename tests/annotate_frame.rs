use image::{Rgb, RgbImage};
use rand::Rng;
use cam_detect::common::ClassCatalog;
use cam_detect::pipeline::{annotate_frame, get_color, FramePainter, ObjectDetection, TargetClassSet, COLOR_PALETTE};

mod fakes;
use fakes::*;

fn noisy_frame(width: u32, height: u32) -> RgbImage {
    let mut rng = rand::thread_rng();
    RgbImage::from_fn(width, height, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
}

#[test]
fn palette_wraps_every_twelve_ids() {
    for class_id in 0..500 {
        assert_eq!(get_color(class_id), get_color(class_id + 12));
    }
    assert_eq!(get_color(0), Rgb([0, 0, 255]));
    assert_eq!(get_color(11), Rgb([128, 0, 128]));
    assert_eq!(get_color(usize::MAX), COLOR_PALETTE[usize::MAX % 12]);
}

#[test]
fn no_detections_leaves_frame_untouched() {
    let frame = noisy_frame(64, 48);
    let mut painter = FramePainter::default();

    let annotated = annotate_frame(&mut painter, &ClassCatalog::coco(), frame.clone(), &[]);

    assert_eq!(annotated, frame);
}

#[test]
fn annotation_is_deterministic() {
    let frame = noisy_frame(120, 90);
    let detections = vec![
        detection(0, 0.91, 10., 10., 50., 50.),
        detection(63, 0.42, 30., 20., 110., 80.),
    ];
    let catalog = ClassCatalog::coco();

    let a = annotate_frame(&mut FramePainter::default(), &catalog, frame.clone(), &detections);
    let b = annotate_frame(&mut FramePainter::default(), &catalog, frame.clone(), &detections);

    assert_eq!(a, b);
    assert_ne!(a, frame);
}

#[test]
fn person_scenario_draws_one_box_and_label() {
    let detector = ScriptedDetector::new(vec![]);
    let mut pipeline = ObjectDetection::from_model(detector)
        .with_target_classes(TargetClassSet::new(["person"]))
        .with_painter(RecordingPainter::default());
    let raw = vec![
        detection(0, 0.91, 10., 10., 50., 50.),
        detection(2, 0.80, 5., 5., 20., 20.),
    ];

    let kept = pipeline.filter_results(&raw);
    pipeline.annotate_frame(RgbImage::new(100, 100), &kept);

    let painter = pipeline.painter();
    assert_eq!(painter.rects, vec![DrawnRect {
        top_left: (10, 10),
        bottom_right: (50, 50),
        color: pipeline.get_color(0),
        thickness: 2,
    }]);
    assert_eq!(painter.texts.len(), 1);
    assert_eq!(painter.texts[0].text, "person 0.91");
    assert_eq!(painter.texts[0].origin, (10, 0));
}

#[test]
fn box_outline_is_drawn_in_class_color() {
    let catalog = ClassCatalog::coco();
    let frame = RgbImage::new(80, 80);

    let annotated = annotate_frame(
        &mut FramePainter::without_font(),
        &catalog,
        frame,
        &[detection(2, 0.8, 20., 20., 60., 60.)],
    );

    let color = get_color(2);
    assert_eq!(*annotated.get_pixel(20, 40), color);
    assert_eq!(*annotated.get_pixel(21, 40), color);
    assert_eq!(*annotated.get_pixel(60, 40), color);
    assert_eq!(*annotated.get_pixel(40, 40), Rgb([0, 0, 0]));
}

#[test]
fn unknown_class_is_labeled_unknown() {
    let catalog = ClassCatalog::from(&["person"][..]);
    let mut painter = RecordingPainter::default();

    annotate_frame(&mut painter, &catalog, RgbImage::new(10, 10), &[detection(40, 0.5, 0., 0., 5., 5.)]);

    assert_eq!(painter.texts[0].text, "Unknown 0.50");
    assert_eq!(painter.rects[0].color, get_color(40));
}
