use rand::Rng;
use cam_detect::common::{ClassCatalog, Detection};
use cam_detect::pipeline::{filter_results, ObjectDetection, TargetClassSet};

mod fakes;
use fakes::*;

fn random_detections(rng: &mut impl Rng, n: usize) -> Vec<Detection> {
    (0..n)
        .map(|_| {
            let x1 = rng.gen_range(0.0..600.0);
            let y1 = rng.gen_range(0.0..400.0);
            detection(
                rng.gen_range(0..80),
                rng.gen_range(0.0..1.0),
                x1,
                y1,
                x1 + rng.gen_range(1.0..40.0),
                y1 + rng.gen_range(1.0..40.0),
            )
        })
        .collect()
}

fn is_subsequence(sub: &[Detection], full: &[Detection]) -> bool {
    let mut it = full.iter();
    sub.iter().all(|d| it.any(|f| f == d))
}

#[test]
fn keeps_only_target_classes() {
    let catalog = ClassCatalog::coco();
    let targets = TargetClassSet::new(["person"]);
    let raw = vec![
        detection(0, 0.91, 10., 10., 50., 50.),
        detection(2, 0.80, 5., 5., 20., 20.),
    ];

    let kept = filter_results(&raw, &catalog, &targets);

    assert_eq!(kept, vec![raw[0].clone()]);
}

#[test]
fn default_targets_are_laptop_mouse_person() {
    let targets = TargetClassSet::default();
    assert_eq!(targets.iter().collect::<Vec<_>>(), vec!["laptop", "mouse", "person"]);

    let detection = ObjectDetection::from_model(ScriptedDetector::new(vec![]));
    let raw = vec![
        fakes::detection(64, 0.5, 0., 0., 1., 1.),  // mouse
        fakes::detection(62, 0.5, 0., 0., 1., 1.),  // tv
        fakes::detection(63, 0.5, 0., 0., 1., 1.),  // laptop
        fakes::detection(0, 0.5, 0., 0., 1., 1.),   // person
        fakes::detection(66, 0.5, 0., 0., 1., 1.),  // keyboard
    ];
    let kept: Vec<usize> = detection.filter_results(&raw).iter().map(|d| d.class_id).collect();
    assert_eq!(kept, vec![64, 63, 0]);
}

#[test]
fn empty_input_gives_empty_output() {
    let kept = filter_results(&[], &ClassCatalog::coco(), &TargetClassSet::default());
    assert!(kept.is_empty());
}

#[test]
fn unknown_class_falls_back_to_attached_label() {
    let catalog = ClassCatalog::from(&["cat", "dog"][..]);
    let targets = TargetClassSet::new(["person"]);
    let raw = vec![
        detection(7, 0.6, 0., 0., 5., 5.).with_label("person"),
        detection(9, 0.6, 0., 0., 5., 5.),
    ];

    let kept = filter_results(&raw, &catalog, &targets);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].class_id, 7);
}

#[test]
fn random_lists_filter_to_ordered_idempotent_subsequences() {
    let mut rng = rand::thread_rng();
    let catalog = ClassCatalog::coco();
    let targets = TargetClassSet::default();

    for _ in 0..200 {
        let n = rng.gen_range(0..40);
        let raw = random_detections(&mut rng, n);

        let kept = filter_results(&raw, &catalog, &targets);

        assert!(is_subsequence(&kept, &raw));
        assert!(kept.iter().all(|d| targets.contains(catalog.name(d.class_id).unwrap())));
        let expected = raw
            .iter()
            .filter(|d| targets.contains(catalog.name(d.class_id).unwrap()))
            .count();
        assert_eq!(kept.len(), expected);
        assert_eq!(filter_results(&kept, &catalog, &targets), kept);
    }
}
