extern crate rcnn_detect;

use std::path::{Path, PathBuf};
use image::{Rgb, RgbImage};
use rcnn_detect::common::VocClass;
use rcnn_detect::data::ConfigRcnn;
use rcnn_detect::detection_runners::RcnnDetector;
use rcnn_detect::output::{to_json_string, Draw, JsonBox};
use rcnn_detect::{DetectOutcome, OutputMode};

use fake_engine::{region, FakeEngine};

/// 200x100 test image. With the default 600/1000 scales it is resized by 5.
fn write_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(200, 100, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
        .save(&path)
        .unwrap();
    path
}

fn detector() -> RcnnDetector<FakeEngine> {
    let cat = VocClass::Cat.index();
    let person = VocClass::Person.index();
    let engine = FakeEngine::new(&[
        region(cat, 0.9, [50., 50., 250., 250.]),
        region(cat, 0.8, [60., 60., 260., 260.]),
        region(person, 0.75, [500., 100., 900., 400.]),
        region(VocClass::Background.index(), 0.99, [0., 0., 999., 499.]),
        region(VocClass::Dog.index(), 0.4, [10., 10., 40., 40.]),
    ]);
    RcnnDetector::new(engine, ConfigRcnn::default()).unwrap()
}

#[test]
fn json_reports_top_detection_per_class() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = write_image(dir.path(), "scene.png");
    let mut detector = detector();

    let outcome = rcnn_detect::detect(&image_path, &mut detector, OutputMode::Json).unwrap();
    let results = match outcome {
        DetectOutcome::Json(results) => results,
        other => panic!("expected JSON output, got {other:?}"),
    };

    assert_eq!(detector.engine().last_im_info, Some([500., 1000., 5.]));
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].object_name, "cat");
    assert_eq!(results[0].confidence, 0.9);
    assert_eq!(results[0].bounding_box, JsonBox { x1: 10., x2: 50., y1: 10., y2: 50. });

    assert_eq!(results[1].object_name, "person");
    assert_eq!(results[1].confidence, 0.75);
    assert_eq!(results[1].bounding_box, JsonBox { x1: 100., x2: 180., y1: 20., y2: 80. });

    let text = to_json_string(&results).unwrap();
    assert!(text.starts_with(r#"[{"object_name":"cat","confidence":0.9,"bounding_box":{"x1":10.0,"x2":50.0,"y1":10.0,"y2":50.0}}"#));
}

#[test]
fn visualization_is_saved_next_to_source() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = write_image(dir.path(), "cat.png");
    let before = std::fs::read(&image_path).unwrap();
    let mut detector = detector();
    let draw = Draw::new(Some("/nonexistent/font.ttf"));
    assert!(!draw.has_font());

    let outcome = rcnn_detect::detect(&image_path, &mut detector, OutputMode::Visualize(&draw)).unwrap();
    let (path, detections) = match outcome {
        DetectOutcome::Visualized { path, detections } => (path, detections),
        other => panic!("expected a visualization, got {other:?}"),
    };

    assert_eq!(path, dir.path().join("cat_result.png"));
    // both surviving detections are drawn, not only the top-1
    assert_eq!(detections.len(), 2);
    let saved = image::open(&path).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (1000, 500));
    // the cat box's top-left corner, in resized coordinates
    assert_eq!(*saved.get_pixel(50, 50), Rgb([255, 0, 0]));
    assert_eq!(std::fs::read(&image_path).unwrap(), before);
}

#[test]
fn missing_image_fails_before_inference() {
    let mut detector = detector();
    let err = rcnn_detect::detect(Path::new("no/such/image.jpg"), &mut detector, OutputMode::Json).unwrap_err();
    assert!(matches!(err, rcnn_detect::DetectError::ImageNotFound(_)));
    assert!(err.to_string().contains("no/such/image.jpg"));
    assert_eq!(detector.engine().calls(), 0);
}

#[test]
fn repeated_runs_are_stable() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = write_image(dir.path(), "scene.jpg");
    let mut detector = detector();

    let mut previous = None;
    for _ in 0..3 {
        let outcome = rcnn_detect::detect(&image_path, &mut detector, OutputMode::Json).unwrap();
        let DetectOutcome::Json(results) = outcome else { panic!("expected JSON output") };
        if let Some(prev) = &previous {
            assert_eq!(prev, &results);
        }
        previous = Some(results);
    }
    assert_eq!(detector.engine().calls(), 3);
}
