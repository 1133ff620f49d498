use std::path::PathBuf;
use image::{Rgb, RgbImage};
use rcnn_detect::common::{InferenceDevice, ModelConfig, ModelType, VocClass};
use rcnn_detect::data::ConfigRcnn;
use rcnn_detect::detection_runners::RcnnDetector;
use rcnn_detect::output::{to_json_string, Draw};
use rcnn_detect::{DetectError, DetectOutcome, OutputMode};

use fake_engine::{region, FakeEngine};

fn blank_image(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("blank.png");
    RgbImage::from_pixel(64, 48, Rgb([0, 0, 0])).save(&path).unwrap();
    path
}

#[test]
fn no_regions() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = blank_image(dir.path());
    let mut detector = RcnnDetector::new(FakeEngine::new(&[]), ConfigRcnn::default()).unwrap();

    let outcome = rcnn_detect::detect(&image_path, &mut detector, OutputMode::Json).unwrap();
    let DetectOutcome::Json(results) = outcome else { panic!("expected JSON output") };
    assert!(results.is_empty());
    assert_eq!(to_json_string(&results).unwrap(), "[]");
}

#[test]
fn everything_below_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = blank_image(dir.path());
    let engine = FakeEngine::new(&[
        region(VocClass::Car.index(), 0.69, [1., 1., 20., 20.]),
        region(VocClass::Background.index(), 1.0, [0., 0., 10., 10.]),
    ]);
    let mut detector = RcnnDetector::new(engine, ConfigRcnn::default()).unwrap();
    let draw = Draw::new(Some("/nonexistent/font.ttf"));

    let outcome = rcnn_detect::detect(&image_path, &mut detector, OutputMode::Visualize(&draw)).unwrap();
    let DetectOutcome::Visualized { path, detections } = outcome else { panic!("expected a visualization") };
    assert!(detections.is_empty());
    assert!(path.ends_with("blank_result.png"));
    assert!(path.is_file());
}

#[test]
fn missing_weights_are_reported() {
    let cache = tempfile::tempdir().unwrap();
    let mut model = ModelConfig::new(ModelType::Vgg, 10, InferenceDevice::CPU);
    model.cache_dir = cache.path().to_path_buf();
    model.fetch = false;

    let err = rcnn_detect::init_detector(&model, ConfigRcnn::default()).unwrap_err();
    match err {
        DetectError::ModelNotFound(msg) => assert!(msg.contains("vgg-0010.onnx")),
        other => panic!("unexpected error: {other}"),
    }
}
