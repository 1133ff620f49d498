use image::DynamicImage;
use crate::common::ClassVocabulary;
use crate::data::{ClassDetections, ConfigRcnn, Preprocessor, ScaleRecord, X};
use crate::detection_runners::inference_engine::{InferenceEngine, RawDetections};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::ort_detector::postprocess::Postprocessor;
use crate::error::DetectError;

/// Everything one detection pass produces.
///
/// The tensor is kept so the resized image can be rebuilt for visualization.
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    pub detections: ClassDetections,
    pub tensor: X,
    pub record: ScaleRecord,
}

/// Two-stage detector: preprocessing, an inference engine and per-class postprocessing.
#[derive(Debug)]
pub struct RcnnDetector<E> {
    engine: E,
    preprocessor: Preprocessor,
    postprocessor: Postprocessor,
    config: ConfigRcnn,
}

impl<E: InferenceEngine> RcnnDetector<E> {
    pub fn new(engine: E, config: ConfigRcnn) -> Result<Self, DetectError> {
        config.validate()?;
        let classes = config.vocabulary()?;
        Ok(Self::with_classes(engine, config, classes))
    }

    pub fn with_classes(engine: E, config: ConfigRcnn, classes: ClassVocabulary) -> Self {
        log::info!(
            "Detector ready | classes: {} | conf: {} | nms: {}",
            classes.len(),
            config.conf_thresh,
            config.nms_thresh
        );
        Self {
            engine,
            preprocessor: Preprocessor::new(&config),
            postprocessor: Postprocessor::new(&config, classes),
            config,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn pixel_means(&self) -> [f32; 3] {
        self.preprocessor.pixel_means()
    }

    /// Runs the full pipeline on one image, timing stages when profiling is enabled.
    pub fn detect(&mut self, image: &DynamicImage) -> Result<DetectionOutput, DetectError> {
        let profile = self.config.profile;
        self.forward(image, profile)
    }
}

impl<E: InferenceEngine> InferenceProcess for RcnnDetector<E> {
    type Input = DynamicImage;
    type Preprocessed = (X, ScaleRecord);
    type Raw = RawDetections;
    type Output = DetectionOutput;

    fn preprocess(&self, x: &Self::Input) -> Result<Self::Preprocessed, DetectError> {
        self.preprocessor.preprocess(x)
    }

    fn inference(&mut self, xs: &Self::Preprocessed) -> Result<Self::Raw, DetectError> {
        let (x, record) = xs;
        let im_info = x.im_info(record.scale());
        self.engine.infer(x, &im_info)
    }

    fn postprocess(&self, ys: Self::Raw, xs: Self::Preprocessed) -> Result<Self::Output, DetectError> {
        let (tensor, record) = xs;
        let detections = self
            .postprocessor
            .postprocess(ys.scores.view(), ys.boxes.view(), &record)?;
        Ok(DetectionOutput {
            detections,
            tensor,
            record,
        })
    }
}
