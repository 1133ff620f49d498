//! Options for preprocessing, postprocessing and the ONNX model's I/O layout.

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::common::ClassVocabulary;
use crate::error::DetectError;

/// Per-channel means subtracted from the resized image, RGB order.
pub const PIXEL_MEANS: [f32; 3] = [123.68, 116.779, 103.939];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRcnn {
    /// Target length of the image's shorter side.
    pub short_side: u32,
    /// Upper bound on the image's longer side after resizing.
    pub long_side: u32,
    pub pixel_means: [f32; 3],
    /// Pad the tensor's height and width up to a multiple of this. 0 disables padding.
    pub image_stride: usize,
    pub conf_thresh: f32,
    pub nms_thresh: f32,
    /// Class names, background first. `None` selects PASCAL VOC.
    pub names: Option<Vec<String>>,

    // model I/O
    pub data_input: String,
    pub im_info_input: String,
    pub rois_output: String,
    pub cls_prob_output: String,
    pub bbox_pred_output: String,

    pub font_path: Option<String>,
    pub profile: bool,
}

impl Default for ConfigRcnn {
    fn default() -> Self {
        Self {
            short_side: 600,
            long_side: 1000,
            pixel_means: PIXEL_MEANS,
            image_stride: 0,
            conf_thresh: 0.7,
            nms_thresh: 0.3,
            names: None,

            data_input: "data".to_string(),
            im_info_input: "im_info".to_string(),
            rois_output: "rois_output".to_string(),
            cls_prob_output: "cls_prob_reshape_output".to_string(),
            bbox_pred_output: "bbox_pred_reshape_output".to_string(),

            font_path: None,
            profile: false,
        }
    }
}

impl ConfigRcnn {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reads a JSON configuration file. Missing fields take their default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DetectError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            DetectError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn with_scales(mut self, short_side: u32, long_side: u32) -> Self {
        self.short_side = short_side;
        self.long_side = long_side;
        self
    }

    pub fn with_image_stride(mut self, stride: usize) -> Self {
        self.image_stride = stride;
        self
    }

    /// Sets the minimum score a candidate needs to be kept. Comparison is `>=`.
    pub fn with_conf_thresh(mut self, x: f32) -> Self {
        self.conf_thresh = x;
        self
    }

    /// Sets the IoU above which lower-scoring boxes of the same class are suppressed.
    pub fn with_nms_thresh(mut self, x: f32) -> Self {
        self.nms_thresh = x;
        self
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = Some(names.iter().map(|x| x.to_string()).collect::<Vec<String>>());
        self
    }

    pub fn with_font_path(mut self, path: &str) -> Self {
        self.font_path = Some(path.to_string());
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    /// The class vocabulary selected by this configuration.
    pub fn vocabulary(&self) -> Result<ClassVocabulary, DetectError> {
        match &self.names {
            Some(names) => ClassVocabulary::from_names(names.as_slice()),
            None => Ok(ClassVocabulary::voc()),
        }
    }

    pub fn validate(&self) -> Result<(), DetectError> {
        if self.short_side == 0 || self.long_side == 0 {
            return Err(DetectError::Config(format!(
                "scales must be positive, got short_side={} long_side={}",
                self.short_side, self.long_side
            )));
        }
        if !self.conf_thresh.is_finite() {
            return Err(DetectError::Config(format!("conf_thresh must be finite, got {}", self.conf_thresh)));
        }
        if !self.nms_thresh.is_finite() {
            return Err(DetectError::Config(format!("nms_thresh must be finite, got {}", self.nms_thresh)));
        }
        if self.pixel_means.iter().any(|m| !m.is_finite()) {
            return Err(DetectError::Config("pixel_means must be finite".to_string()));
        }
        self.vocabulary().map(|_| ())
    }
}
