use serde::{Deserialize, Serialize};
use crate::common::RcnnBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// A single surviving detection, boxed in source image pixel coordinates.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RcnnDetection {
    pub class_id: usize,
    pub label: String,
    pub confidence: f32,
    pub bbox: RcnnBox,
}

impl Nms for RcnnDetection {
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl RcnnDetection {
    pub fn new(class_id: usize, label: &str, confidence: f32, bbox: RcnnBox) -> Self {
        Self {
            class_id,
            label: label.to_string(),
            confidence,
            bbox,
        }
    }

    /// One row in the `[x1, y1, x2, y2, confidence]` layout used by the result log.
    pub fn as_row(&self) -> [f32; 5] {
        [self.bbox.x1, self.bbox.y1, self.bbox.x2, self.bbox.y2, self.confidence]
    }
}
