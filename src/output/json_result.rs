use serde::{Deserialize, Serialize};
use crate::common::RcnnDetection;
use crate::data::ClassDetections;
use crate::error::DetectError;

/// Box edges in source image pixels: `x1` left, `x2` right, `y1` top, `y2` bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JsonBox {
    pub x1: f32,
    pub x2: f32,
    pub y1: f32,
    pub y2: f32,
}

/// One entry of the JSON result: the best detection of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDetection {
    pub object_name: String,
    pub confidence: f32,
    pub bounding_box: JsonBox,
}

/// Values are written with at most six decimals.
fn round6(v: f32) -> f32 {
    ((v as f64 * 1e6).round() / 1e6) as f32
}

impl From<&RcnnDetection> for JsonDetection {
    fn from(det: &RcnnDetection) -> Self {
        Self {
            object_name: det.label.clone(),
            confidence: round6(det.confidence),
            bounding_box: JsonBox {
                x1: round6(det.bbox.x1),
                x2: round6(det.bbox.x2),
                y1: round6(det.bbox.y1),
                y2: round6(det.bbox.y2),
            },
        }
    }
}

/// Top-scoring detection of each class that has any, in class order.
pub fn format_json(detections: &ClassDetections) -> Vec<JsonDetection> {
    detections
        .top1()
        .into_iter()
        .map(JsonDetection::from)
        .collect()
}

pub fn to_json_string(results: &[JsonDetection]) -> Result<String, DetectError> {
    Ok(serde_json::to_string(results)?)
}
