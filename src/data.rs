mod config_rcnn;
mod filesystem_access;

pub use config_rcnn::*;
pub use filesystem_access::FsAccess;

pub use crate::detection_runners::ort_detector::image_ops::{Preprocessor, ScaleRecord};
pub use crate::detection_runners::ort_detector::input_wrapper::X;
pub use crate::detection_runners::ort_detector::detections::ClassDetections;
