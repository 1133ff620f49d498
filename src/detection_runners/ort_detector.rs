mod ort_engine;
mod ort_inference;
pub mod bbox_regression;
pub mod detections;
pub mod image_ops;
pub mod input_wrapper;
pub mod nms;
pub mod postprocess;

pub use ort_engine::*;
pub use ort_inference::*;
pub use postprocess::Postprocessor;
