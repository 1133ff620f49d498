pub mod inference_engine;
pub mod inference_process;
pub mod ort_detector;

pub use inference_engine::*;
pub use ort_detector::*;
