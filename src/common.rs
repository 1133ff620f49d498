mod class_label;
mod inference_device;
mod model_config;
mod model_type;
mod rcnn_box;
mod rcnn_detection;
mod rcnn_image;

pub use class_label::*;
pub use inference_device::*;
pub use model_config::*;
pub use model_type::*;
pub use rcnn_box::*;
pub use rcnn_detection::*;
pub use rcnn_image::*;
