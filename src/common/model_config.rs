use std::path::PathBuf;
use crate::common::inference_device::InferenceDevice;
use crate::common::model_type::ModelType;
use crate::data::FsAccess;

/// Where the pretrained demo weights are published.
pub const DEFAULT_WEIGHTS_BASE_URL: &str = "https://siastore.blob.core.windows.net/demo/models/rcnn";

/// Which checkpoint to load and where it lives.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_type: ModelType,
    /// Path prefix of the weight file; `<prefix>-<epoch:04>.onnx` is loaded.
    /// When `None`, the provisioning cache is used.
    pub prefix: Option<String>,
    pub epoch: u32,
    pub inference_device: InferenceDevice,
    pub ort_lib_path: Option<String>,
    pub cache_dir: PathBuf,
    pub weights_base_url: String,
    /// Download missing weights into `cache_dir` before loading.
    pub fetch: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::Resnet,
            prefix: None,
            epoch: 10,
            inference_device: InferenceDevice::CPU,
            ort_lib_path: None,
            cache_dir: default_cache_dir(),
            weights_base_url: DEFAULT_WEIGHTS_BASE_URL.to_string(),
            fetch: true,
        }
    }
}

/// `./data/__vision/weights`, see [`FsAccess::weights_dir`].
pub fn default_cache_dir() -> PathBuf {
    FsAccess::weights_dir().unwrap_or_else(|_| PathBuf::from("weights"))
}

impl ModelConfig {
    pub fn new(model_type: ModelType, epoch: u32, inference_device: InferenceDevice) -> Self {
        Self {
            model_type,
            epoch,
            inference_device,
            ..Default::default()
        }
    }

    /// Full path of the weight file this configuration resolves to.
    pub fn weights_path(&self) -> PathBuf {
        match &self.prefix {
            Some(prefix) => PathBuf::from(format!("{}-{:04}.onnx", prefix, self.epoch)),
            None => self.cache_dir.join(self.model_type.weights_file(self.epoch)),
        }
    }

    pub fn to_string(&self) -> String {
        format!("Model Type: {}\n\
        Weights File Path: {}\n\
        Epoch: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Weights Cache: {}",
                self.model_type, self.weights_path().display(), self.epoch,
                self.ort_lib_path.as_deref().unwrap_or("<default>"),
                self.inference_device, self.cache_dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_path_from_prefix_or_cache() {
        let mut config = ModelConfig::new(ModelType::Vgg, 7, InferenceDevice::CPU);
        config.cache_dir = PathBuf::from("/tmp/weights");
        assert_eq!(config.weights_path(), PathBuf::from("/tmp/weights/vgg-0007.onnx"));

        config.prefix = Some("models/custom".to_string());
        assert_eq!(config.weights_path(), PathBuf::from("models/custom-0007.onnx"));
    }
}
