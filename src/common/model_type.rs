use serde::{Deserialize, Serialize};

/// Backbone of the pretrained detector. Each variant has its own weight file.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default] Resnet,
    Vgg,
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resnet => "resnet",
            Self::Vgg => "vgg",
        }
    }

    pub fn from_str(model_type: &str) -> Option<ModelType> {
        match model_type.to_lowercase().as_str() {
            "resnet" => Some(ModelType::Resnet),
            "vgg" => Some(ModelType::Vgg),
            _ => None,
        }
    }

    /// Weight file name for a checkpoint, e.g. `resnet-0010.onnx`.
    pub fn weights_file(&self, epoch: u32) -> String {
        format!("{}-{:04}.onnx", self.name(), epoch)
    }

    /// Remote location of a checkpoint under `base_url`.
    pub fn weights_url(&self, base_url: &str, epoch: u32) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.weights_file(epoch))
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_model_type_has_its_own_weights() {
        let base = "https://example.invalid/models/rcnn/";
        assert_eq!(
            ModelType::Resnet.weights_url(base, 10),
            "https://example.invalid/models/rcnn/resnet-0010.onnx"
        );
        assert_eq!(
            ModelType::Vgg.weights_url(base, 10),
            "https://example.invalid/models/rcnn/vgg-0010.onnx"
        );
        assert_eq!(ModelType::from_str("VGG"), Some(ModelType::Vgg));
        assert_eq!(ModelType::from_str("alexnet"), None);
    }
}
