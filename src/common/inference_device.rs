use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
}

impl InferenceDevice {
    /// Maps the demo's `--gpu <id>` switch onto a device.
    pub fn from_gpu_flag(gpu: Option<usize>) -> Self {
        match gpu {
            Some(id) => InferenceDevice::CUDA(id),
            None => InferenceDevice::CPU,
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => "CPU",
            InferenceDevice::CUDA(_) => "CUDA",
        }
    }
}

impl std::fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceDevice::CPU => write!(f, "{}", self.str()),
            InferenceDevice::CUDA(id) => write!(f, "{}:{}", self.str(), id),
        }
    }
}
