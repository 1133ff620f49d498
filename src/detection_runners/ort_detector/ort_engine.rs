use std::borrow::Cow;
use std::path::Path;
use half::f16;
use ndarray::{s, Array2, ArrayD};
use ort::{
    execution_providers::{CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    tensor::TensorElementType,
    value::{DynValue, Tensor, ValueType},
};
use crate::common::InferenceDevice;
use crate::data::{ConfigRcnn, X};
use crate::detection_runners::inference_engine::{InferenceEngine, RawDetections};
use crate::detection_runners::ort_detector::bbox_regression::{bbox_pred, clip_boxes};
use crate::error::DetectError;
use crate::utils::human_bytes;

/// Names of the tensors the detector graph exchanges.
#[derive(Debug, Clone)]
pub struct OrtIoNames {
    pub data: String,
    pub im_info: String,
    pub rois: String,
    pub cls_prob: String,
    pub bbox_pred: String,
}

impl From<&ConfigRcnn> for OrtIoNames {
    fn from(config: &ConfigRcnn) -> Self {
        Self {
            data: config.data_input.clone(),
            im_info: config.im_info_input.clone(),
            rois: config.rois_output.clone(),
            cls_prob: config.cls_prob_output.clone(),
            bbox_pred: config.bbox_pred_output.clone(),
        }
    }
}

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    names: OrtIoNames,
    data_dtype: TensorElementType,
    has_im_info: bool,
}

impl OrtEngine {
    /// Loads the detector graph from `weights_path`.
    ///
    /// A missing file, or a graph lacking the configured inputs/outputs, is
    /// reported as [`DetectError::ModelNotFound`].
    pub fn new(
        weights_path: &Path,
        device: InferenceDevice,
        ort_lib_path: Option<&str>,
        names: OrtIoNames,
    ) -> Result<Self, DetectError> {
        if !weights_path.is_file() {
            return Err(DetectError::ModelNotFound(format!(
                "weights file {} does not exist",
                weights_path.display()
            )));
        }

        if let Some(lib) = ort_lib_path {
            Self::init_runtime(lib)?;
        }

        let mut builder = Session::builder().map_err(DetectError::inference)?;

        let mut device = device;
        match device {
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(DetectError::inference)?
            .commit_from_file(weights_path)
            .map_err(|err| {
                DetectError::ModelNotFound(format!("cannot load {}: {}", weights_path.display(), err))
            })?;

        let data_dtype = session
            .inputs
            .iter()
            .find(|input| input.name == names.data)
            .map(|input| match &input.input_type {
                ValueType::Tensor { ty, .. } => *ty,
                _ => TensorElementType::Float32,
            })
            .ok_or_else(|| {
                DetectError::ModelNotFound(format!(
                    "{} has no `{}` input",
                    weights_path.display(),
                    names.data
                ))
            })?;
        let has_im_info = session.inputs.iter().any(|input| input.name == names.im_info);

        for required in [&names.rois, &names.cls_prob, &names.bbox_pred] {
            if !session.outputs.iter().any(|output| &output.name == required) {
                return Err(DetectError::ModelNotFound(format!(
                    "{} has no `{}` output",
                    weights_path.display(),
                    required
                )));
            }
        }

        let size = std::fs::metadata(weights_path).map(|m| m.len()).unwrap_or(0);
        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {:?} | Weights: {} ({})",
            device,
            data_dtype,
            weights_path.display(),
            human_bytes(size as f64),
        );

        Ok(Self {
            session,
            names,
            data_dtype,
            has_im_info,
        })
    }

    /// Loads onnxruntime from `lib`. Only the first environment commit in a
    /// process picks the library; later calls keep the loaded one.
    fn init_runtime(lib: &str) -> Result<(), DetectError> {
        let committed = ort::init_from(lib)
            .commit()
            .map_err(|err| DetectError::Inference(format!("ORT commit failed for {}: {}", lib, err)))?;
        if !committed {
            log::warn!("ONNX Runtime already initialized, ignoring library path {}", lib);
        }
        Ok(())
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<(), DetectError> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        if ep.is_available().map_err(DetectError::inference)? {
            ep.register(builder).map_err(|err| {
                DetectError::Inference(format!("CUDA initialization failed: {}", err))
            })
        } else {
            Err(DetectError::Inference("CUDA execution provider not available".to_string()))
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<(), DetectError> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available().map_err(DetectError::inference)? {
            ep.register(builder).map_err(|err| {
                DetectError::Inference(format!("CPU initialization failed: {}", err))
            })
        } else {
            Err(DetectError::Inference("CPU execution provider not available".to_string()))
        }
    }

    fn tensor_preprocess(x: &X, dtype: &TensorElementType) -> Result<DynValue, DetectError> {
        let value = match dtype {
            TensorElementType::Float16 => Tensor::from_array(x.mapv(f16::from_f32))
                .map_err(DetectError::inference)?
                .into_dyn(),
            TensorElementType::Float32 => Tensor::from_array(x.0.clone())
                .map_err(DetectError::inference)?
                .into_dyn(),
            other => {
                return Err(DetectError::Inference(format!(
                    "unsupported input element type {:?}",
                    other
                )))
            }
        };
        Ok(value)
    }

    /// Extracts an output as `f32`, flattening leading dimensions into rows.
    fn tensor_postprocess(value: &DynValue, name: &str) -> Result<Array2<f32>, DetectError> {
        let array: ArrayD<f32> = match value.try_extract_array::<f32>() {
            Ok(view) => view.to_owned(),
            Err(_) => value
                .try_extract_array::<f16>()
                .map_err(|err| DetectError::Inference(format!("output `{}`: {}", name, err)))?
                .mapv(f16::to_f32),
        };
        let cols = array.shape().last().copied().unwrap_or(0);
        let rows = if cols == 0 { 0 } else { array.len() / cols };
        array
            .into_shape_with_order((rows, cols))
            .map_err(|err| DetectError::ShapeMismatch(format!("output `{}`: {}", name, err)))
    }

}

impl InferenceEngine for OrtEngine {
    fn infer(&mut self, data: &X, im_info: &Array2<f32>) -> Result<RawDetections, DetectError> {
        let mut inputs: Vec<(Cow<'_, str>, SessionInputValue<'_>)> = vec![(
            Cow::Owned(self.names.data.clone()),
            SessionInputValue::from(Self::tensor_preprocess(data, &self.data_dtype)?),
        )];
        if self.has_im_info {
            let info = Tensor::from_array(im_info.clone()).map_err(DetectError::inference)?;
            inputs.push((
                Cow::Owned(self.names.im_info.clone()),
                SessionInputValue::from(info.into_dyn()),
            ));
        }

        let outputs = self.session.run(inputs).map_err(DetectError::inference)?;

        let fetch = |name: &str| -> Result<Array2<f32>, DetectError> {
            let value = outputs
                .get(name)
                .ok_or_else(|| DetectError::Inference(format!("missing output `{}`", name)))?;
            Self::tensor_postprocess(value, name)
        };
        let rois = fetch(&self.names.rois)?;
        let scores = fetch(&self.names.cls_prob)?;
        let deltas = fetch(&self.names.bbox_pred)?;

        if rois.ncols() < 5 {
            return Err(DetectError::ShapeMismatch(format!(
                "`{}` has {} columns, expected 5",
                self.names.rois,
                rois.ncols()
            )));
        }
        let mut boxes = bbox_pred(rois.slice(s![.., 1..5]), deltas.view())?;
        let (h, w) = data.hw();
        clip_boxes(&mut boxes, h, w);
        log::debug!("{} regions proposed", rois.nrows());

        Ok(RawDetections::new(scores, boxes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_weights_fail_before_runtime_setup() {
        let dir = tempfile::tempdir().unwrap();
        let weights = dir.path().join("resnet-0010.onnx");
        let before = std::env::var_os("ORT_DYLIB_PATH");

        let err = OrtEngine::new(
            &weights,
            InferenceDevice::CPU,
            Some("/nonexistent/libonnxruntime.so"),
            OrtIoNames::from(&ConfigRcnn::default()),
        )
        .unwrap_err();

        assert!(matches!(err, DetectError::ModelNotFound(_)));
        // the library path is handed to `ort`, never to the process environment
        assert_eq!(std::env::var_os("ORT_DYLIB_PATH"), before);
    }
}
