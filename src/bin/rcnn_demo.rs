use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rcnn_detect::{
    common::{InferenceDevice, ModelConfig, ModelType, RcnnImage},
    data::ConfigRcnn,
    output::{to_json_string, Draw},
    DetectOutcome, OutputMode,
};

/// Demonstrate a Faster R-CNN network
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image to run detection on
    #[arg(long, value_name = "FILE")]
    pub image: PathBuf,
    /// Pretrained backbone
    #[arg(long, default_value = "resnet", value_parser = parse_model_type)]
    pub model_type: ModelType,
    /// Saved model prefix; `<prefix>-<epoch:04>.onnx` is loaded instead of the cache
    #[arg(long)]
    pub prefix: Option<String>,
    /// Epoch of the pretrained model
    #[arg(long, default_value = "10")]
    pub epoch: u32,
    /// GPU device to use; CPU when omitted
    #[arg(long, value_name = "ID")]
    pub gpu: Option<usize>,
    /// Save an annotated image instead of printing JSON
    #[arg(long)]
    pub vis: bool,
    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[arg(long, value_name = "THRESHOLD")]
    pub conf_thresh: Option<f32>,
    #[arg(long, value_name = "THRESHOLD")]
    pub nms_thresh: Option<f32>,
    /// Path to the onnxruntime shared library
    #[arg(long, value_name = "FILE")]
    pub ort_lib: Option<String>,
    /// TrueType font for labels
    #[arg(long, value_name = "FILE")]
    pub font: Option<String>,
    /// Where missing weights are downloaded from
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
    /// Log per-stage timings
    #[arg(long)]
    pub profile: bool,
}

fn parse_model_type(s: &str) -> std::result::Result<ModelType, String> {
    ModelType::from_str(s).ok_or_else(|| format!("unknown model type `{}` (expected resnet or vgg)", s))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // fail fast, before any weights are fetched or loaded
    RcnnImage::ensure_exists(&args.image)?;

    let mut config = match &args.config {
        Some(path) => ConfigRcnn::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConfigRcnn::default(),
    };
    if let Some(x) = args.conf_thresh {
        config = config.with_conf_thresh(x);
    }
    if let Some(x) = args.nms_thresh {
        config = config.with_nms_thresh(x);
    }
    if let Some(font) = &args.font {
        config = config.with_font_path(font);
    }
    let profile = config.profile || args.profile;
    config = config.with_profile(profile);

    let mut model = ModelConfig::new(args.model_type, args.epoch, InferenceDevice::from_gpu_flag(args.gpu));
    model.prefix = args.prefix.clone();
    model.ort_lib_path = args.ort_lib.clone();
    if let Some(url) = &args.base_url {
        model.weights_base_url = url.clone();
    }
    log::info!("{}", model.to_string());

    let draw = args.vis.then(|| Draw::new(config.font_path.as_deref()));
    let mut detector = rcnn_detect::init_detector(&model, config)?;

    let mode = match &draw {
        Some(draw) => OutputMode::Visualize(draw),
        None => OutputMode::Json,
    };
    match rcnn_detect::detect(&args.image, &mut detector, mode)? {
        DetectOutcome::Json(results) => println!("{}", to_json_string(&results)?),
        DetectOutcome::Visualized { path, detections } => {
            log::info!("{} detection(s) drawn to {}", detections.len(), path.display());
        }
    }

    Ok(())
}
