//! Downloads pretrained weights into a local cache.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use crate::common::{ModelConfig, ModelType};
use crate::data::FsAccess;
use crate::error::DetectError;
use crate::utils::human_bytes;

/// Makes sure the weights for `model_type`/`epoch` are in `cache_dir`.
///
/// An existing file is used as-is. Otherwise it is downloaded once from
/// `base_url` into a temporary file and moved into place, so an interrupted
/// download never leaves a truncated weight file behind.
pub fn fetch_weights(
    model_type: ModelType,
    epoch: u32,
    cache_dir: &Path,
    base_url: &str,
) -> Result<PathBuf, DetectError> {
    let target = cache_dir.join(model_type.weights_file(epoch));
    if target.is_file() {
        log::debug!("{} already cached", target.display());
        return Ok(target);
    }

    FsAccess::ensure_dir(cache_dir)?;
    let url = model_type.weights_url(base_url, epoch);
    let fail = |reason: String| DetectError::NetworkFetch {
        url: url.clone(),
        reason,
    };

    log::info!("downloading {}", url);
    let response = ureq::get(&url).call().map_err(|err| fail(err.to_string()))?;

    let partial = target.with_extension("onnx.part");
    let written = download_to(response.into_reader(), &partial).map_err(|err| {
        let _ = std::fs::remove_file(&partial);
        fail(err.to_string())
    })?;
    std::fs::rename(&partial, &target)?;
    log::info!("saved {} ({})", target.display(), human_bytes(written as f64));
    Ok(target)
}

fn download_to(mut reader: impl io::Read, path: &Path) -> io::Result<u64> {
    let mut file = BufWriter::new(File::create(path)?);
    let written = io::copy(&mut reader, &mut file)?;
    file.flush()?;
    Ok(written)
}

/// Fetches the weights a [`ModelConfig`] refers to, unless it points at an
/// explicit prefix or fetching is disabled.
pub fn provision(model: &ModelConfig) -> Result<Option<PathBuf>, DetectError> {
    if model.prefix.is_some() || !model.fetch {
        return Ok(None);
    }
    fetch_weights(model.model_type, model.epoch, &model.cache_dir, &model.weights_base_url).map(Some)
}
