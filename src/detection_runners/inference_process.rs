use std::time::Instant;
use crate::error::DetectError;
use crate::utils;

pub trait InferenceProcess {
    type Input;
    type Preprocessed;
    type Raw;
    type Output;

    /// Pre-process the input data.
    fn preprocess(&self, x: &Self::Input) -> Result<Self::Preprocessed, DetectError>;

    /// Executes the model on the preprocessed data.
    fn inference(&mut self, xs: &Self::Preprocessed) -> Result<Self::Raw, DetectError>;

    /// Post-process the model's output.
    fn postprocess(&self, ys: Self::Raw, xs: Self::Preprocessed) -> Result<Self::Output, DetectError>;

    /// Executes the full pipeline, timing each stage.
    fn forward(&mut self, x: &Self::Input, profile: bool) -> Result<Self::Output, DetectError> {
        let detect_time = Instant::now();
        let mut _detect_elapsed = detect_time.elapsed();

        let t_pre = Instant::now();
        let xs = self.preprocess(x)?;
        let t_pre = t_pre.elapsed();
        _detect_elapsed = utils::trace(profile, "TIME", "Preprocessing input", detect_time, _detect_elapsed);

        let t_exe = Instant::now();
        let ys = self.inference(&xs)?;
        let t_exe = t_exe.elapsed();
        _detect_elapsed = utils::trace(profile, "TIME", "Detection run", detect_time, _detect_elapsed);

        let t_post = Instant::now();
        let ys = self.postprocess(ys, xs)?;
        let t_post = t_post.elapsed();
        utils::trace(profile, "TIME", "Postprocessing", detect_time, _detect_elapsed);

        if profile {
            log::info!("> Preprocess: {t_pre:?} | Inference: {t_exe:?} | Postprocess: {t_post:?}");
        }

        Ok(ys)
    }
}
