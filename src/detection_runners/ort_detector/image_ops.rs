//! Functions to preprocess images.

use fast_image_resize::{
    images::Image as FirImage,
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::{DynamicImage, RgbImage};
use ndarray::{Array4, Axis};
use crate::data::ConfigRcnn;
use crate::detection_runners::input_wrapper::X;
use crate::error::DetectError;

/// Size of the network input and the factor the source image was resized by.
///
/// Produced once per image by [`Preprocessor::preprocess`] and passed through
/// to postprocessing unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRecord {
    height: usize,
    width: usize,
    scale: f32,
}

impl ScaleRecord {
    pub fn new(height: usize, width: usize, scale: f32) -> Result<Self, DetectError> {
        if !(scale > 0.) || !scale.is_finite() {
            return Err(DetectError::InvalidImage(format!(
                "scale factor must be positive and finite, got {}",
                scale
            )));
        }
        Ok(Self { height, width, scale })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

pub fn make_divisible(x: usize, divisor: usize) -> usize {
    x.div_ceil(divisor) * divisor
}

/// Factor that brings the short side to `short_side` without letting the
/// long side exceed `long_side`.
pub fn compute_scale(height: u32, width: u32, short_side: u32, long_side: u32) -> f32 {
    let im_min = height.min(width) as f32;
    let im_max = height.max(width) as f32;
    let scale = short_side as f32 / im_min;
    scale.min(long_side as f32 / im_max)
}

/// Image to tensor conversion for the detector.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    short_side: u32,
    long_side: u32,
    pixel_means: [f32; 3],
    stride: usize,
}

impl Preprocessor {
    pub fn new(config: &ConfigRcnn) -> Self {
        Self {
            short_side: config.short_side,
            long_side: config.long_side,
            pixel_means: config.pixel_means,
            stride: config.image_stride,
        }
    }

    pub fn pixel_means(&self) -> [f32; 3] {
        self.pixel_means
    }

    /// Resizes, mean-subtracts and lays the image out as `[1, 3, H, W]`.
    ///
    /// The caller's image is not modified.
    pub fn preprocess(&self, image: &DynamicImage) -> Result<(X, ScaleRecord), DetectError> {
        let channels = image.color().channel_count();
        if channels != 3 {
            return Err(DetectError::InvalidImage(format!(
                "expected 3 colour channels, got {}",
                channels
            )));
        }
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(DetectError::InvalidImage(format!(
                "image has zero area ({}x{})",
                width, height
            )));
        }

        let scale = compute_scale(height, width, self.short_side, self.long_side);
        let new_h = ((height as f32 * scale).round() as u32).max(1);
        let new_w = ((width as f32 * scale).round() as u32).max(1);
        let resized = resize_rgb(image.to_rgb8(), new_w, new_h, scale)?;

        let x = self.to_tensor(&resized);
        let (h, w) = x.hw();
        log::debug!("Preprocessed {}x{} -> {}x{} (scale {:.4})", width, height, w, h, scale);
        let record = ScaleRecord::new(h, w, scale)?;
        Ok((x, record))
    }

    /// Subtracts the channel means and writes the image into an NCHW tensor.
    /// With a stride set, height and width are padded with black pixels to the next multiple.
    fn to_tensor(&self, img: &RgbImage) -> X {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let (pad_h, pad_w) = if self.stride > 0 {
            (make_divisible(h, self.stride), make_divisible(w, self.stride))
        } else {
            (h, w)
        };

        let means = self.pixel_means;
        let mut tensor = Array4::from_shape_fn((1, 3, pad_h, pad_w), |(_, c, _, _)| -means[c]);
        for (x, y, pixel) in img.enumerate_pixels() {
            for c in 0..3 {
                tensor[[0, c, y as usize, x as usize]] = pixel.0[c] as f32 - means[c];
            }
        }
        X::from(tensor)
    }
}

/// Resizes with an area-style box filter when shrinking and bilinear when enlarging.
fn resize_rgb(img: RgbImage, new_w: u32, new_h: u32, scale: f32) -> Result<RgbImage, DetectError> {
    let (width, height) = img.dimensions();
    if (width, height) == (new_w, new_h) {
        return Ok(img);
    }

    let alg = if scale < 1. {
        ResizeAlg::Convolution(FilterType::Box)
    } else {
        ResizeAlg::Convolution(FilterType::Bilinear)
    };
    let options = ResizeOptions::new().resize_alg(alg);

    let src = FirImage::from_vec_u8(width, height, img.into_raw(), PixelType::U8x3)
        .map_err(|err| DetectError::InvalidImage(err.to_string()))?;
    let mut dst = FirImage::new(new_w, new_h, PixelType::U8x3);
    let mut resizer = Resizer::new();
    resizer
        .resize(&src, &mut dst, &options)
        .map_err(|err| DetectError::InvalidImage(err.to_string()))?;

    RgbImage::from_raw(new_w, new_h, dst.buffer().to_vec())
        .ok_or_else(|| DetectError::InvalidImage("resized buffer has the wrong length".to_string()))
}

/// Rebuilds the resized RGB image from a preprocessed tensor by adding the
/// channel means back and clamping to `[0, 255]`.
pub fn transform_inverse(x: &X, pixel_means: [f32; 3]) -> Result<RgbImage, DetectError> {
    let (n, c, h, w) = x.dim();
    if n < 1 || c != 3 {
        return Err(DetectError::ShapeMismatch(format!(
            "expected a [1, 3, H, W] tensor, got [{}, {}, {}, {}]",
            n, c, h, w
        )));
    }
    let first = x.index_axis(Axis(0), 0);
    let img = RgbImage::from_fn(w as u32, h as u32, |px, py| {
        let mut rgb = [0u8; 3];
        for (ch, value) in rgb.iter_mut().enumerate() {
            let v = first[[ch, py as usize, px as usize]] + pixel_means[ch];
            *value = v.round().clamp(0., 255.) as u8;
        }
        image::Rgb(rgb)
    });
    Ok(img)
}
