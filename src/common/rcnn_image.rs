use std::path::{Path, PathBuf};
use image::{DynamicImage, RgbImage};
use crate::error::DetectError;

/// A decoded source image together with the file it came from.
#[derive(Debug, Clone)]
pub struct RcnnImage {
    pub image: RgbImage,
    pub path: PathBuf,
}

impl std::ops::Deref for RcnnImage {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl RcnnImage {
    /// Loads an image as 3-channel RGB. Alpha is dropped and grayscale is expanded.
    ///
    /// A missing file is reported as [`DetectError::ImageNotFound`] before any decoding.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DetectError> {
        let path = path.as_ref();
        Self::ensure_exists(path)?;
        let image = image::open(path)?.to_rgb8();
        log::debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
        Ok(Self {
            image,
            path: path.to_path_buf(),
        })
    }

    pub fn ensure_exists(path: &Path) -> Result<(), DetectError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(DetectError::ImageNotFound(path.to_path_buf()))
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.image.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn missing_file_is_reported_by_path() {
        let err = RcnnImage::open("does/not/exist.jpg").unwrap_err();
        assert!(matches!(err, DetectError::ImageNotFound(_)));
        assert_eq!(err.to_string(), "does/not/exist.jpg not found");
    }

    #[test]
    fn alpha_channel_is_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgba.png");
        RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 128])).save(&path).unwrap();

        let img = RcnnImage::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30]);
    }
}
