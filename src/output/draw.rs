use std::path::{Path, PathBuf};
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use crate::common::{RcnnDetection, VocClass};
use crate::detection_runners::ort_detector::image_ops::transform_inverse;
use crate::detection_runners::DetectionOutput;
use crate::error::DetectError;

const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const BOX_THICKNESS: i32 = 2;

/// Places a TrueType font is commonly installed.
const SYSTEM_FONTS: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Box colour by class group.
pub fn class_colour(class_id: usize) -> Rgb<u8> {
    match VocClass::from_index(class_id) {
        Some(VocClass::Person) => Rgb([128, 0, 128]),
        Some(
            VocClass::Aeroplane
            | VocClass::Bicycle
            | VocClass::Boat
            | VocClass::Bus
            | VocClass::Car
            | VocClass::Motorbike
            | VocClass::Train,
        ) => Rgb([0, 255, 0]),
        Some(
            VocClass::Bird
            | VocClass::Cat
            | VocClass::Cow
            | VocClass::Dog
            | VocClass::Horse
            | VocClass::Sheep,
        ) => Rgb([255, 0, 0]),
        _ => Rgb([0, 0, 255]),
    }
}

/// `cat.jpg` -> `cat_result.jpg`; a path without extension gets `_result.png`.
pub fn result_path(image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match image_path.extension() {
        Some(ext) => format!("{}_result.{}", stem, ext.to_string_lossy()),
        None => format!("{}_result.png", stem),
    };
    image_path.with_file_name(file_name)
}

/// Draws detection boxes and labels onto images.
pub struct Draw {
    font: Option<FontVec>,
    font_size: f32,
}

impl Default for Draw {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Draw {
    /// Loads `font_path`, or the first font found in common system locations.
    /// Without a font, boxes are drawn without text.
    pub fn new(font_path: Option<&str>) -> Self {
        let font = match font_path {
            Some(path) => Self::load_font(Path::new(path)),
            None => SYSTEM_FONTS.iter().find_map(|p| Self::load_font(Path::new(p))),
        };
        if font.is_none() {
            log::warn!("No usable TrueType font found, labels will not be drawn");
        }
        Self {
            font,
            font_size: LABEL_FONT_SIZE,
        }
    }

    fn load_font(path: &Path) -> Option<FontVec> {
        let data = std::fs::read(path).ok()?;
        match FontVec::try_from_vec(data) {
            Ok(font) => Some(font),
            Err(err) => {
                log::warn!("Cannot parse font {}: {}", path.display(), err);
                None
            }
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draws one detection. `bbox_scale` maps its box into `image` coordinates.
    pub fn draw_detection(&self, image: &mut RgbImage, det: &RcnnDetection, bbox_scale: f32) {
        let (w, h) = (image.width() as i32, image.height() as i32);
        if w == 0 || h == 0 {
            return;
        }
        let (x1, y1, x2, y2) = det.bbox.scale(bbox_scale).as_x1y1_x2y2_i32();
        let (x1, x2) = (x1.clamp(0, w - 1), x2.clamp(0, w - 1));
        let (y1, y2) = (y1.clamp(0, h - 1), y2.clamp(0, h - 1));
        let colour = class_colour(det.class_id);

        for t in 0..BOX_THICKNESS {
            let rw = (x2 - x1 - 2 * t).max(1) as u32;
            let rh = (y2 - y1 - 2 * t).max(1) as u32;
            draw_hollow_rect_mut(image, Rect::at(x1 + t, y1 + t).of_size(rw, rh), colour);
        }

        if let Some(font) = &self.font {
            let label = format!("{} {:.3}", det.label, det.confidence);
            let scale = PxScale::from(self.font_size);
            let (tw, th) = text_size(scale, font, &label);
            let th = th as i32 + 2 * LABEL_TEXT_VERTICAL_PADDING;
            let label_y = (y1 - th).max(0);
            let label_w = (tw as i32).min(w - x1).max(1) as u32;
            draw_filled_rect_mut(image, Rect::at(x1, label_y).of_size(label_w, th as u32), colour);
            draw_text_mut(
                image,
                Rgb([255u8, 255u8, 255u8]),
                x1,
                label_y + LABEL_TEXT_VERTICAL_PADDING,
                scale,
                font,
                &label,
            );
        }
    }

    /// Rebuilds the resized image and draws every surviving detection on it.
    pub fn render(&self, output: &DetectionOutput, pixel_means: [f32; 3]) -> Result<RgbImage, DetectError> {
        let mut image = transform_inverse(&output.tensor, pixel_means)?;
        let scale = output.record.scale();
        for det in output.detections.flatten() {
            self.draw_detection(&mut image, det, scale);
        }
        Ok(image)
    }

    /// Renders and saves next to `image_path`, returning the written path.
    pub fn save_visualization(
        &self,
        output: &DetectionOutput,
        pixel_means: [f32; 3],
        image_path: &Path,
    ) -> Result<PathBuf, DetectError> {
        let image = self.render(output, pixel_means)?;
        let path = result_path(image_path);
        image.save(&path)?;
        log::info!("results saved to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_result_paths() {
        assert_eq!(result_path(Path::new("cat.jpg")), PathBuf::from("cat_result.jpg"));
        assert_eq!(
            result_path(Path::new("imgs/my.photo.png")),
            PathBuf::from("imgs/my.photo_result.png")
        );
        assert_eq!(result_path(Path::new("imgs/raw")), PathBuf::from("imgs/raw_result.png"));
    }

    #[test]
    fn colours_group_classes() {
        assert_eq!(class_colour(VocClass::Person.index()), Rgb([128, 0, 128]));
        assert_eq!(class_colour(VocClass::Car.index()), class_colour(VocClass::Bus.index()));
        assert_eq!(class_colour(VocClass::Dog.index()), Rgb([255, 0, 0]));
        assert_eq!(class_colour(99), Rgb([0, 0, 255]));
    }
}
