use ndarray::{s, ArrayView2, Axis};
use crate::common::{ClassVocabulary, RcnnBox, RcnnDetection};
use crate::data::{ClassDetections, ConfigRcnn, ScaleRecord};
use crate::detection_runners::ort_detector::nms::nms;
use crate::error::DetectError;

/// Turns raw per-region scores and per-class boxes into final detections.
#[derive(Debug, Clone)]
pub struct Postprocessor {
    conf_thresh: f32,
    nms_thresh: f32,
    classes: ClassVocabulary,
}

impl Postprocessor {
    pub fn new(config: &ConfigRcnn, classes: ClassVocabulary) -> Self {
        Self {
            conf_thresh: config.conf_thresh,
            nms_thresh: config.nms_thresh,
            classes,
        }
    }

    /// Thresholds, suppresses and rescales each foreground class independently.
    ///
    /// `scores` is `[N, C]` and `boxes` is `[N, 4C]` in network coordinates,
    /// where `C` is the vocabulary size. Returned boxes are in source image coordinates.
    pub fn postprocess(
        &self,
        scores: ArrayView2<f32>,
        boxes: ArrayView2<f32>,
        record: &ScaleRecord,
    ) -> Result<ClassDetections, DetectError> {
        let nc = self.classes.len();
        let (n_scores, score_cols) = scores.dim();
        let (n_boxes, box_cols) = boxes.dim();
        if score_cols != nc {
            return Err(DetectError::ShapeMismatch(format!(
                "scores have {} columns, expected one per class ({})",
                score_cols, nc
            )));
        }
        if box_cols != 4 * nc {
            return Err(DetectError::ShapeMismatch(format!(
                "boxes have {} columns, expected {} (4 per class)",
                box_cols,
                4 * nc
            )));
        }
        if n_scores != n_boxes {
            return Err(DetectError::ShapeMismatch(format!(
                "scores have {} rows but boxes have {}",
                n_scores, n_boxes
            )));
        }

        let mut ys = ClassDetections::new(nc);
        for class_id in self.classes.foreground_ids() {
            let label = self.classes.name(class_id).unwrap_or_default();
            let cls_scores = scores.index_axis(Axis(1), class_id);
            let cls_boxes = boxes.slice(s![.., 4 * class_id..4 * (class_id + 1)]);

            // NaN fails the comparison and is never kept
            let mut dets: Vec<RcnnDetection> = cls_scores
                .iter()
                .zip(cls_boxes.rows())
                .filter(|(score, _)| **score >= self.conf_thresh)
                .map(|(&score, row)| {
                    let bbox = RcnnBox::new(row[0], row[1], row[2], row[3]);
                    RcnnDetection::new(class_id, label, score, bbox)
                })
                .collect();
            if dets.is_empty() {
                continue;
            }

            nms(&mut dets, self.nms_thresh);
            for det in dets.iter_mut() {
                det.bbox = det.bbox.rescale(record.scale());
            }
            log::trace!("{}: {} detection(s)", label, dets.len());
            ys.set_class(class_id, dets);
        }
        Ok(ys)
    }
}
