pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
}

/// Greedy non-maximum suppression, in place.
///
/// Candidates are stable-sorted by descending confidence, so equal scores keep
/// their input order. A candidate is kept unless its IoU with an already kept
/// one exceeds `iou_threshold`. Survivors are left in descending-confidence order.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
    boxes.sort_by(|b1, b2| b2.confidence().total_cmp(&b1.confidence()));
    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = boxes[prev_index].iou(&boxes[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{RcnnBox, RcnnDetection};

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, conf: f32) -> RcnnDetection {
        RcnnDetection::new(1, "a", conf, RcnnBox::new(x1, y1, x2, y2))
    }

    #[test]
    fn suppresses_overlapping_lower_score() {
        let mut dets = vec![
            det(12., 12., 52., 52., 0.8),
            det(100., 100., 150., 150., 0.75),
            det(10., 10., 50., 50., 0.9),
        ];
        nms(&mut dets, 0.3);
        let confs: Vec<f32> = dets.iter().map(|d| d.confidence).collect();
        assert_eq!(confs, vec![0.9, 0.75]);
    }

    #[test]
    fn nms_is_idempotent() {
        let mut dets = vec![
            det(0., 0., 10., 10., 0.9),
            det(1., 1., 11., 11., 0.85),
            det(5., 5., 15., 15., 0.6),
            det(30., 30., 40., 40., 0.5),
            det(31., 30., 41., 40., 0.5),
        ];
        nms(&mut dets, 0.3);
        let once = dets.clone();
        nms(&mut dets, 0.3);
        assert_eq!(once, dets);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut dets = vec![
            RcnnDetection::new(1, "first", 0.5, RcnnBox::new(0., 0., 10., 10.)),
            RcnnDetection::new(1, "second", 0.5, RcnnBox::new(0., 0., 10., 10.)),
        ];
        nms(&mut dets, 0.3);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label, "first");
    }
}
