use crate::common::{RcnnDetection, BACKGROUND_ID};

/// Detections for one image, grouped by class id.
///
/// Slot `i` holds the survivors for class `i` in descending-confidence order.
/// The background slot is always empty.
#[derive(Clone, PartialEq, Default)]
pub struct ClassDetections {
    per_class: Vec<Vec<RcnnDetection>>,
}

impl std::fmt::Debug for ClassDetections {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut f = f.debug_map();
        for (class_id, dets) in self.iter() {
            f.entry(&class_id, &dets);
        }
        f.finish()
    }
}

impl ClassDetections {
    /// Creates an empty container with one slot per class.
    pub fn new(num_classes: usize) -> Self {
        Self {
            per_class: vec![Vec::new(); num_classes],
        }
    }

    /// Stores the survivors for `class_id`. Entries for the background class are dropped.
    ///
    /// # Arguments
    ///
    /// * `class_id` - Column index of the class.
    /// * `detections` - Detections sorted by descending confidence.
    pub fn set_class(&mut self, class_id: usize, detections: Vec<RcnnDetection>) {
        if class_id == BACKGROUND_ID {
            return;
        }
        if class_id >= self.per_class.len() {
            self.per_class.resize(class_id + 1, Vec::new());
        }
        self.per_class[class_id] = detections;
    }

    pub fn num_classes(&self) -> usize {
        self.per_class.len()
    }

    pub fn class(&self, class_id: usize) -> &[RcnnDetection] {
        self.per_class.get(class_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Classes with at least one detection, in class order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[RcnnDetection])> {
        self.per_class
            .iter()
            .enumerate()
            .filter(|(_, dets)| !dets.is_empty())
            .map(|(class_id, dets)| (class_id, dets.as_slice()))
    }

    /// Highest-scoring detection of every non-empty class.
    pub fn top1(&self) -> Vec<&RcnnDetection> {
        self.iter().filter_map(|(_, dets)| dets.first()).collect()
    }

    /// Every detection, class by class.
    pub fn flatten(&self) -> Vec<&RcnnDetection> {
        self.per_class.iter().flatten().collect()
    }

    pub fn len(&self) -> usize {
        self.per_class.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logs every non-empty class as `[[x1, y1, x2, y2, confidence]]` rows.
    pub fn log_summary(&self) {
        log::info!("---class---");
        log::info!("[[x1, y1, x2, y2, confidence]]");
        for (_, dets) in self.iter() {
            log::info!("---{}---", dets[0].label);
            let rows: Vec<String> = dets
                .iter()
                .map(|d| {
                    let [x1, y1, x2, y2, conf] = d.as_row();
                    format!("[{:.2}, {:.2}, {:.2}, {:.2}, {:.3}]", x1, y1, x2, y2, conf)
                })
                .collect();
            log::info!("[{}]", rows.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RcnnBox;

    fn det(class_id: usize, label: &str, conf: f32) -> RcnnDetection {
        RcnnDetection::new(class_id, label, conf, RcnnBox::new(0., 0., 1., 1.))
    }

    #[test]
    fn top1_in_class_order() {
        let mut ys = ClassDetections::new(4);
        ys.set_class(3, vec![det(3, "c", 0.9), det(3, "c", 0.8)]);
        ys.set_class(1, vec![det(1, "a", 0.75)]);
        ys.set_class(0, vec![det(0, "bg", 0.99)]);

        let top: Vec<(usize, f32)> = ys.top1().iter().map(|d| (d.class_id, d.confidence)).collect();
        assert_eq!(top, vec![(1, 0.75), (3, 0.9)]);
        assert_eq!(ys.len(), 3);
        assert!(ys.class(0).is_empty());
        assert!(ys.class(17).is_empty());
    }
}
