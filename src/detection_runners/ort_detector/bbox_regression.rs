//! Applies the second stage's box regression deltas to the proposals.

use ndarray::{Array2, ArrayView2};
use crate::error::DetectError;

/// Decodes per-class `(dx, dy, dw, dh)` deltas against `rois`.
///
/// `rois` is `[N, 4]` as `(x1, y1, x2, y2)`, `deltas` is `[N, 4C]`. Widths and
/// heights use the inclusive pixel convention (`x2 - x1 + 1`).
pub fn bbox_pred(rois: ArrayView2<f32>, deltas: ArrayView2<f32>) -> Result<Array2<f32>, DetectError> {
    let (n, roi_cols) = rois.dim();
    let (n_deltas, delta_cols) = deltas.dim();
    if roi_cols != 4 || n != n_deltas || delta_cols % 4 != 0 {
        return Err(DetectError::ShapeMismatch(format!(
            "cannot apply deltas [{}, {}] to rois [{}, {}]",
            n_deltas, delta_cols, n, roi_cols
        )));
    }

    let mut pred = Array2::<f32>::zeros((n, delta_cols));
    for i in 0..n {
        let width = rois[[i, 2]] - rois[[i, 0]] + 1.;
        let height = rois[[i, 3]] - rois[[i, 1]] + 1.;
        let ctr_x = rois[[i, 0]] + 0.5 * (width - 1.);
        let ctr_y = rois[[i, 1]] + 0.5 * (height - 1.);

        for k in (0..delta_cols).step_by(4) {
            let (dx, dy, dw, dh) = (deltas[[i, k]], deltas[[i, k + 1]], deltas[[i, k + 2]], deltas[[i, k + 3]]);
            let pred_ctr_x = dx * width + ctr_x;
            let pred_ctr_y = dy * height + ctr_y;
            let pred_w = dw.exp() * width;
            let pred_h = dh.exp() * height;

            pred[[i, k]] = pred_ctr_x - 0.5 * (pred_w - 1.);
            pred[[i, k + 1]] = pred_ctr_y - 0.5 * (pred_h - 1.);
            pred[[i, k + 2]] = pred_ctr_x + 0.5 * (pred_w - 1.);
            pred[[i, k + 3]] = pred_ctr_y + 0.5 * (pred_h - 1.);
        }
    }
    Ok(pred)
}

/// Clamps every `(x1, y1, x2, y2)` group to `[0, width - 1] x [0, height - 1]`.
pub fn clip_boxes(boxes: &mut Array2<f32>, height: usize, width: usize) {
    let max_x = (width as f32 - 1.).max(0.);
    let max_y = (height as f32 - 1.).max(0.);
    for mut row in boxes.rows_mut() {
        for (k, v) in row.iter_mut().enumerate() {
            let max = if k % 2 == 0 { max_x } else { max_y };
            *v = v.clamp(0., max);
        }
    }
}
