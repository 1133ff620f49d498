use std::sync::Arc;
use ndarray::Array2;
use parking_lot::Mutex;
use crate::data::X;
use crate::error::DetectError;

/// Raw network output for one image, in network (resized image) coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDetections {
    /// `[N, C]` class probabilities per region.
    pub scores: Array2<f32>,
    /// `[N, 4C]` per-class `(x1, y1, x2, y2)` boxes per region.
    pub boxes: Array2<f32>,
}

impl RawDetections {
    pub fn new(scores: Array2<f32>, boxes: Array2<f32>) -> Self {
        Self { scores, boxes }
    }

    pub fn num_regions(&self) -> usize {
        self.scores.nrows()
    }
}

/// Runs the detection network on one preprocessed image.
pub trait InferenceEngine {
    /// `data` is the `[1, 3, H, W]` tensor and `im_info` the `[1, 3]`
    /// `(H, W, scale)` companion input.
    fn infer(&mut self, data: &X, im_info: &Array2<f32>) -> Result<RawDetections, DetectError>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn infer(&mut self, data: &X, im_info: &Array2<f32>) -> Result<RawDetections, DetectError> {
        (**self).infer(data, im_info)
    }
}

/// Cloneable handle to one engine. Calls from any clone are serialized.
#[derive(Debug)]
pub struct SharedEngine<E> {
    inner: Arc<Mutex<E>>,
}

impl<E> Clone for SharedEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: InferenceEngine> SharedEngine<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Runs `f` with exclusive access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

impl<E: InferenceEngine> InferenceEngine for SharedEngine<E> {
    fn infer(&mut self, data: &X, im_info: &Array2<f32>) -> Result<RawDetections, DetectError> {
        self.inner.lock().infer(data, im_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use ndarray::Array4;

    /// Records how many callers are inside `infer` at once.
    struct Probe {
        active: Arc<AtomicUsize>,
        max_seen: Arc<AtomicUsize>,
    }

    impl InferenceEngine for Probe {
        fn infer(&mut self, _data: &X, _im_info: &Array2<f32>) -> Result<RawDetections, DetectError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(RawDetections::default())
        }
    }

    #[test]
    fn shared_engine_serializes_calls() {
        let max_seen = Arc::new(AtomicUsize::new(0));
        let engine = SharedEngine::new(Probe {
            active: Arc::new(AtomicUsize::new(0)),
            max_seen: Arc::clone(&max_seen),
        });

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mut engine = engine.clone();
                thread::spawn(move || {
                    let x = X::from(Array4::<f32>::zeros((1, 3, 2, 2)));
                    for _ in 0..3 {
                        engine.infer(&x, &x.im_info(1.)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
