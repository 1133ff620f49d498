use ndarray::{arr2, Array, Array2, Array4, Ix4, IxDyn};
use crate::error::DetectError;

/// Network input, wrapper over an `NCHW` [`Array4<f32>`] with batch size 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct X(pub Array4<f32>);

impl From<Array4<f32>> for X {
    fn from(x: Array4<f32>) -> Self {
        Self(x)
    }
}

impl TryFrom<Array<f32, IxDyn>> for X {
    type Error = DetectError;

    fn try_from(x: Array<f32, IxDyn>) -> Result<Self, Self::Error> {
        let ndim = x.ndim();
        x.into_dimensionality::<Ix4>()
            .map(Self)
            .map_err(|_| DetectError::ShapeMismatch(format!("expected a 4-d NCHW tensor, got {} dims", ndim)))
    }
}

impl std::ops::Deref for X {
    type Target = Array4<f32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl X {
    pub fn from_shape_vec(shape: (usize, usize, usize, usize), xs: Vec<f32>) -> Result<Self, DetectError> {
        Ok(Self::from(Array::from_shape_vec(shape, xs)?))
    }

    /// Spatial size `(height, width)` of the tensor.
    pub fn hw(&self) -> (usize, usize) {
        let (_, _, h, w) = self.0.dim();
        (h, w)
    }

    /// The `[1, 3]` companion input `(height, width, scale)` the detector expects.
    pub fn im_info(&self, scale: f32) -> Array2<f32> {
        let (h, w) = self.hw();
        arr2(&[[h as f32, w as f32, scale]])
    }

    pub fn into_dyn(self) -> Array<f32, IxDyn> {
        self.0.into_dyn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn im_info_reports_tensor_dims() {
        let x = X::from(Array4::<f32>::zeros((1, 3, 600, 800)));
        let info = x.im_info(1.25);
        assert_eq!(info.shape(), &[1, 3]);
        assert_eq!(info.row(0).to_vec(), vec![600., 800., 1.25]);
    }

    #[test]
    fn rejects_non_nchw() {
        let flat = Array::<f32, _>::zeros(IxDyn(&[3, 4]));
        assert!(X::try_from(flat).is_err());
    }
}
