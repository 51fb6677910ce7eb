use std::fmt;

#[derive(Debug, PartialEq)]
pub enum TensorError {
    ShapeOverflow,
    ShapeMismatch { expected: usize, got: usize },
    Layout(String),
}

impl fmt::Display for TensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorError::ShapeOverflow => write!(f, "shape dimensions overflow when multiplied"),
            TensorError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected} elements, got {got}")
            }
            TensorError::Layout(msg) => write!(f, "layout error: {msg}"),
        }
    }
}

impl std::error::Error for TensorError {}

/// Row-major tensor. Image tensors use HWC layout `[height, width, channels]`.
#[derive(Clone, PartialEq)]
pub struct Tensor<T> {
    pub shape: Vec<usize>,
    pub data: Vec<T>,
}

impl<T: fmt::Debug> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Frames are large, print the shape and element count only
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Product of all dimensions, or `ShapeOverflow`.
pub fn element_count(shape: &[usize]) -> Result<usize, TensorError> {
    shape.iter().try_fold(1usize, |acc, &dim| {
        acc.checked_mul(dim).ok_or(TensorError::ShapeOverflow)
    })
}

impl<T> Tensor<T> {
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> Result<Self, TensorError> {
        let expected = element_count(&shape)?;
        if expected != data.len() {
            return Err(TensorError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }

        Ok(Self { shape, data })
    }

    /// Build an image tensor with shape `[height, width, channels]`.
    pub fn from_hwc(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<T>,
    ) -> Result<Self, TensorError> {
        Self::new(vec![height, width, channels], data)
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `(height, width, channels)` for a rank-3 image tensor.
    pub fn hwc(&self) -> Result<(usize, usize, usize), TensorError> {
        match self.shape.as_slice() {
            &[h, w, c] => Ok((h, w, c)),
            other => Err(TensorError::Layout(format!(
                "expected [height, width, channels], got {other:?}"
            ))),
        }
    }
}

impl<T: Default + Clone> Tensor<T> {
    pub fn zeros(shape: Vec<usize>) -> Result<Self, TensorError> {
        let count = element_count(&shape)?;
        Ok(Self {
            shape,
            data: vec![T::default(); count],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count_empty_shape_is_scalar() {
        assert_eq!(element_count(&[]), Ok(1));
    }

    #[test]
    fn test_debug_omits_data() {
        let tensor = Tensor::new(vec![1, 2, 4], vec![7u8; 8]).unwrap();
        let debug = format!("{tensor:?}");
        assert!(debug.contains("[1, 2, 4]"));
        assert!(!debug.contains("7, 7"));
    }
}
