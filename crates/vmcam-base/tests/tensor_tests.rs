use vmcam_base::{Tensor, TensorError};

#[test]
fn test_tensor_new_valid() {
    let tensor = Tensor::new(vec![2, 3], vec![1u8, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(tensor.shape, vec![2, 3]);
    assert_eq!(tensor.data, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_tensor_new_shape_mismatch() {
    let result = Tensor::new(vec![2, 3], vec![1u8, 2, 3]);
    assert_eq!(
        result.unwrap_err(),
        TensorError::ShapeMismatch {
            expected: 6,
            got: 3
        }
    );
}

#[test]
fn test_tensor_new_overflow() {
    let result = Tensor::<u8>::new(vec![usize::MAX, 2], vec![]);
    assert!(matches!(result, Err(TensorError::ShapeOverflow)));
}

#[test]
fn test_tensor_zeros() {
    let tensor = Tensor::<u8>::zeros(vec![2, 2, 4]).unwrap();
    assert_eq!(tensor.len(), 16);
    assert!(tensor.data.iter().all(|&v| v == 0));
}

#[test]
fn test_tensor_from_hwc() {
    let tensor = Tensor::from_hwc(2, 3, 4, vec![0u8; 24]).unwrap();
    assert_eq!(tensor.shape, vec![2, 3, 4]);
    assert_eq!(tensor.hwc().unwrap(), (2, 3, 4));
    assert_eq!(tensor.ndim(), 3);
}

#[test]
fn test_tensor_hwc_rejects_other_ranks() {
    let tensor = Tensor::new(vec![6], vec![0u8; 6]).unwrap();
    assert!(matches!(tensor.hwc(), Err(TensorError::Layout(_))));
}

#[test]
fn test_tensor_is_empty() {
    let empty = Tensor::<u8>::new(vec![0, 4, 4], vec![]).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_tensor_error_display() {
    let err = TensorError::ShapeMismatch {
        expected: 12,
        got: 9,
    };
    assert_eq!(err.to_string(), "shape mismatch: expected 12 elements, got 9");
}
