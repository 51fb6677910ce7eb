use std::sync::Arc;
use vmcam_runtime::backends::{EchoRuntime, HandleKind};
use vmcam_runtime::handle;
use vmcam_runtime::ElementType;

#[test]
fn test_handle_releases_on_drop() {
    let runtime = Arc::new(EchoRuntime::new());
    {
        let _device = handle::create_device(&runtime).unwrap();
        assert_eq!(runtime.counts(HandleKind::Device).live(), 1);
    }
    let counts = runtime.counts(HandleKind::Device);
    assert_eq!(counts.created, 1);
    assert_eq!(counts.released, 1);
}

#[test]
fn test_explicit_release_is_not_repeated_on_drop() {
    let runtime = Arc::new(EchoRuntime::new());
    let buffer = handle::create_data_buffer(&runtime, b"program").unwrap();
    buffer.release();

    assert_eq!(runtime.counts(HandleKind::DataBuffer).released, 1);
    assert_eq!(runtime.live_handles(), 0);
}

#[test]
fn test_handle_released_on_early_return() {
    fn build(runtime: &Arc<EchoRuntime>) -> Result<(), vmcam_runtime::RuntimeError> {
        let _ok = handle::create_tensor(runtime, &[0u8; 4], &[1, 1, 4], ElementType::U8)?;
        // Wrong byte count for the shape: fails after the first tensor exists
        let _bad = handle::create_tensor(runtime, &[0u8; 3], &[1, 1, 4], ElementType::U8)?;
        Ok(())
    }

    let runtime = Arc::new(EchoRuntime::new());
    assert!(build(&runtime).is_err());
    let counts = runtime.counts(HandleKind::Tensor);
    assert_eq!(counts.created, 1);
    assert_eq!(counts.released, 1);
}

#[test]
fn test_handle_deref_reaches_runtime_value() {
    let runtime = Arc::new(EchoRuntime::new());
    let tensor = handle::create_tensor(&runtime, &[1, 2, 3, 4], &[1, 1, 4], ElementType::U8).unwrap();
    use vmcam_runtime::Runtime;
    assert_eq!(runtime.tensor_shape(&tensor), vec![1, 1, 4]);
    assert_eq!(runtime.to_flat_array(&tensor).unwrap(), vec![1, 2, 3, 4]);
}
