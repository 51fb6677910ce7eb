use std::sync::Arc;
use vmcam_runtime::backends::{EchoRuntime, HandleKind};
use vmcam_runtime::{ElementType, RuntimeError, Session, Status, StatusCode};

fn rgba_pixels(width: usize, height: usize) -> Vec<u8> {
    (0..width * height * 4).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_session_open_creates_device_and_vm() {
    let runtime = Arc::new(EchoRuntime::new());
    let session = Session::open(runtime.clone()).unwrap();

    assert_eq!(runtime.counts(HandleKind::Device).live(), 1);
    assert_eq!(runtime.counts(HandleKind::VmInstance).live(), 1);

    session.close();
    assert_eq!(runtime.live_handles(), 0);
}

#[test]
fn test_session_close_releases_exactly_once() {
    let runtime = Arc::new(EchoRuntime::new());
    Session::open(runtime.clone()).unwrap().close();

    for kind in [HandleKind::Device, HandleKind::VmInstance] {
        let counts = runtime.counts(kind);
        assert_eq!((counts.created, counts.released), (1, 1), "{kind:?}");
    }
}

#[test]
fn test_shared_session_released_after_last_reference() {
    let runtime = Arc::new(EchoRuntime::new());
    let session = Arc::new(Session::open(runtime.clone()).unwrap());
    let in_flight = session.clone();

    drop(session);
    assert_eq!(runtime.counts(HandleKind::Device).live(), 1);

    drop(in_flight);
    assert_eq!(runtime.live_handles(), 0);
}

#[test]
fn test_call_echoes_input() {
    let runtime = Arc::new(EchoRuntime::new());
    let session = Session::open(runtime.clone()).unwrap();
    let pixels = rgba_pixels(3, 2);

    let bytecode = session.create_data_buffer(b"\x00\x01\x02").unwrap();
    let input = session.create_tensor(&pixels, &[2, 3, 4], ElementType::U8).unwrap();
    let outputs = session.call(&bytecode, &[&input]).unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(session.tensor_shape(&outputs[0]), vec![2, 3, 4]);
    assert_eq!(session.to_flat_array(&outputs[0]).unwrap(), pixels);

    drop(outputs);
    drop(input);
    drop(bytecode);
    assert_eq!(runtime.counts(HandleKind::Tensor).live(), 0);
    assert_eq!(runtime.counts(HandleKind::DataBuffer).live(), 0);
}

#[test]
fn test_call_failure_maps_status() {
    let runtime = Arc::new(EchoRuntime::new());
    runtime.inject_failure(Status::error(StatusCode::Internal, "kernel crashed"));
    let session = Session::open(runtime.clone()).unwrap();

    let bytecode = session.create_data_buffer(b"program").unwrap();
    let input = session.create_tensor(&[0u8; 4], &[1, 1, 4], ElementType::U8).unwrap();

    match session.call(&bytecode, &[&input]) {
        Err(RuntimeError::Call(status)) => {
            assert!(!status.is_ok());
            assert_eq!(status.code(), StatusCode::Internal);
            assert_eq!(status.message(), "kernel crashed");
        }
        other => panic!("Expected RuntimeError::Call, got {other:?}"),
    }

    // The next call is unaffected
    assert!(session.call(&bytecode, &[&input]).is_ok());
    assert_eq!(runtime.calls(), 2);
}
