use std::io;
use vmcam_camera::CameraError;

#[test]
fn test_from_io_error_not_found_is_device() {
    let cam_err: CameraError = io::Error::new(io::ErrorKind::NotFound, "device not found").into();
    match cam_err {
        CameraError::Device(msg) => assert!(msg.contains("device not found")),
        other => panic!("Expected CameraError::Device, got {other:?}"),
    }
}

#[test]
fn test_from_io_error_permission_is_access_denied() {
    let cam_err: CameraError =
        io::Error::new(io::ErrorKind::PermissionDenied, "open /dev/video0").into();
    assert!(matches!(cam_err, CameraError::AccessDenied(_)));
}

#[test]
fn test_error_display() {
    let denied = CameraError::AccessDenied("user refused".to_string());
    assert_eq!(denied.to_string(), "camera access denied: user refused");

    let stream_err = CameraError::Stream("streaming failed".to_string());
    assert!(stream_err.to_string().contains("streaming failed"));

    let channel_err = CameraError::Channel("channel closed".to_string());
    assert!(channel_err.to_string().contains("channel closed"));
}
