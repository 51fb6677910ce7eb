#[cfg(feature = "v4l2")]
mod v4l2_tests {
    use vmcam_camera::{CameraConfig, CameraError, V4l2Camera};

    #[test]
    fn test_v4l2_camera_invalid_device() {
        let config = CameraConfig::default().with_device("/dev/nonexistent_camera");

        match V4l2Camera::new(config) {
            Err(CameraError::Device(_)) => {}
            other => panic!("Expected CameraError::Device, got {other:?}"),
        }
    }

    #[test]
    fn test_v4l2_camera_rejects_invalid_config() {
        let config = CameraConfig::default().with_height(0);
        assert!(matches!(V4l2Camera::new(config), Err(CameraError::Device(_))));
    }
}
