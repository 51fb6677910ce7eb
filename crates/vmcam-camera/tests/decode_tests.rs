use crates_image::ImageEncoder;
use vmcam_camera::{decode_mjpeg, CameraError};

fn encode_jpeg_rgb(width: u32, height: u32) -> Vec<u8> {
    let img = crates_image::RgbImage::from_fn(width, height, |x, y| {
        let val = ((x + y) % 256) as u8;
        crates_image::Rgb([val, val.wrapping_add(10), val.wrapping_add(20)])
    });
    let mut jpeg = Vec::new();
    crates_image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .write_image(&img, width, height, crates_image::ExtendedColorType::Rgb8)
        .unwrap();
    jpeg
}

#[test]
fn test_decode_mjpeg_rgb_shape() {
    let tensor = decode_mjpeg(&encode_jpeg_rgb(16, 8)).unwrap();
    assert_eq!(tensor.shape, vec![8, 16, 3]);
}

#[test]
fn test_decode_mjpeg_grayscale_expands_to_rgb() {
    let img = crates_image::GrayImage::from_fn(8, 8, |x, y| crates_image::Luma([((x + y) * 8) as u8]));
    let mut jpeg = Vec::new();
    crates_image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .write_image(&img, 8, 8, crates_image::ExtendedColorType::L8)
        .unwrap();

    let tensor = decode_mjpeg(&jpeg).unwrap();
    assert_eq!(tensor.shape, vec![8, 8, 3]);
}

#[test]
fn test_decode_mjpeg_garbage() {
    let result = decode_mjpeg(&[0x00, 0x01, 0x02]);
    assert!(matches!(result, Err(CameraError::Decode(_))));
}
