use crate::CameraError;
use crates_image::DynamicImage;
use vmcam_base::Tensor;

/// Decodes one MJPEG frame into an RGB `Tensor<u8>` with shape `[height, width, 3]`.
///
/// Grayscale or CMYK JPEGs are converted to RGB so every frame from a stream
/// has the same channel count.
pub fn decode_mjpeg(data: &[u8]) -> Result<Tensor<u8>, CameraError> {
    let img = crates_image::load_from_memory_with_format(data, crates_image::ImageFormat::Jpeg)?;

    let rgb = match img {
        DynamicImage::ImageRgb8(buf) => buf,
        other => other.to_rgb8(),
    };

    let (width, height) = rgb.dimensions();
    let tensor = Tensor::from_hwc(height as usize, width as usize, 3, rgb.into_raw())?;
    Ok(tensor)
}
