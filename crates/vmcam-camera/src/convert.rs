/// Converts YUYV (YUV 4:2:2) pixel data to RGB.
///
/// YUYV packs as `[Y0, U, Y1, V, ...]`, each pair of pixels sharing U and V.
/// Uses BT.601 coefficients:
/// - R = Y + 1.402 * (V - 128)
/// - G = Y - 0.344 * (U - 128) - 0.714 * (V - 128)
/// - B = Y + 1.772 * (U - 128)
///
/// Returns `None` if `data` is shorter than `width * height * 2` bytes.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    let pixel_count = (width as usize) * (height as usize);
    let expected_len = pixel_count * 2;
    if data.len() < expected_len {
        return None;
    }

    let mut rgb = Vec::with_capacity(pixel_count * 3);

    for chunk in data[..expected_len].chunks_exact(4) {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;

        for y in [chunk[0] as f32, chunk[2] as f32] {
            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
            rgb.extend_from_slice(&[r, g, b]);
        }
    }

    Some(rgb)
}

/// Expands packed RGB to RGBA with an opaque alpha channel.
///
/// Trailing bytes that do not form a whole pixel are ignored.
pub fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_neutral_chroma_is_gray() {
        // U = V = 128 leaves only luma
        let rgb = yuyv_to_rgb(&[50, 128, 200, 128], 2, 1).unwrap();
        assert_eq!(rgb, vec![50, 50, 50, 200, 200, 200]);
    }

    #[test]
    fn test_yuyv_short_buffer() {
        assert!(yuyv_to_rgb(&[0; 6], 2, 2).is_none());
    }

    #[test]
    fn test_rgb_to_rgba_sets_opaque_alpha() {
        assert_eq!(rgb_to_rgba(&[1, 2, 3, 4, 5, 6]), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
