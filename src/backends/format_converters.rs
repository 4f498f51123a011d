// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for raw device buffers

/// Convert YUYV (YUV 4:2:2) to RGBA
///
/// YUYV format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
/// `stride` is the driver's bytes per line, which may include padding.
/// Uses BT.601 coefficients. Rows missing from a short buffer are left out.
pub fn yuyv_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let row_bytes = (width * 2) as usize;
    let stride = (stride as usize).max(row_bytes);
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);

    for row in data.chunks(stride).take(height as usize) {
        let Some(row) = row.get(..row_bytes) else {
            break;
        };

        for chunk in row.chunks_exact(4) {
            let y0 = chunk[0] as f32;
            let u = chunk[1] as f32 - 128.0;
            let y1 = chunk[2] as f32;
            let v = chunk[3] as f32 - 128.0;

            for y in [y0, y1] {
                rgba.push((y + 1.402 * v).clamp(0.0, 255.0) as u8);
                rgba.push((y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8);
                rgba.push((y + 1.772 * u).clamp(0.0, 255.0) as u8);
                rgba.push(255);
            }
        }
    }

    rgba
}

/// Decode an MJPEG buffer to RGBA
///
/// Returns (rgba, width, height) or `None` for a corrupt frame, which
/// webcams occasionally emit right after stream start.
pub fn mjpeg_to_rgba(data: &[u8]) -> Option<(Vec<u8>, u32, u32)> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg).ok()?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Some((rgba.into_raw(), width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_to_rgba_white() {
        // Pure white in YUV (Y=255, U=128, V=128)
        let yuyv = vec![255u8, 128, 255, 128];
        let rgba = yuyv_to_rgba(&yuyv, 2, 1, 4);

        assert_eq!(rgba.len(), 8);
        assert!(rgba[0] > 250);
        assert!(rgba[1] > 250);
        assert!(rgba[2] > 250);
        assert_eq!(rgba[3], 255);
    }

    #[test]
    fn test_yuyv_truncates_to_frame_size() {
        let yuyv = vec![16u8; 16];
        let rgba = yuyv_to_rgba(&yuyv, 2, 1, 4);
        assert_eq!(rgba.len(), 8);
    }

    #[test]
    fn test_yuyv_skips_row_padding() {
        // 2x2 frame, 4 bytes of pixels plus 4 bytes of padding per row
        let white = [255u8, 128, 255, 128];
        let black = [16u8, 128, 16, 128];
        let padding = [0u8, 255, 0, 255];
        let yuyv = [white, padding, black, padding].concat();

        let rgba = yuyv_to_rgba(&yuyv, 2, 2, 8);

        assert_eq!(rgba.len(), 2 * 2 * 4);
        assert!(rgba[..8].iter().step_by(4).all(|&r| r > 250));
        assert!(rgba[8..].iter().step_by(4).all(|&r| r < 30));
    }

    #[test]
    fn test_corrupt_mjpeg_is_skipped() {
        assert!(mjpeg_to_rgba(&[0xFF, 0xD8, 0x00]).is_none());
    }
}
