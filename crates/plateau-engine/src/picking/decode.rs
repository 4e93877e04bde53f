use super::decode_rgb;

/// Decodes the id under `(x, y)` in a tightly packed RGBA8 image.
///
/// The cursor is rounded to the nearest texel; positions outside the image
/// yield `None`.
pub fn decode_at(pixels: &[u8], width: u32, height: u32, x: f32, y: f32) -> Option<u32> {
    decode_at_stride(pixels, width as usize * 4, width, height, x, y)
}

/// Like [`decode_at`], for rows that are `row_stride` bytes apart.
pub fn decode_at_stride(
    pixels: &[u8],
    row_stride: usize,
    width: u32,
    height: u32,
    x: f32,
    y: f32,
) -> Option<u32> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let (px, py) = (x.round(), y.round());
    if px < 0.0 || py < 0.0 || px >= width as f32 || py >= height as f32 {
        return None;
    }

    let i = py as usize * row_stride + px as usize * 4;
    let texel = pixels.get(i..i + 3)?;
    Some(decode_rgb(texel[0], texel[1], texel[2]))
}

/// Copies the first `width * 4` bytes of each of `height` rows spaced
/// `row_stride` apart into a tightly packed image.
pub fn strip_row_padding(padded: &[u8], row_stride: usize, width: u32, height: u32) -> Vec<u8> {
    let tight_row = width as usize * 4;
    let mut out = Vec::with_capacity(tight_row * height as usize);
    if row_stride < tight_row {
        return out;
    }
    for row in padded.chunks(row_stride).take(height as usize) {
        if let Some(texels) = row.get(..tight_row) {
            out.extend_from_slice(texels);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picking::{encode_id, NO_OBJECT};

    /// 4x2 image: left half id 7, right half cleared.
    fn image() -> Vec<u8> {
        let mut px = Vec::new();
        for _y in 0..2 {
            for x in 0..4 {
                if x < 2 {
                    px.extend_from_slice(&encode_id(7).unwrap());
                } else {
                    px.extend_from_slice(&[255; 4]);
                }
            }
        }
        px
    }

    #[test]
    fn decodes_under_cursor() {
        let px = image();
        assert_eq!(decode_at(&px, 4, 2, 0.0, 0.0), Some(7));
        assert_eq!(decode_at(&px, 4, 2, 1.2, 1.0), Some(7));
        assert_eq!(decode_at(&px, 4, 2, 3.0, 1.0), Some(NO_OBJECT));
    }

    #[test]
    fn cursor_is_rounded() {
        let px = image();
        assert_eq!(decode_at(&px, 4, 2, 1.4, 0.0), Some(7));
        assert_eq!(decode_at(&px, 4, 2, 1.6, 0.0), Some(NO_OBJECT));
    }

    #[test]
    fn out_of_bounds_is_none() {
        let px = image();
        assert_eq!(decode_at(&px, 4, 2, -1.0, 0.0), None);
        assert_eq!(decode_at(&px, 4, 2, 0.0, 1.6), None);
        assert_eq!(decode_at(&px, 4, 2, 4.0, 0.0), None);
        assert_eq!(decode_at(&px, 4, 2, f32::NAN, 0.0), None);
    }

    #[test]
    fn padded_rows_are_skipped() {
        // Two rows of one texel each, padded to 8 bytes.
        let mut px = vec![0u8; 16];
        px[..4].copy_from_slice(&encode_id(3).unwrap());
        px[8..12].copy_from_slice(&encode_id(9).unwrap());
        assert_eq!(decode_at_stride(&px, 8, 1, 2, 0.0, 0.0), Some(3));
        assert_eq!(decode_at_stride(&px, 8, 1, 2, 0.0, 1.0), Some(9));
    }

    // ── row padding ───────────────────────────────────────────────────────

    #[test]
    fn padding_is_stripped_from_every_row() {
        // 2x3 image with rows padded to 16 bytes; padding bytes are 0xAA.
        let mut padded = Vec::new();
        for y in 0..3u8 {
            for x in 0..2u8 {
                padded.extend_from_slice(&[y, x, 0, 255]);
            }
            padded.extend_from_slice(&[0xAA; 8]);
        }

        let tight = strip_row_padding(&padded, 16, 2, 3);
        assert_eq!(tight.len(), 2 * 3 * 4);
        assert!(!tight.contains(&0xAA));
        assert_eq!(&tight[(2 * 2 + 1) * 4..][..4], &[2, 1, 0, 255]);
    }

    #[test]
    fn stripped_image_decodes_like_the_padded_one() {
        let tight = image();
        let mut padded = Vec::new();
        for row in tight.chunks(16) {
            padded.extend_from_slice(row);
            padded.extend_from_slice(&[0; 240]);
        }

        assert_eq!(strip_row_padding(&padded, 256, 4, 2), tight);
        for (x, y) in [(0.0, 0.0), (3.0, 1.0)] {
            assert_eq!(
                decode_at_stride(&padded, 256, 4, 2, x, y),
                decode_at(&tight, 4, 2, x, y)
            );
        }
    }

    #[test]
    fn unpadded_rows_are_copied_as_is() {
        let tight = image();
        assert_eq!(strip_row_padding(&tight, 16, 4, 2), tight);
    }
}
