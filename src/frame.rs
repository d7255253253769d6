//! Inbound frame decoding.
//!
//! Clients send frames as data URLs (`data:image/jpeg;base64,<bytes>`).
//! The decoder strips the metadata prefix, base64-decodes the rest,
//! decodes the image, and downsamples it to the inference resolution
//! before the estimator sees it (accuracy traded for throughput).

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;

/// Default inference resolution.
pub const DEFAULT_INFERENCE_WIDTH: u32 = 160;
pub const DEFAULT_INFERENCE_HEIGHT: u32 = 120;

/// A decoded, downsampled RGB frame ready for estimation.
pub struct DecodedFrame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl DecodedFrame {
    /// Raw RGB bytes, row-major, 3 bytes per pixel.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Decode one inbound frame payload.
///
/// Any malformed payload is an error; the caller treats it like a
/// frame with no hand but logs it distinctly.
pub fn decode_frame(payload: &str, target_width: u32, target_height: u32) -> Result<DecodedFrame> {
    let encoded = strip_data_url_prefix(payload)?;
    let bytes = BASE64
        .decode(encoded.trim())
        .context("base64 decode frame payload")?;
    let decoded = image::load_from_memory(&bytes).context("decode frame image bytes")?;

    let small = decoded.resize_exact(target_width, target_height, FilterType::Triangle);
    let rgb = small.to_rgb8();
    Ok(DecodedFrame {
        width: rgb.width(),
        height: rgb.height(),
        pixels: rgb.into_raw(),
    })
}

/// Strip the `data:<mediatype>;base64,` prefix from a data URL.
///
/// Payloads without a comma-separated header are rejected rather than
/// guessed at.
fn strip_data_url_prefix(payload: &str) -> Result<&str> {
    match payload.split_once(',') {
        Some((_, encoded)) if !encoded.is_empty() => Ok(encoded),
        Some(_) => Err(anyhow!("frame payload has an empty body")),
        None => Err(anyhow!("frame payload is not a data url")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_data_url(width: u32, height: u32) -> String {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([10, 200, 30]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        format!("data:image/png;base64,{}", BASE64.encode(&bytes))
    }

    #[test]
    fn decodes_and_downsamples_to_target_resolution() {
        let payload = png_data_url(320, 240);
        let frame = decode_frame(&payload, 160, 120).expect("decode frame");
        assert_eq!(frame.width(), 160);
        assert_eq!(frame.height(), 120);
        assert_eq!(frame.pixels().len(), 160 * 120 * 3);
    }

    #[test]
    fn upsamples_small_frames_too() {
        let payload = png_data_url(40, 30);
        let frame = decode_frame(&payload, 160, 120).expect("decode frame");
        assert_eq!((frame.width(), frame.height()), (160, 120));
    }

    #[test]
    fn rejects_payload_without_header() {
        assert!(decode_frame("bm90IGEgZGF0YSB1cmw=", 160, 120).is_err());
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(decode_frame("data:image/jpeg;base64,@@not-base64@@", 160, 120).is_err());
    }

    #[test]
    fn rejects_undecodable_image_bytes() {
        let payload = format!("data:image/jpeg;base64,{}", BASE64.encode(b"not an image"));
        assert!(decode_frame(&payload, 160, 120).is_err());
    }
}
