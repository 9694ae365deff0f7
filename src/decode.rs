//! Turns the `image` field of a request into a grayscale pixel grid.

use crate::error::DecodeError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, GrayImage, Luma};

/// Strips the data-URL descriptor and base64-decodes the payload.
///
/// Everything up to and including the first comma is discarded. ASCII
/// whitespace inside the payload is ignored so line-wrapped base64 decodes.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, DecodeError> {
    let (_, payload) = data_url
        .split_once(',')
        .ok_or(DecodeError::MissingSeparator)?;

    let payload: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    Ok(STANDARD.decode(payload)?)
}

/// Decodes encoded image bytes, sniffing the format from the content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Converts an image to single-channel 8-bit luma.
///
/// Uses the ITU-R BT.601 weights (0.299, 0.587, 0.114) that cascade face
/// models are trained against. Alpha is dropped without blending.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }

    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        Luma([luma as u8])
    })
}

/// Runs the whole decoding chain for one `image` field value.
pub fn decode_payload(data_url: &str) -> Result<GrayImage, DecodeError> {
    let bytes = decode_data_url(data_url)?;
    let image = decode_image(&bytes)?;
    log::debug!(
        "Decoded {}x{} image from {} bytes",
        image.width(),
        image.height(),
        bytes.len()
    );
    Ok(to_grayscale(&image))
}
