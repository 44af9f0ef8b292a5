//! Variant encoding: decode one source buffer, derive the three variants.
//!
//! Pure transform, no I/O. Decoding and re-encoding run under
//! `spawn_blocking` so the single-worker orchestrator only suspends at
//! real I/O boundaries.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::config::{PlaceholderPolicy, VariantPolicy, VariantsConfig};
use crate::error::PipelineError;

/// All three variants are re-encoded as JPEG.
pub const VARIANT_CONTENT_TYPE: &str = "image/jpeg";

/// The derived buffers for one source image, plus original properties.
#[derive(Debug)]
pub struct EncodedVariants {
    /// Thumbnail variant, ready for upload
    pub thumbnail: Vec<u8>,
    /// Full variant, ready for upload
    pub full: Vec<u8>,
    /// Placeholder as a self-contained `data:` URI, embedded inline
    pub placeholder: String,
    /// Original width in pixels
    pub width: u32,
    /// Original height in pixels
    pub height: u32,
    /// Original format, if detectable
    pub format: Option<String>,
}

/// Derives resized/re-encoded variants from source image buffers.
pub struct VariantEncoder {
    config: VariantsConfig,
}

impl VariantEncoder {
    pub fn new(config: VariantsConfig) -> Self {
        Self { config }
    }

    /// Derive all three variants from a source buffer.
    ///
    /// An undecodable buffer fails with `PipelineError::Decode`, which the
    /// orchestrator treats as fatal for the whole run.
    pub async fn encode(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<EncodedVariants, PipelineError> {
        let config = self.config.clone();
        let path_owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::encode_sync(&config, bytes, &path_owned))
            .await
            .map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            })?
    }

    fn encode_sync(
        config: &VariantsConfig,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<EncodedVariants, PipelineError> {
        let (image, format) = decode_bytes(bytes, path)?;
        let (width, height) = image.dimensions();

        let thumbnail = encode_scaled(&image, &config.thumbnail, path)?;
        let full = encode_scaled(&image, &config.full, path)?;
        let placeholder = encode_placeholder(&image, &config.placeholder, path)?;

        Ok(EncodedVariants {
            thumbnail,
            full,
            placeholder,
            width,
            height,
            format: format.map(|f| format_label(f).to_string()),
        })
    }
}

/// Decode a buffer, detecting the format by content with an extension
/// fallback. Returns the format separately since it may be undetectable
/// even when the pixels decode.
fn decode_bytes(
    bytes: Vec<u8>,
    path: &Path,
) -> Result<(DynamicImage, Option<ImageFormat>), PipelineError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {}", e),
        })?;
    let format = reader.format().or_else(|| ImageFormat::from_path(path).ok());
    let image = reader.decode().map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok((image, format))
}

/// Resize to the policy width (never upscaling) and re-encode.
fn encode_scaled(
    image: &DynamicImage,
    policy: &VariantPolicy,
    path: &Path,
) -> Result<Vec<u8>, PipelineError> {
    let scaled = scale_to_width(image, policy.max_width);
    encode_jpeg(&scaled, policy.quality, path)
}

/// Shrink to the placeholder width (forced, unlike the stored variants),
/// blur, re-encode, and wrap as an inline data URI.
fn encode_placeholder(
    image: &DynamicImage,
    policy: &PlaceholderPolicy,
    path: &Path,
) -> Result<String, PipelineError> {
    let height = scaled_height(image.width(), image.height(), policy.width);
    let tiny = image
        .resize_exact(policy.width, height, FilterType::Triangle)
        .blur(policy.blur_sigma);
    let bytes = encode_jpeg(&tiny, policy.quality, path)?;
    Ok(format!(
        "data:{};base64,{}",
        VARIANT_CONTENT_TYPE,
        BASE64.encode(bytes)
    ))
}

/// Resize preserving aspect ratio so width == `max_width`, unless the
/// source is already narrower (no upscaling).
fn scale_to_width(image: &DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max_width {
        return image.clone();
    }
    let target_height = scaled_height(width, height, max_width);
    image.resize_exact(max_width, target_height, FilterType::Lanczos3)
}

fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    ((height as u64 * target_width as u64) / width as u64).max(1) as u32
}

fn encode_jpeg(image: &DynamicImage, quality: u8, path: &Path) -> Result<Vec<u8>, PipelineError> {
    // JPEG has no alpha channel
    let rgb = image.to_rgb8();
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb)
        .map_err(|e| PipelineError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(buffer.into_inner())
}

/// Stable lowercase label for a detected format.
pub fn format_label(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
        buffer.into_inner()
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn dims(bytes: &[u8]) -> (u32, u32) {
        image::load_from_memory(bytes).unwrap().dimensions()
    }

    #[tokio::test]
    async fn test_wide_source_is_capped_per_variant() {
        let encoder = VariantEncoder::new(VariantsConfig::default());
        let variants = encoder
            .encode(jpeg_bytes(3200, 1600), Path::new("wide.jpg"))
            .await
            .unwrap();

        assert_eq!(dims(&variants.thumbnail), (600, 300));
        assert_eq!(dims(&variants.full), (1600, 800));
        assert_eq!(variants.width, 3200);
        assert_eq!(variants.height, 1600);
        assert_eq!(variants.format.as_deref(), Some("jpeg"));
    }

    #[tokio::test]
    async fn test_narrow_source_is_never_upscaled() {
        let encoder = VariantEncoder::new(VariantsConfig::default());
        let variants = encoder
            .encode(jpeg_bytes(300, 200), Path::new("small.jpg"))
            .await
            .unwrap();

        // Both stored variants keep the source width
        assert_eq!(dims(&variants.thumbnail), (300, 200));
        assert_eq!(dims(&variants.full), (300, 200));
    }

    #[tokio::test]
    async fn test_intermediate_source_caps_thumbnail_only() {
        let encoder = VariantEncoder::new(VariantsConfig::default());
        let variants = encoder
            .encode(jpeg_bytes(1000, 500), Path::new("mid.jpg"))
            .await
            .unwrap();

        assert_eq!(dims(&variants.thumbnail).0, 600);
        assert_eq!(dims(&variants.full).0, 1000);
    }

    #[tokio::test]
    async fn test_placeholder_is_inline_data_uri() {
        let encoder = VariantEncoder::new(VariantsConfig::default());
        let variants = encoder
            .encode(jpeg_bytes(800, 400), Path::new("p.jpg"))
            .await
            .unwrap();

        let prefix = "data:image/jpeg;base64,";
        assert!(variants.placeholder.starts_with(prefix));

        let encoded = &variants.placeholder[prefix.len()..];
        let bytes = BASE64.decode(encoded).unwrap();
        assert_eq!(dims(&bytes).0, 20);
    }

    #[tokio::test]
    async fn test_png_source_records_png_format() {
        let encoder = VariantEncoder::new(VariantsConfig::default());
        let variants = encoder
            .encode(png_bytes(100, 100), Path::new("p.png"))
            .await
            .unwrap();
        assert_eq!(variants.format.as_deref(), Some("png"));
    }

    #[tokio::test]
    async fn test_undecodable_buffer_is_decode_error() {
        let encoder = VariantEncoder::new(VariantsConfig::default());
        let err = encoder
            .encode(b"definitely not an image".to_vec(), Path::new("bad.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_label(ImageFormat::Png), "png");
        assert_eq!(format_label(ImageFormat::WebP), "webp");
    }
}
