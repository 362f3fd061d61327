//! Thumbnail generation
//!
//! Produces the placeholder preview shown for each record in the library:
//! a grey page with a `PDF` icon, the (truncated) file name and its size.
//! Thumbnails are PNG images returned as `data:image/png;base64,...` URLs.
//!
//! Generation never fails from the caller's point of view. Internal errors are
//! logged and answered with a generic fallback image.

mod font;

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::config::ThumbnailConfig;
use crate::format::format_file_size;

/// Prefix of every thumbnail produced by this module
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// 1x1 PNG, used when even the fallback cannot be drawn
pub const MINIMAL_PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Largest edge we are willing to allocate a canvas for
const MAX_DIMENSION: u32 = 2048;

/// Names longer than this are cut to `NAME_KEEP_CHARS` plus an ellipsis
const NAME_MAX_CHARS: usize = 20;
const NAME_KEEP_CHARS: usize = 17;

const MARGIN: u32 = 10;
const NAME_TOP: u32 = 23;
const SIZE_TOP: u32 = 43;
const ICON_LABEL_SCALE: u32 = 3;

const BACKGROUND: Rgba<u8> = Rgba([0xf5, 0xf5, 0xf5, 0xff]);
const BORDER: Rgba<u8> = Rgba([0xe0, 0xe0, 0xe0, 0xff]);
const ICON: Rgba<u8> = Rgba([0xe0, 0xe0, 0xe0, 0xff]);
const ICON_LABEL: Rgba<u8> = Rgba([0xa0, 0xa0, 0xa0, 0xff]);
const TEXT: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 0xff]);

/// Thumbnail rendering errors (never leave this module)
#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Invalid thumbnail dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to encode thumbnail: {0}")]
    Encode(#[from] image::ImageError),
}

/// Renders placeholder thumbnails of a fixed size
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailGenerator {
    width: u32,
    height: u32,
}

impl Default for ThumbnailGenerator {
    fn default() -> Self {
        Self::new(ThumbnailConfig::default())
    }
}

impl ThumbnailGenerator {
    pub fn new(config: ThumbnailConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }

    /// Generate a thumbnail for a file with the given name and size
    pub fn generate(&self, name: &str, size: u64) -> String {
        match self.render(Some((name, size))) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(file_name = %name, "Thumbnail generation failed: {}", e);
                self.fallback()
            }
        }
    }

    /// Generic thumbnail without file details
    pub fn fallback(&self) -> String {
        match self.render(None) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Fallback thumbnail generation failed: {}", e);
                MINIMAL_PNG_DATA_URL.to_string()
            }
        }
    }

    fn render(&self, details: Option<(&str, u64)>) -> Result<String, ThumbnailError> {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ThumbnailError::InvalidDimensions { width, height });
        }

        let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);
        stroke_rect(&mut img, 0, 0, width, height, BORDER);

        // Page icon occupies the middle half of the canvas
        let (icon_x, icon_y, icon_w, icon_h) = (width / 4, height / 4, width / 2, height / 2);
        fill_rect(&mut img, icon_x, icon_y, icon_w, icon_h, ICON);

        let label = "PDF";
        let label_w = font::text_width(label, ICON_LABEL_SCALE);
        let label_h = font::GLYPH_HEIGHT * ICON_LABEL_SCALE;
        font::draw_text(
            &mut img,
            label,
            (icon_x + icon_w / 2).saturating_sub(label_w / 2),
            (icon_y + icon_h / 2).saturating_sub(label_h / 2),
            ICON_LABEL_SCALE,
            ICON_LABEL,
        );

        if let Some((name, size)) = details {
            font::draw_text(&mut img, &truncate_name(name), MARGIN, NAME_TOP, 1, TEXT);
            font::draw_text(&mut img, &format_file_size(size), MARGIN, SIZE_TOP, 1, TEXT);
        }

        encode_png(img)
    }
}

/// Shorten long file names to `"<first 17 chars>..."`
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_MAX_CHARS {
        let kept: String = name.chars().take(NAME_KEEP_CHARS).collect();
        format!("{}...", kept)
    } else {
        name.to_string()
    }
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = (x + w).min(img.width());
    let y_end = (y + h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

fn stroke_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    fill_rect(img, x, y, w, 1, color);
    fill_rect(img, x, y + h - 1, w, 1, color);
    fill_rect(img, x, y, 1, h, color);
    fill_rect(img, x + w - 1, y, 1, h, color);
}

fn encode_png(img: RgbaImage) -> Result<String, ThumbnailError> {
    let mut output = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)?;
    Ok(format!("{}{}", PNG_DATA_URL_PREFIX, BASE64.encode(output)))
}
