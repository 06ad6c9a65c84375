//! Raster composition: decode chart PNGs, resize to a common size and
//! arrange them in a padded grid.

use crate::errors::FlopscopeError;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

pub const GRID_COLUMNS: u32 = 2;
pub const GRID_PADDING: u32 = 20;

/// Decode PNG bytes into an RGBA raster.
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, FlopscopeError> {
    let img = image::load_from_memory(bytes).map_err(|e| FlopscopeError::Render(e.to_string()))?;
    Ok(img.to_rgba8())
}

/// Resize with simple triangle resampling. Aspect ratios are not
/// preserved; distortion is accepted.
pub fn resize_to(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::Triangle)
}

/// Compose equally sized images into a grid with fixed padding between
/// and around cells, on a white background.
pub fn compose_grid(images: &[RgbaImage], columns: u32, padding: u32) -> RgbaImage {
    assert!(!images.is_empty() && columns > 0);
    let (w, h) = images[0].dimensions();
    let rows = (images.len() as u32).div_ceil(columns);
    let grid_w = padding + columns * (w + padding);
    let grid_h = padding + rows * (h + padding);
    let mut canvas = RgbaImage::from_pixel(grid_w, grid_h, Rgba([255, 255, 255, 255]));
    for (i, img) in images.iter().enumerate() {
        let col = i as u32 % columns;
        let row = i as u32 / columns;
        let x = padding + col * (w + padding);
        let y = padding + row * (h + padding);
        imageops::overlay(&mut canvas, img, x as i64, y as i64);
    }
    canvas
}
