use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, ImageBuffer, ImageReader, Luma, Rgb, RgbImage};

use crate::grid::{Color, ColorGrid, Label, LabelGrid, PixelGrid};

/// Ground-truth pixels at or above this luma are `White`.
pub const MASK_THRESHOLD: u8 = 128;

pub fn open_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    ImageReader::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("failed to read image {}", path.display()))?
        .decode()
        .with_context(|| format!("failed to decode image {}", path.display()))
}

pub fn color_grid_from_image(img: &DynamicImage) -> ColorGrid {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    PixelGrid::from_fn(h as usize, w as usize, |row, col| Color::from_rgb8(rgb.get_pixel(col as u32, row as u32).0))
}

pub fn label_grid_from_image(img: &DynamicImage) -> LabelGrid {
    let luma = img.to_luma8();
    let (w, h) = luma.dimensions();
    PixelGrid::from_fn(h as usize, w as usize, |row, col| {
        if luma.get_pixel(col as u32, row as u32).0[0] >= MASK_THRESHOLD { Label::White } else { Label::Black }
    })
}

pub fn load_color_grid(path: impl AsRef<Path>) -> Result<ColorGrid> {
    Ok(color_grid_from_image(&open_image(path)?))
}

/// Loads a ground-truth mask; any color image is reduced to luma first.
pub fn load_label_grid(path: impl AsRef<Path>) -> Result<LabelGrid> {
    Ok(label_grid_from_image(&open_image(path)?))
}

pub fn label_grid_to_image(labels: &LabelGrid) -> GrayImage {
    ImageBuffer::from_fn(labels.cols() as u32, labels.rows() as u32, |x, y| {
        Luma([labels.get(y as usize, x as usize).value()])
    })
}

/// Channels are rounded and clamped to 0..255.
pub fn color_grid_to_image(grid: &ColorGrid) -> RgbImage {
    ImageBuffer::from_fn(grid.cols() as u32, grid.rows() as u32, |x, y| Rgb(grid.get(y as usize, x as usize).to_rgb8()))
}

/// Writes a single-channel 0/255 image, replacing any existing file.
pub fn save_label_grid(path: impl AsRef<Path>, labels: &LabelGrid) -> Result<()> {
    let path = path.as_ref();
    label_grid_to_image(labels).save(path).with_context(|| format!("failed to save {}", path.display()))
}

pub fn save_color_grid(path: impl AsRef<Path>, grid: &ColorGrid) -> Result<()> {
    let path = path.as_ref();
    color_grid_to_image(grid).save(path).with_context(|| format!("failed to save {}", path.display()))
}
