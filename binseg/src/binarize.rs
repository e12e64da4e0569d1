use log::info;

use crate::error::Result;
use crate::grid::{ColorGrid, Label, LabelGrid};

/// Midpoint of the 0..255 label range used by `normalize_polarity`.
pub const POLARITY_MIDPOINT: f64 = 127.0;

#[derive(Debug, Clone)]
pub struct Binarization {
    pub labels: LabelGrid,
    /// Global mean intensity the pixels were compared against.
    pub threshold: f64,
}

/// Global mean-intensity threshold.
///
/// A pixel whose channel-mean intensity is strictly below the image's mean
/// intensity becomes `Black`, every other pixel `White`.
pub fn binarize(image: &ColorGrid) -> Result<Binarization> {
    image.ensure_non_empty()?;
    let threshold = image.mean_color().map(|c| c.intensity()).unwrap_or_default();
    info!("binarization threshold = {:.6}", threshold);
    let labels = image.map(|c| if c.intensity() < threshold { Label::Black } else { Label::White });
    Ok(Binarization { labels, threshold })
}

/// Mean label value (0..255), `None` for an empty grid.
pub fn mean_label_value(labels: &LabelGrid) -> Option<f64> {
    if labels.is_empty() {
        return None;
    }
    let sum: u64 = labels.iter().map(|l| l.value() as u64).sum();
    Some(sum as f64 / labels.len() as f64)
}

/// Inverts every label when the grid is mostly dark (mean below 127), so
/// that the majority region always comes out white.
pub fn normalize_polarity(labels: LabelGrid) -> LabelGrid {
    match mean_label_value(&labels) {
        Some(mean) if mean < POLARITY_MIDPOINT => {
            info!("inverting labels (mean {:.2} < {})", mean, POLARITY_MIDPOINT);
            labels.map(Label::inverted)
        }
        _ => labels,
    }
}
