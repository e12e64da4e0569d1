//! File-level drivers: load, segment, score, save.

use std::path::PathBuf;

use anyhow::{Context, Result};
use image::DynamicImage;
use log::{info, warn};

use crate::binarize::{binarize, normalize_polarity, Binarization};
use crate::grid::{ColorGrid, LabelGrid};
use crate::io::{color_grid_from_image, load_color_grid, load_label_grid, save_color_grid, save_label_grid};
use crate::kmeans::{self, KMeansConfig};
use crate::mean_shift::{self, MeanShiftParams};
use crate::metrics::{compare, ConfusionCounts};

pub const KMEANS_OUTPUT: &str = "segmented_kmeans.png";
pub const MEAN_SHIFT_OUTPUT: &str = "segmented_meanshift.png";
pub const MEAN_SHIFT_BINARY_OUTPUT: &str = "segmented_meanshift_binarized.png";

#[derive(Debug, Clone)]
pub struct KMeansParams {
    pub in_image_name: PathBuf,
    pub ground_truth_name: Option<PathBuf>,
    pub out_image_name: PathBuf,
    pub config: KMeansConfig,
}

#[derive(Debug, Clone)]
pub struct KMeansReport {
    /// Polarity-normalized mask, as written to disk.
    pub labels: LabelGrid,
    pub iterations: usize,
    pub converged: bool,
    pub metrics: Option<ConfusionCounts>,
}

#[derive(Debug, Clone)]
pub struct MeanShiftJob {
    pub in_image_name: PathBuf,
    pub ground_truth_name: Option<PathBuf>,
    pub filtered_image_name: PathBuf,
    pub out_image_name: PathBuf,
    pub params: MeanShiftParams,
    pub normalize_polarity: bool,
}

#[derive(Debug, Clone)]
pub struct MeanShiftReport {
    pub filtered: ColorGrid,
    pub labels: LabelGrid,
    pub threshold: f64,
    pub metrics: Option<ConfusionCounts>,
}

/// Binary k-means on an in-memory image, polarity-normalized.
pub fn segment_kmeans_dynamic(img: &DynamicImage, config: &KMeansConfig) -> Result<kmeans::KMeansSegmentation> {
    let grid = color_grid_from_image(img);
    let mut rng = config.rng();
    let mut seg = kmeans::segment(&grid, config, &mut rng)?;
    seg.labels = normalize_polarity(seg.labels);
    Ok(seg)
}

/// Mean-shift followed by binarization on an in-memory image.
pub fn segment_mean_shift_dynamic(img: &DynamicImage, params: &MeanShiftParams) -> Result<(ColorGrid, Binarization)> {
    let grid = color_grid_from_image(img);
    let filtered = mean_shift::filter(&grid, params)?;
    let binary = binarize(&filtered)?;
    Ok((filtered, binary))
}

fn score(labels: &LabelGrid, ground_truth: Option<&PathBuf>) -> Result<Option<ConfusionCounts>> {
    let Some(path) = ground_truth else {
        return Ok(None);
    };
    let truth = load_label_grid(path)?;
    let counts = compare(labels, &truth).with_context(|| format!("comparing against {}", path.display()))?;
    Ok(Some(counts))
}

pub fn process_kmeans(params: KMeansParams) -> Result<KMeansReport> {
    let KMeansParams { in_image_name, ground_truth_name, out_image_name, config } = params;
    info!("Input image: {}", in_image_name.display());
    info!("K: {}, max iterations: {}, init: {:?}", config.k, config.max_iterations, config.init);
    if let Some(gt) = &ground_truth_name {
        info!("Ground truth: {}", gt.display());
    }

    let grid = load_color_grid(&in_image_name)?;
    info!("Image size: {}x{}", grid.cols(), grid.rows());
    let mut rng = config.rng();
    let seg = kmeans::segment(&grid, &config, &mut rng)?;
    if !seg.converged {
        warn!("k-means did not converge within {} iterations", config.max_iterations);
    }
    let labels = normalize_polarity(seg.labels);

    let metrics = score(&labels, ground_truth_name.as_ref())?;
    save_label_grid(&out_image_name, &labels)?;
    info!("Segmentation saved: {}", out_image_name.display());

    Ok(KMeansReport { labels, iterations: seg.iterations, converged: seg.converged, metrics })
}

/// Posterized rendering for K other than two: each pixel takes its center color.
pub fn process_kmeans_posterize(params: KMeansParams) -> Result<ColorGrid> {
    let KMeansParams { in_image_name, out_image_name, config, .. } = params;
    let grid = load_color_grid(&in_image_name)?;
    let mut rng = config.rng();
    let clustering = kmeans::fit(&grid, &config, &mut rng)?;
    info!("k-means (K={}) finished after {} iterations", config.k, clustering.iterations);
    let out = clustering.posterize();
    save_color_grid(&out_image_name, &out)?;
    Ok(out)
}

pub fn process_mean_shift(job: MeanShiftJob) -> Result<MeanShiftReport> {
    let MeanShiftJob { in_image_name, ground_truth_name, filtered_image_name, out_image_name, params, normalize_polarity: normalize } = job;
    info!("Input image: {}", in_image_name.display());
    info!(
        "hs: {}, hc: {}, epsilon: {}, kmax: {}, mode: {:?}",
        params.spatial_radius, params.color_radius, params.epsilon, params.max_iterations_per_pixel, params.mode
    );

    let grid = load_color_grid(&in_image_name)?;
    // fail on an unreadable ground truth before the expensive filtering
    let truth = match &ground_truth_name {
        Some(path) => Some(load_label_grid(path)?),
        None => None,
    };

    let filtered = mean_shift::filter(&grid, &params)?;
    let binary = binarize(&filtered)?;
    let labels = if normalize { normalize_polarity(binary.labels) } else { binary.labels };

    let metrics = match &truth {
        Some(t) => Some(compare(&labels, t)?),
        None => None,
    };

    save_color_grid(&filtered_image_name, &filtered)?;
    save_label_grid(&out_image_name, &labels)?;
    info!("Filtered image saved: {}", filtered_image_name.display());
    info!("Binary segmentation saved: {}", out_image_name.display());

    Ok(MeanShiftReport { filtered, labels, threshold: binary.threshold, metrics })
}
