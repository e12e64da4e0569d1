//! Color-space k-means over a `ColorGrid`.
//!
//! The Lloyd loop works for any number of centers (nearest center wins, ties go
//! to the lower index). The binary segmentation entry points (`segment`,
//! `segment_with_centers`) fix K at two and map cluster A to `Label::Black`
//! and cluster B to `Label::White`.

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SegmentError};
use crate::grid::{color_diff, Color, ColorGrid, Label, LabelGrid, PixelGrid};

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// How the initial centers are picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitMethod {
    /// Colors of uniformly sampled pixels, drawn independently.
    Custom,
    /// k-means++ seeding, used as the comparison clustering.
    Reference,
}

impl InitMethod {
    /// Unknown names fall back to `Custom`.
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "reference" | "opcv" | "opencv" | "kmeans++" | "plusplus" => Self::Reference,
            _ => Self::Custom,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KMeansConfig {
    pub k: usize,
    pub max_iterations: usize,
    pub init: InitMethod,
    /// `None` seeds the generator from the OS.
    pub seed: Option<u64>,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self { k: 2, max_iterations: DEFAULT_MAX_ITERATIONS, init: InitMethod::Custom, seed: None }
    }
}

impl KMeansConfig {
    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }
}

/// Outcome of a Lloyd run with any number of centers.
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    /// Index of the center each pixel was assigned to in the last round.
    pub clusters: PixelGrid<usize>,
    pub centers: Vec<Color>,
    /// Assign/update rounds executed.
    pub iterations: usize,
    pub converged: bool,
}

impl ClusterAssignment {
    /// Replaces each pixel by the color of its center.
    pub fn posterize(&self) -> ColorGrid {
        self.clusters.map(|idx| self.centers[idx])
    }
}

/// Binary k-means result.
#[derive(Debug, Clone)]
pub struct KMeansSegmentation {
    pub labels: LabelGrid,
    pub centers: [Color; 2],
    pub iterations: usize,
    pub converged: bool,
}

impl TryFrom<ClusterAssignment> for KMeansSegmentation {
    type Error = SegmentError;

    fn try_from(a: ClusterAssignment) -> Result<Self> {
        let centers: [Color; 2] = a
            .centers
            .as_slice()
            .try_into()
            .map_err(|_| SegmentError::UnsupportedClusterCount(a.centers.len()))?;
        let labels = a.clusters.map(|idx| if idx == 0 { Label::Black } else { Label::White });
        Ok(Self { labels, centers, iterations: a.iterations, converged: a.converged })
    }
}

/// Nearest-center index for every pixel.
pub fn assign(image: &ColorGrid, centers: &[Color]) -> Result<PixelGrid<usize>> {
    image.ensure_non_empty()?;
    if centers.is_empty() {
        return Err(SegmentError::InvalidParameter { name: "centers", reason: "at least one center is required".into() });
    }
    Ok(image.map(|pixel| nearest_center(pixel, centers)))
}

fn nearest_center(pixel: Color, centers: &[Color]) -> usize {
    let mut best = 0usize;
    let mut best_d = color_diff(pixel, centers[0]);
    for (i, &c) in centers.iter().enumerate().skip(1) {
        let d = color_diff(pixel, c);
        // strict: ties stay with the lower index
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

/// Mean color of each cluster. Clusters without pixels keep their previous center.
pub fn update(image: &ColorGrid, assignment: &PixelGrid<usize>, centers: &[Color]) -> Result<Vec<Color>> {
    image.ensure_same_dimensions(assignment)?;
    let mut sums = vec![Color::default(); centers.len()];
    let mut counts = vec![0usize; centers.len()];
    for (&pixel, &idx) in image.iter().zip(assignment.iter()) {
        if idx >= centers.len() {
            return Err(SegmentError::InvalidParameter {
                name: "assignment",
                reason: format!("cluster index {idx} with only {} centers", centers.len()),
            });
        }
        sums[idx] = sums[idx].add(pixel);
        counts[idx] += 1;
    }
    Ok(centers
        .iter()
        .zip(sums.iter().zip(counts.iter()))
        .map(|(&old, (&sum, &n))| if n > 0 { sum.div(n as f64) } else { old })
        .collect())
}

/// Initial centers following `method`.
pub fn initial_centers<R: Rng>(image: &ColorGrid, k: usize, method: InitMethod, rng: &mut R) -> Result<Vec<Color>> {
    image.ensure_non_empty()?;
    if k == 0 {
        return Err(SegmentError::InvalidParameter { name: "k", reason: "must be at least 1".into() });
    }
    let centers = match method {
        InitMethod::Custom => (0..k)
            .map(|_| {
                let row = rng.random_range(0..image.rows());
                let col = rng.random_range(0..image.cols());
                image.get(row, col)
            })
            .collect(),
        InitMethod::Reference => plus_plus_centers(image, k, rng),
    };
    Ok(centers)
}

fn plus_plus_centers<R: Rng>(image: &ColorGrid, k: usize, rng: &mut R) -> Vec<Color> {
    let pixels = image.as_slice();
    let mut centers = Vec::with_capacity(k);
    centers.push(pixels[rng.random_range(0..pixels.len())]);
    let mut nearest_sq: Vec<f64> = pixels.iter().map(|&p| p.sub(centers[0]).norm().powi(2)).collect();
    while centers.len() < k {
        let total: f64 = nearest_sq.iter().sum();
        let next = if total <= 0.0 {
            pixels[rng.random_range(0..pixels.len())]
        } else {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = pixels.len() - 1;
            for (i, &d) in nearest_sq.iter().enumerate() {
                if target < d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            pixels[chosen]
        };
        centers.push(next);
        for (d, &p) in nearest_sq.iter_mut().zip(pixels) {
            *d = d.min(p.sub(next).norm().powi(2));
        }
    }
    centers
}

/// Lloyd iterations from explicit initial centers.
///
/// Stops when no center moves (exact equality) or after `max_iterations`
/// rounds. With `max_iterations == 0` the pixels are simply assigned to the
/// initial centers.
pub fn fit_with_centers(image: &ColorGrid, initial: Vec<Color>, max_iterations: usize) -> Result<ClusterAssignment> {
    image.ensure_non_empty()?;
    let mut centers = initial;
    let mut last = None;
    let mut iterations = 0usize;
    let mut converged = false;

    while iterations < max_iterations {
        let clusters = assign(image, &centers)?;
        let new_centers = update(image, &clusters, &centers)?;
        iterations += 1;
        converged = new_centers == centers;
        debug!("k-means iter={} centers={:?}", iterations, new_centers);
        centers = new_centers;
        last = Some(clusters);
        if converged {
            break;
        }
    }

    let clusters = match last {
        Some(c) => c,
        None => assign(image, &centers)?,
    };
    if converged {
        info!("k-means converged in {} iterations", iterations);
    } else if max_iterations > 0 {
        warn!("k-means stopped at the iteration cap ({})", max_iterations);
    }
    Ok(ClusterAssignment { clusters, centers, iterations, converged })
}

/// Lloyd iterations for `config.k` clusters, seeded from `rng`.
pub fn fit<R: Rng>(image: &ColorGrid, config: &KMeansConfig, rng: &mut R) -> Result<ClusterAssignment> {
    let centers = initial_centers(image, config.k, config.init, rng)?;
    debug!("k-means initial centers ({:?}): {:?}", config.init, centers);
    fit_with_centers(image, centers, config.max_iterations)
}

/// Two-cluster segmentation. Any `config.k` other than 2 is rejected.
pub fn segment<R: Rng>(image: &ColorGrid, config: &KMeansConfig, rng: &mut R) -> Result<KMeansSegmentation> {
    if config.k != 2 {
        return Err(SegmentError::UnsupportedClusterCount(config.k));
    }
    fit(image, config, rng)?.try_into()
}

pub fn segment_with_centers(image: &ColorGrid, centers: [Color; 2], max_iterations: usize) -> Result<KMeansSegmentation> {
    fit_with_centers(image, centers.to_vec(), max_iterations)?.try_into()
}
