//! Two-region segmentation of color images.
//!
//! Two independent segmenters produce a binary `LabelGrid`:
//! - `kmeans`: two-cluster k-means on raw RGB pixel colors;
//! - `mean_shift` + `binarize`: spatial-color mean-shift smoothing followed by a
//!   global mean-intensity threshold.
//!
//! `metrics::compare` scores a mask against a ground truth. `pipeline` wires the
//! pieces to image files; `io` converts between `image` buffers and grids.

pub mod binarize;
pub mod error;
pub mod grid;
pub mod io;
pub mod kmeans;
pub mod mean_shift;
pub mod metrics;
pub mod pipeline;

pub use binarize::{binarize, normalize_polarity, Binarization};
pub use error::{Result, SegmentError};
pub use grid::{color_diff, Color, ColorGrid, Label, LabelGrid, PixelGrid};
pub use kmeans::{ClusterAssignment, InitMethod, KMeansConfig, KMeansSegmentation};
pub use mean_shift::{MeanShiftParams, UpdateMode};
pub use metrics::{compare, ConfusionCounts};
pub use pipeline::{process_kmeans, process_mean_shift, KMeansParams, MeanShiftJob};
