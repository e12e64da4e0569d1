/// Errors raised by the segmentation core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentError {
    #[error("empty input: the grid holds no pixel")]
    EmptyInput,

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("dimension mismatch: expected {}x{}, found {}x{}", expected.0, expected.1, found.0, found.1)]
    DimensionMismatch { expected: (usize, usize), found: (usize, usize) },

    #[error("binary segmentation needs exactly 2 clusters, got K={0}")]
    UnsupportedClusterCount(usize),
}

pub type Result<T> = std::result::Result<T, SegmentError>;
