use crate::error::{Result, SegmentError};

/// An RGB color with `f64` channels (8-bit range for images loaded from disk).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Self = Self { r: 255.0, g: 255.0, b: 255.0 };

    pub const fn new(r: f64, g: f64, b: f64) -> Self { Self { r, g, b } }
    pub fn from_rgb8(p: [u8; 3]) -> Self { Self::new(p[0] as f64, p[1] as f64, p[2] as f64) }

    pub fn add(self, o: Self) -> Self { Self { r: self.r + o.r, g: self.g + o.g, b: self.b + o.b } }
    pub fn sub(self, o: Self) -> Self { Self { r: self.r - o.r, g: self.g - o.g, b: self.b - o.b } }
    pub fn div(self, d: f64) -> Self { Self { r: self.r / d, g: self.g / d, b: self.b / d } }
    pub fn dot(self, o: Self) -> f64 { self.r * o.r + self.g * o.g + self.b * o.b }
    pub fn norm(self) -> f64 { self.dot(self).sqrt() }
    pub fn trunc(self) -> Self { Self { r: self.r.trunc(), g: self.g.trunc(), b: self.b.trunc() } }

    /// Channel-mean intensity `(r + g + b) / 3`.
    pub fn intensity(self) -> f64 { (self.r + self.g + self.b) / 3.0 }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

/// Euclidean distance in RGB space.
pub fn color_diff(c1: Color, c2: Color) -> f64 { c1.sub(c2).norm() }

/// One of the two symbols a binary segmentation may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    /// Cluster A, stored as 0.
    Black,
    /// Cluster B, stored as 255.
    White,
}

impl Label {
    pub fn value(self) -> u8 {
        match self {
            Label::Black => 0,
            Label::White => 255,
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Label::Black => Label::White,
            Label::White => Label::Black,
        }
    }
}

/// Fixed-size, row-major 2D grid addressed by `(row, col)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelGrid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

pub type ColorGrid = PixelGrid<Color>;
pub type LabelGrid = PixelGrid<Label>;

impl<T: Copy> PixelGrid<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self { rows, cols, data: vec![value; rows * cols] }
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(SegmentError::InvalidParameter {
                name: "data",
                reason: format!("expected {} elements for a {rows}x{cols} grid, got {}", rows * cols, data.len()),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn dimensions(&self) -> (usize, usize) { (self.rows, self.cols) }
    pub fn len(&self) -> usize { self.data.len() }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// # Panics
    /// Panics when `(row, col)` lies outside the grid.
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.index(row, col)]
    }

    /// # Panics
    /// Panics when `(row, col)` lies outside the grid.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let idx = self.index(row, col);
        self.data[idx] = value;
    }

    pub fn as_slice(&self) -> &[T] { &self.data }
    pub fn iter(&self) -> impl Iterator<Item = &T> { self.data.iter() }

    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> PixelGrid<U> {
        PixelGrid { rows: self.rows, cols: self.cols, data: self.data.iter().map(|&v| f(v)).collect() }
    }

    /// Fails with `EmptyInput` when the grid holds no element.
    pub fn ensure_non_empty(&self) -> Result<()> {
        if self.is_empty() { Err(SegmentError::EmptyInput) } else { Ok(()) }
    }

    pub fn ensure_same_dimensions<U: Copy>(&self, other: &PixelGrid<U>) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(SegmentError::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        Ok(())
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(row < self.rows && col < self.cols, "({row}, {col}) outside {}x{} grid", self.rows, self.cols);
        row * self.cols + col
    }
}

impl LabelGrid {
    /// Label values as 0/255 bytes, row-major.
    pub fn to_bytes(&self) -> Vec<u8> { self.data.iter().map(|l| l.value()).collect() }

    pub fn count(&self, label: Label) -> usize { self.data.iter().filter(|&&l| l == label).count() }
}

impl ColorGrid {
    /// Per-channel mean color, `None` for an empty grid.
    pub fn mean_color(&self) -> Option<Color> {
        if self.data.is_empty() { return None; }
        let sum = self.data.iter().fold(Color::default(), |acc, &c| acc.add(c));
        Some(sum.div(self.data.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = PixelGrid::from_vec(2, 2, vec![0u8; 3]).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidParameter { name: "data", .. }));
    }

    #[test]
    fn row_major_addressing() {
        let grid = PixelGrid::from_fn(2, 3, |r, c| r * 10 + c);
        assert_eq!(grid.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(grid.get(1, 2), 12);
    }

    #[test]
    fn color_distance_is_euclidean() {
        let d = color_diff(Color::new(0.0, 3.0, 0.0), Color::new(4.0, 0.0, 0.0));
        assert_eq!(d, 5.0);
    }
}
