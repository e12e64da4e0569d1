use std::fmt;

use crate::error::Result;
use crate::grid::{Label, LabelGrid};

/// Confusion counts of a predicted mask against a ground truth, `White` being
/// the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tp: u64,
    pub fp: u64,
    pub tn: u64,
    pub fn_: u64,
}

fn ratio(num: u64, denom: u64) -> Option<f64> {
    if denom == 0 { None } else { Some(num as f64 / denom as f64) }
}

impl ConfusionCounts {
    pub fn total(&self) -> u64 { self.tp + self.fp + self.tn + self.fn_ }

    /// `TP / (TP + FP)`, `None` when nothing was predicted positive.
    pub fn precision(&self) -> Option<f64> { ratio(self.tp, self.tp + self.fp) }

    /// `TP / (TP + FN)`, `None` when the ground truth has no positive.
    pub fn sensitivity(&self) -> Option<f64> { ratio(self.tp, self.tp + self.fn_) }

    /// Dice similarity `2TP / (2TP + FP + FN)`, `None` when both masks are all negative.
    pub fn dice(&self) -> Option<f64> { ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_) }

    fn record(&mut self, predicted: Label, truth: Label) {
        match (predicted, truth) {
            (Label::White, Label::White) => self.tp += 1,
            (Label::Black, Label::Black) => self.tn += 1,
            (Label::White, Label::Black) => self.fp += 1,
            (Label::Black, Label::White) => self.fn_ += 1,
        }
    }
}

/// Counts every pixel position into exactly one bin. Grids of different
/// dimensions are rejected.
pub fn compare(predicted: &LabelGrid, ground_truth: &LabelGrid) -> Result<ConfusionCounts> {
    predicted.ensure_same_dimensions(ground_truth)?;
    let mut counts = ConfusionCounts::default();
    for (&p, &t) in predicted.iter().zip(ground_truth.iter()) {
        counts.record(p, t);
    }
    Ok(counts)
}

struct Ratio(Option<f64>);

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.6}"),
            None => f.write_str("undefined"),
        }
    }
}

impl fmt::Display for ConfusionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TP = {}", self.tp)?;
        writeln!(f, "FP = {}", self.fp)?;
        writeln!(f, "TN = {}", self.tn)?;
        writeln!(f, "FN = {}", self.fn_)?;
        writeln!(f, "precision   = {}", Ratio(self.precision()))?;
        writeln!(f, "sensitivity = {}", Ratio(self.sensitivity()))?;
        write!(f, "dice        = {}", Ratio(self.dice()))
    }
}
