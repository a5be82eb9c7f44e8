//! Pairwise network difference computation.
//!
//! Two separate routines with deliberately different semantics:
//!
//! * [`compare`] feeds the aggregate statistics and only looks at the
//!   overlapping region of the two matrices; cells beyond the overlap are
//!   excluded, not zero-compared.
//! * [`layer_differences`] feeds the per-layer diagram and zero-pads the
//!   shorter row instead, scoring layers missing on one side as the maximum
//!   possible difference.
//!
//! Unifying the two would silently change observable output, so both stay
//! as named operations.

use crate::model::{LayerInfo, NetworkModel};

/// Aggregate difference between two networks over their overlapping region.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceResult {
    /// Sum of absolute per-cell differences.
    pub total_difference: f32,
    /// `total_difference / compared_cells`, 0 when nothing overlapped.
    pub average_difference: f32,
    /// Largest absolute per-cell difference observed.
    pub max_difference: f32,
    /// Absolute differences, sized to the minimum overlapping shape.
    pub difference_matrix: Vec<Vec<f32>>,
    /// Number of cell pairs that entered the statistics.
    pub compared_cells: usize,
}

/// Element-wise comparison over the overlap of the two weight matrices:
/// `min` rows, and per row `min` columns. Symmetric in its aggregate
/// statistics.
pub fn compare(a: &NetworkModel, b: &NetworkModel) -> DifferenceResult {
    let rows = a.weights_matrix.len().min(b.weights_matrix.len());
    let mut difference_matrix = Vec::with_capacity(rows);
    let mut total = 0.0f32;
    let mut max = 0.0f32;
    let mut count = 0usize;

    for i in 0..rows {
        let row_a = &a.weights_matrix[i];
        let row_b = &b.weights_matrix[i];
        let cols = row_a.len().min(row_b.len());
        let mut row = Vec::with_capacity(cols);
        for j in 0..cols {
            let diff = (row_a[j] - row_b[j]).abs();
            row.push(diff);
            total += diff;
            max = max.max(diff);
            count += 1;
        }
        difference_matrix.push(row);
    }

    DifferenceResult {
        total_difference: total,
        average_difference: if count > 0 { total / count as f32 } else { 0.0 },
        max_difference: max,
        difference_matrix,
        compared_cells: count,
    }
}

/// Layers present in only one network score this instead of being skipped.
pub const MISSING_LAYER_DIFFERENCE: f32 = 1.0;

/// Mean absolute weight difference per layer index, up to the larger layer
/// count of the two networks.
///
/// Within a layer shared by both networks, neurons are compared up to the
/// smaller layer size and weight columns up to the *larger* row length,
/// reading missing cells as 0. A layer index present on only one side
/// yields [`MISSING_LAYER_DIFFERENCE`].
pub fn layer_differences(
    a: &NetworkModel,
    b: &NetworkModel,
    layers_a: &[LayerInfo],
    layers_b: &[LayerInfo],
) -> Vec<f32> {
    let layer_count = layers_a.len().max(layers_b.len());
    let mut diffs = Vec::with_capacity(layer_count);

    for idx in 0..layer_count {
        let (layer_a, layer_b) = match (layers_a.get(idx), layers_b.get(idx)) {
            (Some(la), Some(lb)) => (la, lb),
            _ => {
                diffs.push(MISSING_LAYER_DIFFERENCE);
                continue;
            }
        };

        let mut layer_diff = 0.0f32;
        let mut count = 0usize;
        for i in 0..layer_a.neuron_count.min(layer_b.neuron_count) {
            let neuron_a = layer_a.start_neuron + i;
            let neuron_b = layer_b.start_neuron + i;
            let row_a = a.weights_matrix.get(neuron_a).map(Vec::as_slice).unwrap_or(&[]);
            let row_b = b.weights_matrix.get(neuron_b).map(Vec::as_slice).unwrap_or(&[]);

            for j in 0..row_a.len().max(row_b.len()) {
                let wa = row_a.get(j).copied().unwrap_or(0.0);
                let wb = row_b.get(j).copied().unwrap_or(0.0);
                layer_diff += (wa - wb).abs();
                count += 1;
            }
        }
        diffs.push(if count > 0 { layer_diff / count as f32 } else { 0.0 });
    }

    diffs
}

/// Qualitative reading of an average difference. The thresholds are a fixed
/// policy, inclusive on the lower bound of each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    VerySimilar,
    ModerateDifferences,
    SignificantlyDifferent,
}

impl Verdict {
    pub fn from_average(average_difference: f32) -> Self {
        if average_difference < 0.10 {
            Verdict::VerySimilar
        } else if average_difference < 0.30 {
            Verdict::ModerateDifferences
        } else {
            Verdict::SignificantlyDifferent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::VerySimilar => "Networks are very similar",
            Verdict::ModerateDifferences => "Moderate differences detected",
            Verdict::SignificantlyDifferent => "Networks are significantly different",
        }
    }
}
