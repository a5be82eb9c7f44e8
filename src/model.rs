use serde::{Deserialize, Serialize};

/// Parsed representation of one uploaded weight file.
///
/// Immutable once parsed: comparisons and layouts derive new structures
/// instead of editing the model in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkModel {
    /// Declared total neuron count (first value in the file). `None` when
    /// the first content line was not an integer; the layer list is then
    /// empty and the rest of the file parses as weight rows. This mirrors
    /// the upstream behavior where a malformed total short-circuits the
    /// layer accumulation loop.
    #[serde(rename = "totalNeurons")]
    pub total_neurons: Option<usize>,
    /// Per-layer neuron counts, in file order. The sum should equal the
    /// declared total but this is not enforced.
    pub layers: Vec<usize>,
    /// Row i holds outgoing weights from neuron i; the column index is the
    /// destination's global neuron index. Rows may have unequal length and
    /// absent entries read as weight 0.
    #[serde(rename = "weightsMatrix")]
    pub weights_matrix: Vec<Vec<f32>>,
}

impl NetworkModel {
    /// Weight of the `from -> to` connection, 0 when either index is out
    /// of range.
    pub fn connection_weight(&self, from: usize, to: usize) -> f32 {
        self.weights_matrix
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    /// Non-zero outgoing connections of a neuron as `(to, weight)` pairs.
    pub fn neuron_connections(&self, neuron: usize) -> Vec<(usize, f32)> {
        match self.weights_matrix.get(neuron) {
            Some(row) => row
                .iter()
                .enumerate()
                .filter(|&(_, &w)| w != 0.0)
                .map(|(to, &w)| (to, w))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Compact `3-5-2` style description of the layer sizes.
    pub fn layers_label(&self) -> String {
        self.layers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Contiguous band of global neuron indices forming one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub layer_index: usize,
    /// First global neuron index in the layer (inclusive).
    pub start_neuron: usize,
    /// Last global neuron index in the layer (inclusive).
    pub end_neuron: usize,
    pub neuron_count: usize,
}

impl LayerInfo {
    /// Whether a global neuron index falls inside this layer. Empty layers
    /// contain nothing even though their inclusive end index degenerates.
    pub fn contains(&self, neuron: usize) -> bool {
        neuron >= self.start_neuron && neuron < self.start_neuron + self.neuron_count
    }
}

/// Derive per-layer neuron index ranges from a model by accumulating a
/// running offset. Pure and idempotent; layers are contiguous and
/// non-overlapping by construction.
pub fn layer_info(model: &NetworkModel) -> Vec<LayerInfo> {
    let mut info = Vec::with_capacity(model.layers.len());
    let mut start = 0usize;
    for (layer_index, &neuron_count) in model.layers.iter().enumerate() {
        info.push(LayerInfo {
            layer_index,
            start_neuron: start,
            end_neuron: start + neuron_count.saturating_sub(1),
            neuron_count,
        });
        start += neuron_count;
    }
    info
}

/// One entry in a project's file list: a pre-parsed model plus the metadata
/// the surrounding application attaches to an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkFile {
    pub id: String,
    pub filename: String,
    /// Flagged by the uploader as a perturbed/attack variant; offered as the
    /// second operand of a comparison.
    #[serde(rename = "isAdversarial")]
    pub is_adversarial: bool,
    #[serde(flatten)]
    pub model: NetworkModel,
    #[serde(rename = "uploadedAt", default)]
    pub uploaded_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(layers: &[usize], weights: &[&[f32]]) -> NetworkModel {
        NetworkModel {
            total_neurons: Some(layers.iter().sum()),
            layers: layers.to_vec(),
            weights_matrix: weights.iter().map(|r| r.to_vec()).collect(),
        }
    }

    #[test]
    fn layer_info_accumulates_offsets() {
        let m = model(&[3, 2, 4], &[]);
        let info = layer_info(&m);
        assert_eq!(info.len(), 3);
        assert_eq!(
            (info[0].start_neuron, info[0].end_neuron, info[0].neuron_count),
            (0, 2, 3)
        );
        assert_eq!(
            (info[1].start_neuron, info[1].end_neuron, info[1].neuron_count),
            (3, 4, 2)
        );
        assert_eq!(
            (info[2].start_neuron, info[2].end_neuron, info[2].neuron_count),
            (5, 8, 4)
        );
    }

    #[test]
    fn layer_info_is_idempotent() {
        let m = model(&[2, 2], &[]);
        assert_eq!(layer_info(&m), layer_info(&m));
    }

    #[test]
    fn connection_weight_out_of_range_is_zero() {
        let m = model(&[1, 1], &[&[0.5]]);
        assert_eq!(m.connection_weight(0, 0), 0.5);
        assert_eq!(m.connection_weight(0, 7), 0.0);
        assert_eq!(m.connection_weight(9, 0), 0.0);
    }

    #[test]
    fn neuron_connections_skip_zero_weights() {
        let m = model(&[1, 3], &[&[0.0, 0.25, -0.5]]);
        assert_eq!(m.neuron_connections(0), vec![(1, 0.25), (2, -0.5)]);
        assert!(m.neuron_connections(3).is_empty());
    }

    #[test]
    fn network_file_deserializes_collaborator_payload() {
        let json = r#"{
            "id": "f1",
            "filename": "clean.txt",
            "isAdversarial": false,
            "totalNeurons": 4,
            "layers": [2, 2],
            "weightsMatrix": [[0.0, 0.0, 1.0, 0.5], [0.0, 0.0, -0.5, 0.25]],
            "uploadedAt": "2025-11-02T10:00:00Z"
        }"#;
        let file: NetworkFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.filename, "clean.txt");
        assert!(!file.is_adversarial);
        assert_eq!(file.model.layers, vec![2, 2]);
        assert_eq!(file.model.total_neurons, Some(4));
    }
}
