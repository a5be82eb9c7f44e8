//! End-to-end pipeline tests: weight file text through parsing, layer
//! indexing, layout, and comparison summary.

use std::io::Write;

use weightscope::layout::{NetworkLayout, PanePosition, Theme, ViewMode};
use weightscope::{compare, layer_info, parse, ComparisonSummary, Verdict};

const CLEAN: &str = "\
9            # total neurons
3            # input layer
4            # hidden layer
2            # output layer
0.0 0.0 0.0 0.5 -0.3 0.8 0.1
0.0 0.0 0.0 0.2 0.9 -0.7 0.4
0.0 0.0 0.0 -0.1 0.3 0.6 -0.5
0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.7 -0.2
0.0 0.0 0.0 0.0 0.0 0.0 0.0 -0.4 0.5
0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.1 0.9
0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.6 -0.8
";

fn perturbed() -> String {
    // Same topology, every weight nudged by +0.05.
    CLEAN
        .lines()
        .map(|line| {
            let content = line.split('#').next().unwrap_or("").trim();
            if content.contains('.') {
                let row: Vec<String> = content
                    .split_whitespace()
                    .map(|t| format!("{:.2}", t.parse::<f32>().unwrap() + 0.05))
                    .collect();
                row.join(" ")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn parses_and_indexes_realistic_file() {
    let model = parse(CLEAN);
    assert_eq!(model.total_neurons, Some(9));
    assert_eq!(model.layers, vec![3, 4, 2]);
    assert_eq!(model.weights_matrix.len(), 7);

    let layers = layer_info(&model);
    assert_eq!(layers[1].start_neuron, 3);
    assert_eq!(layers[1].end_neuron, 6);
    assert_eq!(layers[2].start_neuron, 7);
}

#[test]
fn layout_enumerates_feed_forward_connections_only() {
    let model = parse(CLEAN);
    let layers = layer_info(&model);
    let layout = NetworkLayout::build(
        &model,
        &layers,
        ViewMode::Thickness,
        Theme::Dark,
        PanePosition::Center,
        16.0 / 9.0,
        None,
    );

    assert_eq!(layout.neurons.len(), 9);
    // 3x4 non-zero weights into the hidden layer, 4x2 into the output.
    assert_eq!(layout.connections.len(), 20);
    assert!(layout
        .connections
        .iter()
        .all(|c| c.to > c.from && c.radius >= 0.03));
}

#[test]
fn comparison_pipeline_reports_small_uniform_perturbation() {
    let a = parse(CLEAN);
    let b = parse(&perturbed());
    assert_eq!(a.layers, b.layers);

    let result = compare(&a, &b);
    // Every overlapping cell moved by 0.05.
    assert!((result.average_difference - 0.05).abs() < 1e-2);
    // Rows 0-2 carry 7 columns, rows 3-6 carry 9.
    assert_eq!(result.compared_cells, 3 * 7 + 4 * 9);

    let summary = ComparisonSummary::compute(&a, &b);
    assert_eq!(summary.verdict, Verdict::VerySimilar);
    assert_eq!(summary.layer_diffs.len(), 3);
}

#[test]
fn self_comparison_is_identical_verdict() {
    let model = parse(CLEAN);
    let summary = ComparisonSummary::compute(&model, &model);
    assert_eq!(summary.result.total_difference, 0.0);
    assert_eq!(summary.verdict, Verdict::VerySimilar);
}

#[test]
fn file_roundtrip_through_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{CLEAN}").unwrap();
    let from_disk = weightscope::load(file.path()).unwrap();
    assert_eq!(from_disk, parse(CLEAN));
}
