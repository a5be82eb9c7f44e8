//! Deterministic 3D layout for a layered network.
//!
//! Maps a [`NetworkModel`] onto neuron positions and per-connection geometry
//! (radius, color, opacity) for a given encoding mode, theme, and optional
//! comparison target, plus the camera framing that fits the whole network
//! in view. Pure data in, pure data out; the scene renderer consumes the
//! result without recomputing any of it.

use egui::Color32;
use nalgebra::Point3;

use crate::model::{LayerInfo, NetworkModel};

/// Spacing between adjacent layers along the X axis, in world units.
pub const LAYER_SPACING: f32 = 6.0;
/// Spacing between neurons within a layer along the Y axis.
pub const NEURON_SPACING: f32 = 2.0;
/// Vertical field of view of the scene camera, radians.
pub const CAMERA_FOV: f32 = 60.0 * std::f32::consts::PI / 180.0;
/// Padding factor applied to the fitted camera distance.
const FRAME_PADDING: f32 = 1.5;
/// The camera never frames closer than this, whatever the network extent.
const MIN_FRAME_DISTANCE: f32 = 10.0;
/// Horizontal camera offset for the members of a side-by-side pair.
const PANE_OFFSET: f32 = 3.0;

/// Visual encoding choice for connection weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Weight sign and magnitude map to hue/lightness.
    Color,
    /// Weight magnitude maps to connection radius.
    Thickness,
}

/// Light or dark scene palette, passed in explicitly so the core stays
/// testable without a UI harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn background(self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(0x0a, 0x0a, 0x0a),
            Theme::Light => Color32::from_rgb(0xf5, 0xf5, 0xf5),
        }
    }

    pub fn neuron_color(self) -> Color32 {
        match self {
            Theme::Dark => Color32::WHITE,
            Theme::Light => Color32::from_rgb(0x22, 0x22, 0x22),
        }
    }

    /// Neutral connection color used by thickness mode without a comparison.
    pub fn neutral_connection(self) -> Color32 {
        match self {
            Theme::Dark => Color32::WHITE,
            Theme::Light => Color32::from_rgb(0x33, 0x33, 0x33),
        }
    }

    pub fn label_color(self) -> Color32 {
        match self {
            Theme::Dark => Color32::WHITE,
            Theme::Light => Color32::BLACK,
        }
    }
}

/// Which member of a side-by-side pair a view is, shifting its camera
/// horizontally so paired views do not frame identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanePosition {
    #[default]
    Center,
    Left,
    Right,
}

impl PanePosition {
    fn x_offset(self) -> f32 {
        match self {
            PanePosition::Left => -PANE_OFFSET,
            PanePosition::Right => PANE_OFFSET,
            PanePosition::Center => 0.0,
        }
    }
}

/// A neuron placed in the scene.
#[derive(Debug, Clone)]
pub struct RenderedNeuron {
    pub index: usize,
    pub layer_index: usize,
    pub position: Point3<f32>,
}

/// A renderable connection with its derived geometry parameters.
#[derive(Debug, Clone)]
pub struct RenderedConnection {
    pub from: usize,
    pub to: usize,
    pub weight: f32,
    /// Absolute weight difference against the comparison target, when one
    /// was supplied.
    pub diff: Option<f32>,
    pub from_pos: Point3<f32>,
    pub to_pos: Point3<f32>,
    /// World-space cylinder radius.
    pub radius: f32,
    pub color: Color32,
    pub opacity: f32,
}

/// Camera framing derived from the network's bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// Bounding-box centroid the camera orbits around.
    pub focus: Point3<f32>,
    /// Fitted viewing distance.
    pub distance: f32,
    /// Interactive zoom bounds derived from the fitted distance.
    pub min_distance: f32,
    pub max_distance: f32,
    /// Horizontal start offset for side-by-side panes.
    pub x_offset: f32,
}

/// Complete layout output for one (model, mode, theme, comparison) tuple.
#[derive(Debug, Clone)]
pub struct NetworkLayout {
    pub neurons: Vec<RenderedNeuron>,
    pub connections: Vec<RenderedConnection>,
    pub frame: CameraFrame,
}

impl NetworkLayout {
    /// Lay out `model` as stacked planar layers along X and enumerate the
    /// feed-forward connections between adjacent layers. Weight entries
    /// pointing anywhere other than the immediately following layer are
    /// dropped from the visual.
    pub fn build(
        model: &NetworkModel,
        layers: &[LayerInfo],
        mode: ViewMode,
        theme: Theme,
        pane: PanePosition,
        aspect: f32,
        comparison: Option<&NetworkModel>,
    ) -> Self {
        let layer_count = layers.len() as f32;
        let mut neurons = Vec::new();

        for layer in layers {
            let x = (layer.layer_index as f32 - layer_count / 2.0) * LAYER_SPACING;
            let y_start = -((layer.neuron_count as f32 - 1.0) * NEURON_SPACING) / 2.0;
            for i in 0..layer.neuron_count {
                neurons.push(RenderedNeuron {
                    index: layer.start_neuron + i,
                    layer_index: layer.layer_index,
                    position: Point3::new(x, y_start + i as f32 * NEURON_SPACING, 0.0),
                });
            }
        }

        let position_of = |neuron: usize| {
            neurons
                .iter()
                .find(|n| n.index == neuron)
                .map(|n| n.position)
        };

        let mut connections = Vec::new();
        for window in layers.windows(2) {
            let (layer, next) = (&window[0], &window[1]);
            for i in 0..layer.neuron_count {
                let from = layer.start_neuron + i;
                for (to, weight) in model.neuron_connections(from) {
                    if !next.contains(to) {
                        continue;
                    }
                    let (Some(from_pos), Some(to_pos)) = (position_of(from), position_of(to))
                    else {
                        continue;
                    };

                    let clamped = weight.abs().clamp(0.0, 1.0);
                    let diff = comparison
                        .map(|comp| (weight - comp.connection_weight(from, to)).abs());

                    connections.push(RenderedConnection {
                        from,
                        to,
                        weight,
                        diff,
                        from_pos,
                        to_pos,
                        radius: connection_radius(mode, clamped),
                        color: connection_color(mode, theme, weight, clamped, diff),
                        opacity: connection_opacity(clamped),
                    });
                }
            }
        }

        let frame = CameraFrame::fit(&neurons, aspect, pane);

        Self {
            neurons,
            connections,
            frame,
        }
    }
}

impl CameraFrame {
    /// Fit the camera to the bounding box of the neuron positions: required
    /// distance per axis from the field of view, larger of the two, padded,
    /// and clamped to a sane minimum. Degenerate ranges fall back to 1.
    pub fn fit(neurons: &[RenderedNeuron], aspect: f32, pane: PanePosition) -> Self {
        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for n in neurons {
            min_x = min_x.min(n.position.x);
            max_x = max_x.max(n.position.x);
            min_y = min_y.min(n.position.y);
            max_y = max_y.max(n.position.y);
        }

        let (center_x, center_y) = if neurons.is_empty() {
            (0.0, 0.0)
        } else {
            ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0)
        };
        let range_x = non_zero_or(max_x - min_x, 1.0);
        let range_y = non_zero_or(max_y - min_y, 1.0);

        let half_fov_tan = (CAMERA_FOV / 2.0).tan();
        let aspect = non_zero_or(aspect, 1.0);
        let distance_x = (range_x / 2.0) / half_fov_tan / aspect;
        let distance_y = (range_y / 2.0) / half_fov_tan;
        let distance = (distance_x.max(distance_y) * FRAME_PADDING).max(MIN_FRAME_DISTANCE);

        Self {
            focus: Point3::new(center_x, center_y, 0.0),
            distance,
            min_distance: (distance * 0.3).max(2.0),
            max_distance: distance * 3.0,
            x_offset: pane.x_offset(),
        }
    }
}

fn non_zero_or(value: f32, fallback: f32) -> f32 {
    if value == 0.0 || !value.is_finite() {
        fallback
    } else {
        value
    }
}

fn connection_radius(mode: ViewMode, clamped: f32) -> f32 {
    match mode {
        ViewMode::Thickness => 0.03 + clamped * 0.1,
        ViewMode::Color => 0.04,
    }
}

fn connection_opacity(clamped: f32) -> f32 {
    0.5 + clamped * 0.3
}

/// Color policy, in priority order: difference overlay, then color-mode
/// sign/magnitude encoding, then the theme's neutral.
fn connection_color(
    mode: ViewMode,
    theme: Theme,
    weight: f32,
    clamped: f32,
    diff: Option<f32>,
) -> Color32 {
    if let Some(diff) = diff {
        // Green for identical weights through to red at full difference.
        let normalized = (diff.abs() * 3.0).min(1.0);
        return hsl_color((1.0 - normalized) * 0.33, 1.0, 0.5);
    }
    match mode {
        ViewMode::Color => {
            if weight >= 0.0 {
                hsl_color(0.3 + clamped * 0.2, 1.0, 0.5)
            } else {
                hsl_color(0.0, 1.0, 0.3 + clamped * 0.2)
            }
        }
        ViewMode::Thickness => theme.neutral_connection(),
    }
}

/// HSL to RGB with hue as a fraction of a turn in `[0, 1]`.
pub fn hsl_color(h: f32, s: f32, l: f32) -> Color32 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        };
        (v * 255.0).round() as u8
    };

    Color32::from_rgb(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layer_info;

    fn model(layers: &[usize], weights: Vec<Vec<f32>>) -> NetworkModel {
        NetworkModel {
            total_neurons: Some(layers.iter().sum()),
            layers: layers.to_vec(),
            weights_matrix: weights,
        }
    }

    fn build(
        model: &NetworkModel,
        mode: ViewMode,
        comparison: Option<&NetworkModel>,
    ) -> NetworkLayout {
        let layers = layer_info(model);
        NetworkLayout::build(
            model,
            &layers,
            mode,
            Theme::Dark,
            PanePosition::Center,
            16.0 / 9.0,
            comparison,
        )
    }

    #[test]
    fn layers_spread_along_x_and_neurons_along_y() {
        let m = model(&[2, 1], vec![vec![0.0, 0.0, 0.5], vec![0.0, 0.0, 0.5]]);
        let layout = build(&m, ViewMode::Color, None);
        assert_eq!(layout.neurons.len(), 3);
        // Two layers centered around 0: x = (k - 1) * 6.
        assert_eq!(layout.neurons[0].position.x, -6.0);
        assert_eq!(layout.neurons[2].position.x, 0.0);
        // First layer's two neurons stacked symmetrically.
        assert_eq!(layout.neurons[0].position.y, -1.0);
        assert_eq!(layout.neurons[1].position.y, 1.0);
        assert!(layout.neurons.iter().all(|n| n.position.z == 0.0));
    }

    #[test]
    fn skip_connections_are_dropped() {
        // Neuron 0 (layer 0) pointing at neuron 3 (layer 2) must not render.
        let m = model(
            &[1, 1, 2],
            vec![vec![0.0, 0.5, 0.0, 0.9], vec![0.0, 0.0, 0.5, 0.5]],
        );
        let layout = build(&m, ViewMode::Color, None);
        assert!(layout.connections.iter().all(|c| !(c.from == 0 && c.to == 3)));
        assert!(layout.connections.iter().any(|c| c.from == 0 && c.to == 1));
        assert_eq!(layout.connections.len(), 3);
    }

    #[test]
    fn thickness_mode_scales_radius() {
        let m = model(&[1, 1], vec![vec![0.0, 0.5]]);
        let thick = build(&m, ViewMode::Thickness, None);
        assert!((thick.connections[0].radius - 0.08).abs() < 1e-6);
        let colored = build(&m, ViewMode::Color, None);
        assert_eq!(colored.connections[0].radius, 0.04);
    }

    #[test]
    fn opacity_tracks_clamped_magnitude() {
        let m = model(&[1, 1], vec![vec![0.0, 2.5]]);
        let layout = build(&m, ViewMode::Color, None);
        // |2.5| clamps to 1.
        assert!((layout.connections[0].opacity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn opposite_signs_encode_differently_in_color_mode() {
        let pos = model(&[1, 1], vec![vec![0.0, 0.8]]);
        let neg = model(&[1, 1], vec![vec![0.0, -0.8]]);
        let lp = build(&pos, ViewMode::Color, None);
        let ln = build(&neg, ViewMode::Color, None);
        assert_ne!(lp.connections[0].color, ln.connections[0].color);
        // Positive sits in the green band, negative in the red band.
        let p = lp.connections[0].color;
        let n = ln.connections[0].color;
        assert!(p.g() > p.r());
        assert!(n.r() > n.g());
    }

    #[test]
    fn difference_overlay_takes_priority_over_mode() {
        let a = model(&[1, 1], vec![vec![0.0, 0.9]]);
        let b = model(&[1, 1], vec![vec![0.0, 0.9]]);
        let layout = build(&a, ViewMode::Thickness, Some(&b));
        let c = &layout.connections[0];
        assert_eq!(c.diff, Some(0.0));
        // Zero difference renders green, not the neutral theme color.
        assert_eq!(c.color, hsl_color(0.33, 1.0, 0.5));
    }

    #[test]
    fn comparison_missing_cell_reads_zero() {
        let a = model(&[1, 1], vec![vec![0.0, 0.6]]);
        let b = model(&[1, 1], vec![]);
        let layout = build(&a, ViewMode::Color, Some(&b));
        assert!((layout.connections[0].diff.unwrap() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn camera_frame_clamps_to_minimum_distance() {
        let m = model(&[1, 1], vec![vec![0.0, 0.5]]);
        let layout = build(&m, ViewMode::Color, None);
        assert_eq!(layout.frame.distance, 10.0);
        assert_eq!(layout.frame.min_distance, 3.0);
        assert_eq!(layout.frame.max_distance, 30.0);
    }

    #[test]
    fn zoom_bounds_scale_with_distance() {
        // 40 neurons in one layer: y range 78, distance_y well above 10.
        let m = model(&[40, 1], vec![]);
        let layout = build(&m, ViewMode::Color, None);
        assert!(layout.frame.distance > MIN_FRAME_DISTANCE);
        assert!((layout.frame.min_distance - layout.frame.distance * 0.3).abs() < 1e-4);
        assert!((layout.frame.max_distance - layout.frame.distance * 3.0).abs() < 1e-3);
    }

    #[test]
    fn pane_positions_offset_camera() {
        let m = model(&[1, 1], vec![vec![0.0, 0.5]]);
        let layers = layer_info(&m);
        let left = NetworkLayout::build(
            &m, &layers, ViewMode::Color, Theme::Dark, PanePosition::Left, 1.0, None,
        );
        let right = NetworkLayout::build(
            &m, &layers, ViewMode::Color, Theme::Dark, PanePosition::Right, 1.0, None,
        );
        assert_eq!(left.frame.x_offset, -3.0);
        assert_eq!(right.frame.x_offset, 3.0);
    }

    #[test]
    fn empty_model_produces_empty_layout() {
        let m = model(&[], vec![]);
        let layout = build(&m, ViewMode::Color, None);
        assert!(layout.neurons.is_empty());
        assert!(layout.connections.is_empty());
        assert_eq!(layout.frame.focus, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(layout.frame.distance, 10.0);
    }

    #[test]
    fn hsl_endpoints() {
        assert_eq!(hsl_color(0.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl_color(1.0 / 3.0, 1.0, 0.5), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl_color(0.0, 0.0, 1.0), Color32::WHITE);
    }
}
